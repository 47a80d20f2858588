pub mod config;
pub mod context;
mod error;

pub use config::{Config, ConfigError, ResolvedConfig};
pub use context::AppContext;
pub use error::Error;
