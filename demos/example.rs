use envfig::{AppContext, Config};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct AppSection {
    name: String,
    debug: bool,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct DatabaseSection {
    host: String,
    port: u16,
    url: String,
}

fn main() -> Result<(), envfig::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // SILEX_ENV=prod selects demos/config/prod.json; `local` otherwise
    let ctx = AppContext::builder()
        .with_config(
            Config::builder()
                .with_dir("demos/config")
                .with_param("db_password", "s3cret")
                .build()?,
        )
        .build()?;

    let app: AppSection = ctx.get_as("app")?;
    let database: DatabaseSection = ctx.get_as("database")?;

    println!("Environment: {} ({})", ctx.env(), ctx.dir().display());
    println!("App: {} (debug={})", app.name, app.debug);
    println!("Database URL: {}", database.url);

    Ok(())
}
