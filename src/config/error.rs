use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration directory was not set")]
    MissingDirectory,

    #[error("configuration directory '{path}' is not valid: {source}")]
    InvalidDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration directory '{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config file '{0}' must contain a JSON object at the top level")]
    NotAnObject(PathBuf),

    #[error("invalid '{key}' in config file '{path}': {reason}")]
    InvalidDirective {
        path: PathBuf,
        key: String,
        reason: String,
    },

    #[error("circular $extends chain: {}", format_chain(.chain))]
    CyclicExtends { chain: Vec<PathBuf> },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

impl ConfigError {
    /// True for errors raised because the configuration directory is unusable.
    pub fn is_invalid_directory(&self) -> bool {
        matches!(
            self,
            Self::MissingDirectory | Self::InvalidDirectory { .. } | Self::NotADirectory(_)
        )
    }

    /// True for errors raised because a document could not be found or read.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::ReadError { .. })
    }

    /// True for errors raised because a document's contents were malformed.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. } | Self::NotAnObject(_) | Self::InvalidDirective { .. }
        )
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_extends_message_lists_chain() {
        let err = ConfigError::CyclicExtends {
            chain: vec![
                PathBuf::from("/c/a.json"),
                PathBuf::from("/c/b.json"),
                PathBuf::from("/c/a.json"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "circular $extends chain: /c/a.json -> /c/b.json -> /c/a.json"
        );
    }

    #[test]
    fn test_error_classification() {
        let not_found = ConfigError::FileNotFound(PathBuf::from("x.json"));
        assert!(not_found.is_not_found());
        assert!(!not_found.is_invalid_directory());

        assert!(ConfigError::NotAnObject(PathBuf::from("x.json")).is_parse_error());

        for err in [
            ConfigError::MissingDirectory,
            ConfigError::NotADirectory(PathBuf::from("/etc/app.json")),
        ] {
            assert!(err.is_invalid_directory());
            assert!(!err.is_not_found());
            assert!(!err.is_parse_error());
        }
    }
}
