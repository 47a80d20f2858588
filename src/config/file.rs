//! Loading configuration documents from disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::document::ConfigDocument;
use super::ConfigError;

/// Extension appended to document names that have none.
pub const EXTENSION: &str = "json";

/// Maps a document name or path to the file it refers to.
///
/// Names without an extension get `.json` appended. The extension is
/// whatever follows the last `.` of the file name, so `.env` has one and
/// `prod.` does not. Relative paths are joined under `base_dir`; absolute
/// paths are used as-is.
pub fn document_path(base_dir: &Path, name_or_path: &str) -> PathBuf {
    let path = if has_extension(name_or_path) {
        PathBuf::from(name_or_path)
    } else {
        PathBuf::from(format!("{name_or_path}.{EXTENSION}"))
    };

    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

fn has_extension(name_or_path: &str) -> bool {
    Path::new(name_or_path)
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, ext)| !ext.is_empty())
}

/// Loads a document and everything it `$extends`, merged base-first.
///
/// `$extends` targets are always resolved against `base_dir`, whichever
/// document in the chain names them.
pub fn load_document(base_dir: &Path, name_or_path: &str) -> Result<ConfigDocument, ConfigError> {
    let mut chain = Vec::new();
    load_chain(base_dir, name_or_path, &mut chain)
}

fn load_chain(
    base_dir: &Path,
    name_or_path: &str,
    chain: &mut Vec<PathBuf>,
) -> Result<ConfigDocument, ConfigError> {
    let path = document_path(base_dir, name_or_path);
    let identity = path.canonicalize().unwrap_or_else(|_| path.clone());

    if chain.contains(&identity) {
        chain.push(identity);
        return Err(ConfigError::CyclicExtends {
            chain: std::mem::take(chain),
        });
    }
    chain.push(identity);

    let mut document = read_document(&path)?;
    debug!(path = %path.display(), depth = chain.len(), "loaded config document");

    if let Some(parent) = document.extends.take() {
        debug!(path = %path.display(), extends = %parent, "resolving $extends");
        let parent = load_chain(base_dir, &parent, chain)?;
        document = document.merge_over(parent);
    }

    chain.pop();
    Ok(document)
}

/// Reads and parses a single document without following `$extends`.
fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    if path.is_dir() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let value = serde_json::from_slice(&bytes).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    ConfigDocument::from_value(path, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_document_path_rules() {
        let base = Path::new("/etc/app");
        assert_eq!(document_path(base, "prod"), PathBuf::from("/etc/app/prod.json"));
        assert_eq!(document_path(base, "prod.json"), PathBuf::from("/etc/app/prod.json"));
        assert_eq!(
            document_path(base, "shared/base"),
            PathBuf::from("/etc/app/shared/base.json")
        );
        assert_eq!(document_path(base, "/opt/base"), PathBuf::from("/opt/base.json"));
        assert_eq!(document_path(base, "/opt/base.conf"), PathBuf::from("/opt/base.conf"));
        assert_eq!(document_path(base, "prod."), PathBuf::from("/etc/app/prod..json"));
        assert_eq!(document_path(base, ".hidden"), PathBuf::from("/etc/app/.hidden"));
        assert_eq!(
            document_path(base, "conf.d/prod"),
            PathBuf::from("/etc/app/conf.d/prod.json")
        );
    }

    #[test]
    fn test_loads_plain_document() {
        let dir = TempDir::new().unwrap();
        write(&dir, "test.json", r#"{"key": "value", "nested": {"n": 1}}"#);

        let document = load_document(dir.path(), "test").unwrap();
        assert_eq!(
            Value::Object(document.values),
            json!({ "key": "value", "nested": { "n": 1 } })
        );
    }

    #[test]
    fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let result = load_document(dir.path(), "absent");
        assert!(matches!(result, Err(ConfigError::FileNotFound(p)) if p.ends_with("absent.json")));
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub.json")).unwrap();
        let result = load_document(dir.path(), "sub");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_document() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write(&dir, "locked.json", r#"{"key": "value"}"#);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the permission bits.
        if fs::read(&path).is_ok() {
            return;
        }

        let err = load_document(dir.path(), "locked").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ReadError { ref path, .. } if path.ends_with("locked.json")
        ));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, "_broken.json", r#"{"key": "value""#);

        let result = load_document(dir.path(), "_broken");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_extends_chain_merges_base_first() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.json", r#"{"a": {"x": 1, "y": 2}, "b": 3, "name": "base"}"#);
        write(&dir, "mid.json", r#"{"$extends": "base", "a": {"y": 5}, "name": "mid"}"#);
        write(&dir, "leaf.json", r#"{"$extends": "mid.json", "a": {"y": 9}, "c": 4}"#);

        let document = load_document(dir.path(), "leaf").unwrap();
        assert_eq!(document.extends, None);
        assert_eq!(
            Value::Object(document.values),
            json!({ "a": { "x": 1, "y": 9 }, "b": 3, "c": 4, "name": "mid" })
        );
    }

    #[test]
    fn test_extends_resolves_against_base_dir() {
        let dir = TempDir::new().unwrap();
        write(&dir, "common.json", r#"{"from": "root"}"#);
        write(&dir, "envs/prod.json", r#"{"$extends": "common", "env": "prod"}"#);

        let document = load_document(dir.path(), "envs/prod").unwrap();
        assert_eq!(
            Value::Object(document.values),
            json!({ "from": "root", "env": "prod" })
        );
    }

    #[test]
    fn test_extends_absolute_path() {
        let shared = TempDir::new().unwrap();
        let base = write(&shared, "base.json", r#"{"shared": true}"#);
        let dir = TempDir::new().unwrap();
        let extends = base.with_extension("");
        write(
            &dir,
            "local.json",
            &json!({ "$extends": extends, "local": true }).to_string(),
        );

        let document = load_document(dir.path(), "local").unwrap();
        assert_eq!(
            Value::Object(document.values),
            json!({ "shared": true, "local": true })
        );
    }

    #[test]
    fn test_missing_extends_target() {
        let dir = TempDir::new().unwrap();
        write(&dir, "child.json", r#"{"$extends": "ghost"}"#);

        let result = load_document(dir.path(), "child");
        assert!(matches!(result, Err(ConfigError::FileNotFound(p)) if p.ends_with("ghost.json")));
    }

    #[test]
    fn test_cyclic_extends_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", r#"{"$extends": "b"}"#);
        write(&dir, "b.json", r#"{"$extends": "a.json"}"#);

        match load_document(dir.path(), "a") {
            Err(ConfigError::CyclicExtends { chain }) => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("expected CyclicExtends, got {other:?}"),
        }
    }

    #[test]
    fn test_self_extends_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "loop.json", r#"{"$extends": "loop"}"#);

        let result = load_document(dir.path(), "loop");
        assert!(matches!(result, Err(ConfigError::CyclicExtends { .. })));
    }
}
