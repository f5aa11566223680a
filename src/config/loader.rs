use super::BigramConfig;
use crate::error::{BigramError, ErrorCode, Result};
use std::path::Path;
use tracing::debug;

/// Looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "bigram-reduce.toml";

/// Load configuration from `path`, or from `bigram-reduce.toml` in `base_dir`
/// if it exists, then apply environment overrides and validate.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_config(path: Option<&Path>, base_dir: &Path) -> Result<BigramConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            let default_path = base_dir.join(CONFIG_FILE_NAME);
            if default_path.exists() {
                read_config_file(&default_path)?
            } else {
                BigramConfig::default()
            }
        }
    };

    config.merge_env_vars()?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<BigramConfig> {
    debug!("Loading configuration from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        let code = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::CONFIG_NOT_FOUND
        } else {
            ErrorCode::CONFIG_GENERIC
        };
        BigramError::config_with_code(
            code,
            format!("cannot read configuration file {}", path.display()),
        )
        .with_source(e)
    })?;

    let config: BigramConfig = toml::from_str(&content)
        .map_err(|e| BigramError::from(e).with_context(path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Topology;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.top_k, BigramConfig::default().top_k);
    }

    #[test]
    fn test_default_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "partitions = 3\ntopology = \"sequential\"\ntop_k = 5\n",
        )
        .unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.partitions, 3);
        assert_eq!(config.topology, Topology::Sequential);
        assert_eq!(config.top_k, 5);
        assert!(config.lowercase);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing), dir.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_invalid_toml_and_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");

        std::fs::write(&path, "partitions = [").unwrap();
        let err = load_config(Some(&path), dir.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);

        std::fs::write(&path, "partitions = 0").unwrap();
        let err = load_config(Some(&path), dir.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }
}
