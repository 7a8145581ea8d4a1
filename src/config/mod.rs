//! Configuration loading.
//!
//! TOML files with serde defaults: any omitted key falls back to a sensible
//! default, so an empty file (or no file at all) yields a working
//! configuration.

mod types;

pub use types::{Config, ServerConfig, StorageConfig, UploadConfig};

use std::path::{Path, PathBuf};

use reelvault_common::{Error, Result};

/// Load configuration from an optional TOML file.
///
/// With no path the defaults are used. The data directory is expanded
/// (`~`, `$VAR`) and the result validated.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|e| Error::internal(format!("Failed to read {}: {}", p.display(), e)))?;
            toml::from_str(&content)
                .map_err(|e| Error::internal(format!("Invalid config {}: {}", p.display(), e)))?
        }
        None => Config::default(),
    };

    config.storage.data_dir = expand_path(&config.storage.data_dir)?;
    validate(&config)?;
    Ok(config)
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(raw.as_ref())
        .map_err(|e| Error::internal(format!("Failed to expand path {}: {}", raw, e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Check cross-field constraints a TOML parse cannot express.
pub fn validate(config: &Config) -> Result<()> {
    if config.server.host.is_empty() {
        return Err(Error::internal("server.host must not be empty"));
    }
    if config.upload.max_file_size_bytes == 0 {
        return Err(Error::internal("upload.max_file_size_bytes must be positive"));
    }
    if config.upload.session_ttl_secs == 0 {
        return Err(Error::internal("upload.session_ttl_secs must be positive"));
    }
    if config.upload.sweep_interval_secs == 0 {
        return Err(Error::internal("upload.sweep_interval_secs must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[storage]\ndata_dir = \"/tmp/reelvault-test\"\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/reelvault-test"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_config(Some(Path::new("/nonexistent/reelvault.toml"))).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.upload.max_file_size_bytes = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.upload.session_ttl_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("REELVAULT_TEST_DIR", "/tmp/rv-env");
        let expanded = expand_path(Path::new("$REELVAULT_TEST_DIR/data")).unwrap();
        assert_eq!(expanded, PathBuf::from("/tmp/rv-env/data"));
    }
}
