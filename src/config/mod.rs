//! Engine Configuration
//!
//! Operational settings stored in TOML format. Algorithm constants
//! (thresholds, score weights, tier boundaries) are fixed in code and
//! deliberately not configurable; this covers only how the engine runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::vision::HashBackend;

/// Engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Content hashing settings
    pub hashing: HashingConfig,
    /// Batch analysis settings
    pub batch: BatchConfig,
}

/// General engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log filter directive (tracing env-filter syntax)
    pub log_filter: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}

/// Content hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Use the SHA-256 digest; when false the deterministic rolling
    /// fallback is used instead
    pub use_sha256: bool,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self { use_sha256: true }
    }
}

impl HashingConfig {
    /// The digest backend this configuration selects
    pub fn backend(&self) -> HashBackend {
        if self.use_sha256 {
            HashBackend::Sha256
        } else {
            HashBackend::Rolling
        }
    }
}

/// Batch analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Simultaneous analyses per chunk
    pub chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::batch::BATCH_CHUNK_SIZE,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default config file location for this user
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "cashea", "cardlens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config at `path`, or at the default location, falling back to
/// defaults when no file exists
pub fn load_or_default(path: Option<&Path>) -> EngineConfig {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };
    match path {
        Some(path) if path.exists() => load_config(&path).unwrap_or_default(),
        _ => EngineConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.general.log_filter, "info");
        assert!(config.hashing.use_sha256);
        assert_eq!(config.batch.chunk_size, 3);
    }

    #[test]
    fn test_hashing_backend_selection() {
        let mut config = HashingConfig::default();
        assert_eq!(config.backend(), HashBackend::Sha256);
        config.use_sha256 = false;
        assert_eq!(config.backend(), HashBackend::Rolling);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = EngineConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.general.log_filter, parsed.general.log_filter);
        assert_eq!(config.hashing.use_sha256, parsed.hashing.use_sha256);
        assert_eq!(config.batch.chunk_size, parsed.batch.chunk_size);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = EngineConfig::default();
        config.batch.chunk_size = 6;
        config.hashing.use_sha256 = false;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.batch.chunk_size, 6);
        assert!(!loaded.hashing.use_sha256);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.batch.chunk_size, 3);
    }
}
