//! User settings for auditlog
//!
//! Manages query paging limits and the default log level.

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::error::AuditError;
use crate::storage::file_io::{read_json_required, write_json_atomic};

/// Settings for auditlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Page size used when a query asks for limit 0
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound applied to every page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Log filter used when `AUDITLOG_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    1000
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        let settings = if settings_path.exists() {
            read_json_required::<Settings, _>(&settings_path).map_err(|e| {
                AuditError::Config(format!("Failed to load settings file: {}", e))
            })?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        self.validate()?;
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Check that the paging limits are usable
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.default_page_size == 0 {
            return Err(AuditError::Config(
                "default_page_size must be greater than zero".into(),
            ));
        }

        if self.default_page_size > self.max_page_size {
            return Err(AuditError::Config(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_page_size, 50);
        assert_eq!(settings.max_page_size, 1000);
        assert_eq!(settings.log_level, "warn");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            default_page_size: 20,
            log_level: "debug".into(),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"max_page_size": 200}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.max_page_size, 200);
        assert_eq!(loaded.default_page_size, 50);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let settings = Settings {
            default_page_size: 500,
            max_page_size: 100,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(AuditError::Config(_))));

        let settings = Settings {
            default_page_size: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{ nope").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }
}
