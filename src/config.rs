use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::canvas::AutoSaveConfig;
use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "stitchboard.db".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveSettings {
    pub debounce_ms: u64,
    pub saved_display_ms: u64,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1200,
            saved_display_ms: 2500,
        }
    }
}

impl From<&AutoSaveSettings> for AutoSaveConfig {
    fn from(settings: &AutoSaveSettings) -> Self {
        AutoSaveConfig {
            debounce: Duration::from_millis(settings.debounce_ms),
            saved_display: Duration::from_millis(settings.saved_display_ms),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: "stitchboard-prefs.json".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub autosave: AutoSaveSettings,
    pub preferences: PreferencesConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        toml::from_str(contents)
            .map_err(|e| CoreError::validation(format!("Invalid configuration: {}", e)))
    }

    /// Reads `path` when given, otherwise falls back to defaults.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::unavailable(format!("Failed to read config {}: {}", path.display(), e))
                .with_source(e)
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn autosave_config(&self) -> AutoSaveConfig {
        AutoSaveConfig::from(&self.autosave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "stitchboard.db");
        assert_eq!(config.autosave.debounce_ms, 1200);
        assert_eq!(config.autosave.saved_display_ms, 2500);
        assert_eq!(
            config.autosave_config().debounce,
            Duration::from_millis(1200)
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[database]
path = "/var/lib/stitchboard/yarn.db"

[autosave]
debounce_ms = 500
"#,
        )
        .unwrap();

        assert_eq!(config.database.path, "/var/lib/stitchboard/yarn.db");
        assert_eq!(config.autosave.debounce_ms, 500);
        assert_eq!(config.autosave.saved_display_ms, 2500);
        assert_eq!(config.preferences.path, "stitchboard-prefs.json");
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[autosave]\ndebounce_ms = \"soon\"").unwrap_err();
        assert_eq!(err.kind(), crate::errors::CoreErrorKind::Validation);
    }

    #[test]
    fn test_missing_path_uses_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
