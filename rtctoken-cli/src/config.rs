use crate::error::{CliError, Result};
use directories::BaseDirs;
use rtctoken::{AppId, Role, Version};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: [&str; 4] = [
    "default_app_id",
    "default_profile",
    "default_expires",
    "default_role",
];

/// Global CLI configuration.
///
/// Only non-secret defaults live here. The app certificate is always passed on
/// the command line or through the environment.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    /// App id used when `--app-id` and `RTCTOKEN_APP_ID` are absent
    pub default_app_id: Option<String>,
    pub default_profile: Option<Version>,
    /// Validity window in seconds
    pub default_expires: Option<u32>,
    pub default_role: Option<Role>,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("Failed to parse config: {e}")))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        // Use ~/.rtctoken/ as the standard location
        let home = BaseDirs::new()
            .ok_or_else(|| CliError::Config("Could not determine home directory".to_string()))?
            .home_dir()
            .to_path_buf();
        Ok(home.join(".rtctoken"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Parse and store one value
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_app_id" => {
                AppId::parse(value).map_err(|e| CliError::InvalidInput(e.to_string()))?;
                self.default_app_id = Some(value.to_string());
            }
            "default_profile" => {
                let profile = value
                    .parse::<Version>()
                    .map_err(|_| CliError::InvalidInput("Profile must be 006 or 007".to_string()))?;
                self.default_profile = Some(profile);
            }
            "default_expires" => {
                let seconds = value.parse::<u32>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    CliError::InvalidInput("Expiry must be a positive number of seconds".to_string())
                })?;
                self.default_expires = Some(seconds);
            }
            "default_role" => {
                let role = value
                    .parse::<Role>()
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                self.default_role = Some(role);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Current value of `key`, or `None` when unset
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "default_app_id" => self.default_app_id.clone(),
            "default_profile" => self.default_profile.map(|p| p.to_string()),
            "default_expires" => self.default_expires.map(|s| s.to_string()),
            "default_role" => self.default_role.map(|r| r.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Resolve the app id from an explicit value or the configured default
    pub fn resolve_app_id(&self, app_id: Option<String>) -> Result<String> {
        app_id.or_else(|| self.default_app_id.clone()).ok_or_else(|| {
            CliError::Config(
                "No app id given.\n\nPass --app-id, set RTCTOKEN_APP_ID, or run: rtctoken config set default_app_id <id>".to_string(),
            )
        })
    }
}

fn unknown_key(key: &str) -> CliError {
    CliError::InvalidInput(format!(
        "Unknown configuration key: {key}. Known keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_set_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CliConfig::default();
        config
            .set_value("default_app_id", "970ca35de60c44645bbae8a215061b33")
            .unwrap();
        config.set_value("default_profile", "006").unwrap();
        config.set_value("default_expires", "600").unwrap();
        config.set_value("default_role", "host").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(
            reloaded.get_value("default_profile").unwrap().as_deref(),
            Some("006")
        );
        assert_eq!(
            reloaded.get_value("default_role").unwrap().as_deref(),
            Some("host")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = CliConfig::default();
        assert!(config.set_value("default_app_id", "short").is_err());
        assert!(config.set_value("default_profile", "008").is_err());
        assert!(config.set_value("default_expires", "0").is_err());
        assert!(config.set_value("default_role", "owner").is_err());
        assert!(config.set_value("app_certificate", "00").is_err());
        assert!(config.get_value("app_certificate").is_err());
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_resolve_app_id() {
        let mut config = CliConfig::default();
        assert!(config.resolve_app_id(None).is_err());

        config.default_app_id = Some("a".repeat(32));
        assert_eq!(config.resolve_app_id(None).unwrap(), "a".repeat(32));
        assert_eq!(
            config.resolve_app_id(Some("b".repeat(32))).unwrap(),
            "b".repeat(32)
        );
    }
}
