//! Configuration for issuing rtctoken access tokens.
//!
//! A [`TokenConfig`] holds the application identity and the issuing defaults.
//! It can be built by hand, loaded from JSON or TOML files, read from
//! environment variables, or installed once as a process-wide default.

use rtctoken_codec::{AppCertificate, AppId, Role, Version};
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Default validity window, in seconds, of issued tokens
pub const DEFAULT_EXPIRE_AFTER: u32 = 3600;

/// Prefix of the environment variables read by [`try_load_default_config`]
pub const ENV_PREFIX: &str = "RTCTOKEN";

/// Configuration for a token issuer
///
/// # Examples
///
/// ## Creating a configuration manually
///
/// ```
/// use rtctoken_config::TokenConfig;
///
/// let config = TokenConfig::new(
///     "970ca35de60c44645bbae8a215061b33", // app id
///     "5cfd2fd1755d40ecb72977518be15d3b", // app certificate (hex)
/// );
/// assert!(config.validate().is_ok());
/// ```
///
/// ## Loading from environment variables
///
/// ```no_run
/// use rtctoken_config::TokenConfig;
///
/// // Assuming the following environment variables are set:
/// // RTCTOKEN_APP_ID=970ca35de60c44645bbae8a215061b33
/// // RTCTOKEN_APP_CERTIFICATE=5cfd2fd1755d40ecb72977518be15d3b
/// // RTCTOKEN_EXPIRE_AFTER=600
/// let config = TokenConfig::from_env("RTCTOKEN")
///     .expect("Failed to load configuration from environment");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub app_id: String,
    /// Hex-encoded signing secret. Never logged.
    pub app_certificate: String,
    /// Token revision to issue
    #[serde(default)]
    pub profile: Version,
    /// Validity window in seconds
    #[serde(default = "default_expire_after")]
    pub expire_after: u32,
    #[serde(default)]
    pub default_role: Role,
}

fn default_expire_after() -> u32 {
    DEFAULT_EXPIRE_AFTER
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .field("profile", &self.profile)
            .field("expire_after", &self.expire_after)
            .field("default_role", &self.default_role)
            .finish()
    }
}

/// Builder for TokenConfig
///
/// ```
/// # fn main() -> Result<(), rtctoken_config::ConfigError> {
/// use rtctoken_codec::{Role, Version};
/// use rtctoken_config::TokenConfigBuilder;
///
/// let config = TokenConfigBuilder::new()
///     .app_id("970ca35de60c44645bbae8a215061b33")
///     .app_certificate("5cfd2fd1755d40ecb72977518be15d3b")
///     .profile(Version::V006)
///     .expire_after(600)
///     .default_role(Role::Host)
///     .build()?;
///
/// // Change one field of an existing configuration
/// let longer = config.to_builder().expire_after(86400).build()?;
/// assert_eq!(longer.expire_after, 86400);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct TokenConfigBuilder {
    app_id: Option<String>,
    app_certificate: Option<String>,
    profile: Option<Version>,
    expire_after: Option<u32>,
    default_role: Option<Role>,
}

impl TokenConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: &TokenConfig) -> Self {
        Self {
            app_id: Some(config.app_id.clone()),
            app_certificate: Some(config.app_certificate.clone()),
            profile: Some(config.profile),
            expire_after: Some(config.expire_after),
            default_role: Some(config.default_role),
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn app_certificate(mut self, app_certificate: impl Into<String>) -> Self {
        self.app_certificate = Some(app_certificate.into());
        self
    }

    pub fn profile(mut self, profile: Version) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn expire_after(mut self, seconds: u32) -> Self {
        self.expire_after = Some(seconds);
        self
    }

    pub fn default_role(mut self, role: Role) -> Self {
        self.default_role = Some(role);
        self
    }

    /// Build the TokenConfig
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing or invalid
    pub fn build(self) -> Result<TokenConfig, ConfigError> {
        let config = TokenConfig {
            app_id: self.app_id.ok_or(ConfigError::MissingAppId)?,
            app_certificate: self.app_certificate.ok_or(ConfigError::MissingCertificate)?,
            profile: self.profile.unwrap_or_default(),
            expire_after: self.expire_after.unwrap_or(DEFAULT_EXPIRE_AFTER),
            default_role: self.default_role.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur when working with token configuration
#[derive(Debug)]
pub enum ConfigError {
    MissingAppId,
    InvalidAppId(String),
    MissingCertificate,
    InvalidCertificate(String),
    InvalidExpiry(String),
    IOError(String),
    ParseError(String),
    AlreadyInitialized,
    EnvVarError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingAppId => {
                write!(f, "App ID is required but was not provided. Please specify the 32-character hex app ID.")
            }
            ConfigError::InvalidAppId(e) => {
                write!(f, "Invalid app ID: {}. The app ID must be exactly 32 hex characters.", e)
            }
            ConfigError::MissingCertificate => {
                write!(f, "App certificate is required but was not provided. Please provide the hex-encoded app certificate.")
            }
            ConfigError::InvalidCertificate(e) => {
                write!(f, "Invalid app certificate: {}. Please ensure the certificate is hex-encoded.", e)
            }
            ConfigError::InvalidExpiry(e) => {
                write!(f, "Invalid expiry: {}. Expiry must be a positive number of seconds.", e)
            }
            ConfigError::IOError(e) => {
                write!(f, "I/O error occurred while reading configuration: {}. Please check file permissions and paths.", e)
            }
            ConfigError::ParseError(e) => {
                write!(f, "Failed to parse configuration data: {}. Please ensure the configuration format is correct.", e)
            }
            ConfigError::AlreadyInitialized => {
                write!(f, "Global configuration has already been initialized. Call get_default_config() to access it or create a new local configuration.")
            }
            ConfigError::EnvVarError(e) => {
                write!(f, "Environment variable error: {}. Please ensure all required environment variables are set correctly.", e)
            }
        }
    }
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

impl From<env::VarError> for ConfigError {
    fn from(error: env::VarError) -> Self {
        ConfigError::EnvVarError(error.to_string())
    }
}

/// Reads `{prefix}_{name}`, treating an unset variable as `None`
fn optional_var(prefix: &str, name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(format!("{}_{}", prefix, name)) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn required_var(prefix: &str, name: &str) -> Result<String, ConfigError> {
    let key = format!("{}_{}", prefix, name);
    env::var(&key).map_err(|e| ConfigError::EnvVarError(format!("{}: {}", key, e)))
}

impl TokenConfig {
    /// Create a configuration with the default profile, expiry and role
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        TokenConfig {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
            profile: Version::default(),
            expire_after: DEFAULT_EXPIRE_AFTER,
            default_role: Role::default(),
        }
    }

    pub fn builder() -> TokenConfigBuilder {
        TokenConfigBuilder::new()
    }

    /// Convert this configuration to a builder for modification
    pub fn to_builder(&self) -> TokenConfigBuilder {
        TokenConfigBuilder::from_config(self)
    }

    /// Create a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: TokenConfig = serde_json::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from a TOML file
    #[cfg(feature = "toml")]
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: TokenConfig = toml::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from environment variables
    ///
    /// With the prefix "RTCTOKEN" the variables are:
    /// - RTCTOKEN_APP_ID
    /// - RTCTOKEN_APP_CERTIFICATE
    /// - RTCTOKEN_PROFILE (optional, "006" or "007")
    /// - RTCTOKEN_EXPIRE_AFTER (optional, seconds)
    /// - RTCTOKEN_DEFAULT_ROLE (optional, "host" or "audience")
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if any required environment variable is missing or invalid.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let app_certificate = required_var(prefix, "APP_CERTIFICATE")?;
        Self::from_env_with_certificate(prefix, app_certificate)
    }

    /// Like [`TokenConfig::from_env`], but the certificate may also be read
    /// from the file named by `{prefix}_APP_CERTIFICATE_FILE`. The file takes
    /// precedence; surrounding whitespace is trimmed.
    pub fn from_env_or_file(prefix: &str) -> Result<Self, ConfigError> {
        let app_certificate = match optional_var(prefix, "APP_CERTIFICATE_FILE")? {
            Some(path) => fs::read_to_string(&path)
                .map_err(|e| {
                    ConfigError::IOError(format!("Failed to read certificate file: {}", e))
                })?
                .trim()
                .to_string(),
            None => required_var(prefix, "APP_CERTIFICATE")?,
        };
        Self::from_env_with_certificate(prefix, app_certificate)
    }

    fn from_env_with_certificate(
        prefix: &str,
        app_certificate: String,
    ) -> Result<Self, ConfigError> {
        let app_id = required_var(prefix, "APP_ID")?;

        let profile = match optional_var(prefix, "PROFILE")? {
            Some(profile) => profile
                .parse::<Version>()
                .map_err(|e| ConfigError::ParseError(format!("Invalid profile: {}", e)))?,
            None => Version::default(),
        };

        let expire_after = match optional_var(prefix, "EXPIRE_AFTER")? {
            Some(seconds) => seconds
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidExpiry(seconds.clone()))?,
            None => DEFAULT_EXPIRE_AFTER,
        };

        let default_role = match optional_var(prefix, "DEFAULT_ROLE")? {
            Some(role) => role
                .parse::<Role>()
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
            None => Role::default(),
        };

        let config = TokenConfig {
            app_id,
            app_certificate,
            profile,
            expire_after,
            default_role,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the identity is well formed and the expiry is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingAppId);
        }
        AppId::parse(&self.app_id).map_err(|e| ConfigError::InvalidAppId(e.to_string()))?;

        if self.app_certificate.is_empty() {
            return Err(ConfigError::MissingCertificate);
        }
        AppCertificate::from_hex(&self.app_certificate)
            .map_err(|e| ConfigError::InvalidCertificate(e.to_string()))?;

        if self.expire_after == 0 {
            return Err(ConfigError::InvalidExpiry("0".to_string()));
        }
        Ok(())
    }

    /// Parsed application certificate
    pub fn certificate(&self) -> Result<AppCertificate, ConfigError> {
        AppCertificate::from_hex(&self.app_certificate)
            .map_err(|e| ConfigError::InvalidCertificate(e.to_string()))
    }
}

// Global configuration singleton
static DEFAULT_CONFIG: OnceLock<TokenConfig> = OnceLock::new();

/// Set the default global configuration
///
/// Returns an error if the configuration is invalid or a default is
/// already set.
pub fn set_default_config(config: TokenConfig) -> Result<(), ConfigError> {
    config.validate()?;
    DEFAULT_CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Get the default global configuration, if set
pub fn get_default_config() -> Option<&'static TokenConfig> {
    DEFAULT_CONFIG.get()
}

fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(stripped) => dirs::home_dir().map(|home| home.join(stripped)),
        None => Some(PathBuf::from(path)),
    }
}

/// Try to load a default configuration from standard locations
///
/// This function attempts to load a configuration from:
/// 1. Environment variables with the prefix "RTCTOKEN"
/// 2. A file at ./rtctoken.json
/// 3. A file at ~/.rtctoken/config.json
/// 4. A file at /etc/rtctoken/config.json
/// 5. If the "toml" feature is enabled, TOML files at the same paths
///
/// Returns None if no configuration could be found.
pub fn try_load_default_config() -> Option<TokenConfig> {
    if let Ok(config) = TokenConfig::from_env_or_file(ENV_PREFIX) {
        debug!("loaded configuration from environment");
        return Some(config);
    }

    let paths = [
        "./rtctoken.json",
        "~/.rtctoken/config.json",
        "/etc/rtctoken/config.json",
    ];
    for path in paths.iter().filter_map(|path| expand_home(path)) {
        if path.exists() {
            match TokenConfig::from_file(&path) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded configuration");
                    return Some(config);
                }
                Err(e) => debug!(path = %path.display(), error = %e, "skipping configuration"),
            }
        }
    }

    #[cfg(feature = "toml")]
    {
        let toml_paths = [
            "./rtctoken.toml",
            "~/.rtctoken/config.toml",
            "/etc/rtctoken/config.toml",
        ];
        for path in toml_paths.iter().filter_map(|path| expand_home(path)) {
            if path.exists() {
                match TokenConfig::from_toml(&path) {
                    Ok(config) => {
                        debug!(path = %path.display(), "loaded configuration");
                        return Some(config);
                    }
                    Err(e) => debug!(path = %path.display(), error = %e, "skipping configuration"),
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const APP_ID: &str = "970ca35de60c44645bbae8a215061b33";
    const CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

    #[test]
    fn test_defaults() {
        let config = TokenConfig::new(APP_ID, CERTIFICATE);
        assert_eq!(config.profile, Version::V007);
        assert_eq!(config.expire_after, 3600);
        assert_eq!(config.default_role, Role::Audience);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_identity() {
        assert!(matches!(
            TokenConfig::new("", CERTIFICATE).validate(),
            Err(ConfigError::MissingAppId)
        ));
        assert!(matches!(
            TokenConfig::new("abc", CERTIFICATE).validate(),
            Err(ConfigError::InvalidAppId(_))
        ));
        assert!(matches!(
            TokenConfig::new(APP_ID, "").validate(),
            Err(ConfigError::MissingCertificate)
        ));
        assert!(matches!(
            TokenConfig::new(APP_ID, "zz").validate(),
            Err(ConfigError::InvalidCertificate(_))
        ));

        let mut config = TokenConfig::new(APP_ID, CERTIFICATE);
        config.expire_after = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn test_builder_requires_identity() {
        assert!(matches!(
            TokenConfig::builder().app_certificate(CERTIFICATE).build(),
            Err(ConfigError::MissingAppId)
        ));
        assert!(matches!(
            TokenConfig::builder().app_id(APP_ID).build(),
            Err(ConfigError::MissingCertificate)
        ));
    }

    #[test]
    fn test_debug_redacts_certificate() {
        let config = TokenConfig::new(APP_ID, CERTIFICATE);
        let output = format!("{:?}", config);
        assert!(output.contains(APP_ID));
        assert!(!output.contains(CERTIFICATE));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_json_file_applies_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"app_id": "{}", "app_certificate": "{}"}}"#,
            APP_ID, CERTIFICATE
        )
        .unwrap();

        let config = TokenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.profile, Version::V007);
        assert_eq!(config.expire_after, DEFAULT_EXPIRE_AFTER);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "app_id = \"{}\"", APP_ID).unwrap();
        writeln!(file, "app_certificate = \"{}\"", CERTIFICATE).unwrap();
        writeln!(file, "profile = \"006\"").unwrap();
        writeln!(file, "default_role = \"host\"").unwrap();

        let config = TokenConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.profile, Version::V006);
        assert_eq!(config.default_role, Role::Host);
    }

    #[test]
    fn test_env_certificate_file_takes_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", CERTIFICATE).unwrap();

        env::set_var("RTCTOKEN_UNIT_APP_ID", APP_ID);
        env::set_var("RTCTOKEN_UNIT_APP_CERTIFICATE", "not-hex");
        env::set_var("RTCTOKEN_UNIT_APP_CERTIFICATE_FILE", file.path());
        env::set_var("RTCTOKEN_UNIT_EXPIRE_AFTER", "120");

        let config = TokenConfig::from_env_or_file("RTCTOKEN_UNIT").unwrap();
        assert_eq!(config.app_certificate, CERTIFICATE);
        assert_eq!(config.expire_after, 120);

        // the inline value is used as-is by from_env
        assert!(matches!(
            TokenConfig::from_env("RTCTOKEN_UNIT"),
            Err(ConfigError::InvalidCertificate(_))
        ));
    }
}
