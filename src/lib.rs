//! # rtctoken
//!
//! Issue and verify signed access tokens for real-time audio/video channels.
//!
//! This crate combines functionality from:
//! - `rtctoken-codec`: Token building, signing, encoding and verification
//! - `rtctoken-config`: Configuration management
//!
//! ## Features
//!
//! - **Flexible configuration**: Load configuration from environment variables, JSON or TOML files
//! - **Two token revisions**: `007` (default) and the legacy flat `006` layout
//! - **Role-based issuing**: Host and audience privilege sets
//! - **Local verification**: Check a token against the app certificate without any service call
//!
//! ## Feature Flags
//!
//! - `toml`: Enables configuration loading from TOML files (on by default)
//!
//! ## Basic Usage
//!
//! ```rust
//! use rtctoken::{Role, TokenConfig, TokenIssuer};
//!
//! # fn main() -> Result<(), rtctoken::SdkError> {
//! let config = TokenConfig::builder()
//!     .app_id("970ca35de60c44645bbae8a215061b33")
//!     .app_certificate("5cfd2fd1755d40ecb72977518be15d3b")
//!     .expire_after(600)
//!     .build()?;
//! let issuer = TokenIssuer::new(config)?;
//!
//! let token = issuer.issue("lobby", 2882341273u32, Role::Host)?;
//! let content = issuer.verify(&token, "lobby", 2882341273u32)?;
//! assert_eq!(content.app_id(), "970ca35de60c44645bbae8a215061b33");
//! # Ok(())
//! # }
//! ```
//!
//! ### Using environment variables
//!
//! When using `from_env()` or `from_env_or_file()`, the following variables are expected:
//!
//! - `{PREFIX}_APP_ID`: The 32-character hex app id
//! - `{PREFIX}_APP_CERTIFICATE` or `{PREFIX}_APP_CERTIFICATE_FILE`: The hex app certificate
//! - `{PREFIX}_PROFILE`: Either "006" or "007" (optional, defaults to "007")
//! - `{PREFIX}_EXPIRE_AFTER`: Validity window in seconds (optional, defaults to 3600)
//! - `{PREFIX}_DEFAULT_ROLE`: Either "host" or "audience" (optional, defaults to "audience")

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use rtctoken_codec::{
    decode, generate_channel_token, generate_token, generate_with, inspect_token,
    verify_channel_token, verify_token, AccessToken, AccessTokenContent, AppCertificate, AppId,
    ChannelToken, ChannelTokenContent, FixedSalt, Privilege, PrivilegeSet, RandomSalt, RawToken,
    Role, RtcService, SaltSource, Service, ServiceType, TokenContent, TokenError, TokenRequest,
    TokenTimeConfig, UserId, Version,
};

pub use rtctoken_config::{
    get_default_config, set_default_config, try_load_default_config, ConfigError, TokenConfig,
    TokenConfigBuilder, DEFAULT_EXPIRE_AFTER, ENV_PREFIX,
};

/// Errors that can occur in the rtctoken SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token error
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// The token is authentic but was issued for another app, channel or user
    #[error("Token does not match: {0}")]
    Mismatch(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

/// Issues and verifies tokens for one application
///
/// The token revision, default validity window and default role all come
/// from the [`TokenConfig`].
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
    certificate: AppCertificate,
    salt: Arc<dyn SaltSource>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from a configuration
    pub fn new(config: TokenConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let certificate = config.certificate()?;
        Ok(Self {
            config,
            certificate,
            salt: Arc::new(RandomSalt),
        })
    }

    /// Create an issuer from the global default configuration, falling back
    /// to the standard locations searched by [`try_load_default_config`]
    pub fn from_default() -> Result<Self, SdkError> {
        let config = match get_default_config() {
            Some(config) => config.clone(),
            None => try_load_default_config().ok_or_else(|| {
                SdkError::Generic(
                    "No default configuration set and none found in standard locations"
                        .to_string(),
                )
            })?,
        };
        Self::new(config)
    }

    /// Replace the salt source. The default draws a random salt per token.
    pub fn with_salt_source(mut self, salt: impl SaltSource + 'static) -> Self {
        self.salt = Arc::new(salt);
        self
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a token valid for the configured window
    pub fn issue(
        &self,
        channel_name: &str,
        user_id: impl Into<UserId>,
        role: Role,
    ) -> Result<String, SdkError> {
        self.issue_with_expiry(channel_name, user_id, role, self.config.expire_after)
    }

    /// Issue a token with the configured default role
    pub fn issue_default_role(
        &self,
        channel_name: &str,
        user_id: impl Into<UserId>,
    ) -> Result<String, SdkError> {
        self.issue(channel_name, user_id, self.config.default_role)
    }

    /// Issue a token valid for `expire_after` seconds from now
    pub fn issue_with_expiry(
        &self,
        channel_name: &str,
        user_id: impl Into<UserId>,
        role: Role,
        expire_after: u32,
    ) -> Result<String, SdkError> {
        let time = TokenTimeConfig::with_duration(expire_after as u64);
        self.issue_at(channel_name, user_id, role, time)
    }

    /// Issue a token with an explicit issue time and window
    pub fn issue_at(
        &self,
        channel_name: &str,
        user_id: impl Into<UserId>,
        role: Role,
        time: TokenTimeConfig,
    ) -> Result<String, SdkError> {
        if time.duration == 0 {
            return Err(ConfigError::InvalidExpiry("0".to_string()).into());
        }
        let request = TokenRequest {
            app_id: &self.config.app_id,
            app_certificate: &self.config.app_certificate,
            channel_name,
            user_id: user_id.into(),
            role,
            time,
        };
        let token = generate_with(self.config.profile, &request, Arc::clone(&self.salt))?;
        debug!(
            profile = %self.config.profile,
            channel = channel_name,
            role = %role,
            "issued token"
        );
        Ok(token)
    }

    /// Verify a token issued for `channel_name` and `user_id`.
    ///
    /// The revision is taken from the token itself, so an issuer configured
    /// for `007` still accepts valid `006` tokens. Beyond the signature this
    /// checks that the token belongs to this app and, for `007`, that it
    /// carries a real-time service for the given channel and user.
    pub fn verify(
        &self,
        token: &str,
        channel_name: &str,
        user_id: impl Into<UserId>,
    ) -> Result<TokenContent, SdkError> {
        let user_id = user_id.into();
        let raw = decode(token)?;
        if !raw.app_id.as_str().eq_ignore_ascii_case(&self.config.app_id) {
            return Err(SdkError::Mismatch(format!(
                "token was issued for app {}",
                raw.app_id
            )));
        }

        match raw.version {
            Version::V007 => {
                let content = verify_token(token, &self.certificate)?;
                let matches = content.services.iter().any(|service| match service {
                    Service::Rtc(rtc) => {
                        rtc.channel_name == channel_name && rtc.user_id == user_id
                    }
                    _ => false,
                });
                if !matches {
                    return Err(SdkError::Mismatch(format!(
                        "no service for channel '{}' and user '{}'",
                        channel_name, user_id
                    )));
                }
                Ok(TokenContent::Access(content))
            }
            Version::V006 => {
                let content =
                    verify_channel_token(token, &self.certificate, channel_name, user_id)?;
                Ok(TokenContent::Channel(content))
            }
        }
    }
}

/// Decode a token without verifying it and render it as pretty JSON
pub fn inspect_to_json(token: &str) -> Result<String, SdkError> {
    let content = inspect_token(token)?;
    Ok(serde_json::to_string_pretty(&content)?)
}
