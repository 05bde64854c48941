use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::codec::{self, Version};
use crate::error::TokenError;
use crate::identity::{AppCertificate, AppId};
use crate::salt::{RandomSalt, SaltSource, SALT_RANGE};
use crate::service::Service;
use crate::sign::Signer;
use crate::wire::Packer;

/// Default validity window in seconds
pub const DEFAULT_EXPIRE_SECONDS: u64 = 900;

/// TokenTimeConfig allows control over token issue time and validity window
#[derive(Debug, Clone, Copy)]
pub struct TokenTimeConfig {
    /// Optional custom issue time (now time override), Unix seconds
    pub start_time: Option<i64>,
    /// Validity window in seconds (default: 900 seconds = 15 minutes)
    pub duration: u64,
}

impl Default for TokenTimeConfig {
    fn default() -> Self {
        Self {
            start_time: None,
            duration: DEFAULT_EXPIRE_SECONDS,
        }
    }
}

impl TokenTimeConfig {
    pub fn with_duration(duration: u64) -> Self {
        Self {
            start_time: None,
            duration,
        }
    }

    pub(crate) fn issue_ts(&self) -> i64 {
        self.start_time.unwrap_or_else(|| Utc::now().timestamp())
    }
}

/// Builder for version `007` tokens: any number of services under one app identity.
///
/// ```
/// use rtctoken_codec::{AccessToken, FixedSalt, Privilege, RtcService, TokenTimeConfig};
///
/// # fn main() -> Result<(), rtctoken_codec::TokenError> {
/// let time = TokenTimeConfig { start_time: Some(1_700_000_000), duration: 3600 };
/// let mut token = AccessToken::new(&"a".repeat(32), &"00".repeat(16), time)?
///     .with_salt_source(FixedSalt(1));
/// token.add_service(
///     RtcService::new("room1", 42u32).with_privilege(Privilege::JoinChannel, 1_700_003_600),
/// );
/// let token = token.build()?;
/// assert!(token.starts_with("007aaaaaaaa"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AccessToken {
    app_id: AppId,
    certificate: AppCertificate,
    issue_ts: i64,
    expire: u64,
    services: Vec<Service>,
    salt_source: Arc<dyn SaltSource>,
}

impl AccessToken {
    /// Validates the identity and fixes the issue time.
    ///
    /// Fails with [`TokenError::InvalidInput`] when `app_id` or `app_certificate`
    /// is empty or malformed.
    pub fn new(
        app_id: &str,
        app_certificate: &str,
        time_config: TokenTimeConfig,
    ) -> Result<Self, TokenError> {
        Ok(Self::from_parts(
            AppId::parse(app_id)?,
            AppCertificate::from_hex(app_certificate)?,
            time_config,
        ))
    }

    pub fn from_parts(
        app_id: AppId,
        certificate: AppCertificate,
        time_config: TokenTimeConfig,
    ) -> Self {
        Self {
            app_id,
            certificate,
            issue_ts: time_config.issue_ts(),
            expire: time_config.duration,
            services: Vec::new(),
            salt_source: Arc::new(RandomSalt),
        }
    }

    /// Replaces the salt source (the default draws from the thread RNG)
    pub fn with_salt_source(mut self, source: impl SaltSource + 'static) -> Self {
        self.salt_source = Arc::new(source);
        self
    }

    /// Registers a service. A second service of the same type replaces the
    /// first one in place: last write wins per type.
    pub fn add_service(&mut self, service: impl Into<Service>) -> &mut Self {
        let service = service.into();
        match self
            .services
            .iter_mut()
            .find(|existing| existing.service_type() == service.service_type())
        {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
        self
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    pub fn issue_ts(&self) -> i64 {
        self.issue_ts
    }

    pub fn expire(&self) -> u64 {
        self.expire
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// `u32(salt) || u32(issue_ts) || u32(expire) || u16(count) || services*`
    pub(crate) fn pack(&self, salt: u32) -> Result<Vec<u8>, TokenError> {
        if !SALT_RANGE.contains(&salt) {
            return Err(TokenError::encoding("salt", salt, *SALT_RANGE.end() as u64));
        }
        let mut packer = Packer::new();
        packer.put_u32("salt", salt as u64)?;
        packer.put_timestamp("issue_ts", self.issue_ts)?;
        packer.put_u32("expire", self.expire)?;
        packer.put_u16("service_count", self.services.len() as u64)?;
        for service in &self.services {
            service.pack_into(&mut packer)?;
        }
        Ok(packer.into_bytes())
    }

    /// Serializes, signs and encodes the token. Draws a fresh salt each call.
    pub fn build(&self) -> Result<String, TokenError> {
        let salt = self.salt_source.next_salt();
        let payload = self.pack(salt)?;

        let mut signer = Signer::new(self.certificate.as_bytes())?;
        signer.update(self.app_id.as_bytes()).update(&payload);
        let signature = signer.finalize();

        debug!(
            app_id = %self.app_id,
            version = %Version::V007,
            services = self.services.len(),
            issue_ts = self.issue_ts,
            expire = self.expire,
            "built access token"
        );

        Ok(codec::encode(
            Version::V007,
            &self.app_id,
            &signature,
            &payload,
        ))
    }
}
