use serde::Serialize;
use tracing::debug;

use crate::codec::{self, RawToken, Version};
use crate::error::TokenError;
use crate::identity::{AppCertificate, AppId};
use crate::privilege::{Privilege, PrivilegeSet};
use crate::service::{Service, UserId};
use crate::sign::Signer;
use crate::wire::Unpacker;

/// Decoded contents of a version `007` token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenContent {
    pub app_id: String,
    pub salt: u32,
    pub issue_ts: u32,
    /// Validity window in seconds after `issue_ts`
    pub expire: u32,
    pub services: Vec<Service>,
}

impl AccessTokenContent {
    fn parse(app_id: &AppId, payload: &[u8]) -> Result<Self, TokenError> {
        let mut unpacker = Unpacker::new(payload);
        let salt = unpacker.get_u32("salt")?;
        let issue_ts = unpacker.get_u32("issue_ts")?;
        let expire = unpacker.get_u32("expire")?;
        let count = unpacker.get_u16("service_count")?;
        let mut services: Vec<Service> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let service = Service::unpack_from(&mut unpacker)?;
            if services
                .iter()
                .any(|existing| existing.service_type() == service.service_type())
            {
                return Err(TokenError::malformed("service type listed twice"));
            }
            services.push(service);
        }
        unpacker.finish()?;
        Ok(Self {
            app_id: app_id.to_string(),
            salt,
            issue_ts,
            expire,
            services,
        })
    }

    /// Absolute expiration of the token as a whole
    pub fn expires_at(&self) -> u64 {
        self.issue_ts as u64 + self.expire as u64
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at() as i64
    }

    /// Privileges of the first real-time service, if present
    pub fn rtc_privileges(&self) -> Option<&PrivilegeSet> {
        self.services.iter().find_map(|service| match service {
            Service::Rtc(rtc) => Some(&rtc.privileges),
        })
    }
}

/// Decoded contents of a version `006` token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelTokenContent {
    pub app_id: String,
    pub salt: u32,
    pub issue_ts: u32,
    /// Absolute expiration, Unix seconds
    pub expire_at: u32,
    pub privileges: PrivilegeSet,
}

impl ChannelTokenContent {
    fn parse(app_id: &AppId, payload: &[u8]) -> Result<Self, TokenError> {
        let mut unpacker = Unpacker::new(payload);
        let salt = unpacker.get_u32("salt")?;
        let issue_ts = unpacker.get_u32("issue_ts")?;
        let expire_at = unpacker.get_u32("expire_at")?;
        let privileges = PrivilegeSet::unpack_from(&mut unpacker)?;
        unpacker.finish()?;
        Ok(Self {
            app_id: app_id.to_string(),
            salt,
            issue_ts,
            expire_at,
            privileges,
        })
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expire_at as i64
    }

    pub fn privilege_expires_at(&self, privilege: Privilege) -> Option<u64> {
        self.privileges.get(privilege)
    }
}

/// Either token revision, decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "version")]
pub enum TokenContent {
    #[serde(rename = "007")]
    Access(AccessTokenContent),
    #[serde(rename = "006")]
    Channel(ChannelTokenContent),
}

impl TokenContent {
    pub fn version(&self) -> Version {
        match self {
            TokenContent::Access(_) => Version::V007,
            TokenContent::Channel(_) => Version::V006,
        }
    }

    pub fn app_id(&self) -> &str {
        match self {
            TokenContent::Access(content) => &content.app_id,
            TokenContent::Channel(content) => &content.app_id,
        }
    }
}

fn expect_version(raw: &RawToken, expected: Version) -> Result<(), TokenError> {
    if raw.version != expected {
        return Err(TokenError::UnsupportedVersion(format!(
            "expected {}, found {}",
            expected, raw.version
        )));
    }
    Ok(())
}

/// Verifies a version `007` token against the certificate and decodes it.
///
/// # Arguments
///
/// * `token` - The token string
/// * `certificate` - The shared secret the token was signed with
///
/// # Errors
///
/// Returns an error if:
/// - The token is not a `007` token
/// - The string or payload is malformed
/// - The signature does not match
pub fn verify_token(
    token: &str,
    certificate: &AppCertificate,
) -> Result<AccessTokenContent, TokenError> {
    let raw = codec::decode(token)?;
    expect_version(&raw, Version::V007)?;

    let mut signer = Signer::new(certificate.as_bytes())?;
    signer.update(raw.app_id.as_bytes()).update(&raw.payload);
    signer.verify(&raw.signature)?;

    let content = AccessTokenContent::parse(&raw.app_id, &raw.payload)?;
    debug!(app_id = %raw.app_id, services = content.services.len(), "verified access token");
    Ok(content)
}

/// Verifies a version `006` token. The channel and user must be the ones the
/// token was issued for, since they are only present in the signed content.
pub fn verify_channel_token(
    token: &str,
    certificate: &AppCertificate,
    channel_name: &str,
    user_id: impl Into<UserId>,
) -> Result<ChannelTokenContent, TokenError> {
    let raw = codec::decode(token)?;
    expect_version(&raw, Version::V006)?;
    let user_id = user_id.into();

    let mut signer = Signer::new(certificate.as_bytes())?;
    signer
        .update(raw.app_id.as_bytes())
        .update(channel_name.as_bytes())
        .update(user_id.as_str().as_bytes())
        .update(&raw.payload);
    signer.verify(&raw.signature)?;

    let content = ChannelTokenContent::parse(&raw.app_id, &raw.payload)?;
    debug!(app_id = %raw.app_id, channel = channel_name, "verified channel token");
    Ok(content)
}

/// Decodes a token of either revision WITHOUT checking its signature.
///
/// This is useful when you need to inspect the token contents directly; never
/// base an authorization decision on its result.
pub fn inspect_token(token: &str) -> Result<TokenContent, TokenError> {
    let raw = codec::decode(token)?;
    match raw.version {
        Version::V007 => Ok(TokenContent::Access(AccessTokenContent::parse(
            &raw.app_id,
            &raw.payload,
        )?)),
        Version::V006 => Ok(TokenContent::Channel(ChannelTokenContent::parse(
            &raw.app_id,
            &raw.payload,
        )?)),
    }
}
