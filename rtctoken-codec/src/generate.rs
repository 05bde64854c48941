use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::access_token::{AccessToken, TokenTimeConfig};
use crate::channel_token::ChannelToken;
use crate::codec::Version;
use crate::error::TokenError;
use crate::identity::{AppCertificate, AppId};
use crate::privilege::Privilege;
use crate::salt::{RandomSalt, SaltSource};
use crate::service::{RtcService, UserId};

/// What a user may do in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Joins and publishes audio, video and data streams
    Host,
    /// Joins only
    #[default]
    Audience,
}

impl Role {
    const HOST_PRIVILEGES: [Privilege; 4] = [
        Privilege::JoinChannel,
        Privilege::PublishAudioStream,
        Privilege::PublishVideoStream,
        Privilege::PublishDataStream,
    ];
    const AUDIENCE_PRIVILEGES: [Privilege; 1] = [Privilege::JoinChannel];

    pub fn privileges(self) -> &'static [Privilege] {
        match self {
            Role::Host => &Self::HOST_PRIVILEGES,
            Role::Audience => &Self::AUDIENCE_PRIVILEGES,
        }
    }

    /// Numeric role code: 1 = host, 2 = audience
    pub const fn code(self) -> u8 {
        match self {
            Role::Host => 1,
            Role::Audience => 2,
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = TokenError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Host),
            2 => Ok(Role::Audience),
            other => Err(TokenError::invalid_input(format!(
                "unknown role code {} (1=host, 2=audience)",
                other
            ))),
        }
    }
}

impl FromStr for Role {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" | "publisher" | "1" => Ok(Role::Host),
            "audience" | "subscriber" | "2" => Ok(Role::Audience),
            other => Err(TokenError::invalid_input(format!("unknown role '{}'", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Audience => write!(f, "audience"),
        }
    }
}

/// Everything needed to issue one channel token
#[derive(Debug, Clone)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub app_certificate: &'a str,
    pub channel_name: &'a str,
    pub user_id: UserId,
    pub role: Role,
    pub time: TokenTimeConfig,
}

/// Issues a token in the given revision.
///
/// Every granted privilege expires at `issue_ts + time.duration`. In `007` the
/// header carries the window itself; in `006` it carries the absolute time.
pub fn generate_with(
    version: Version,
    request: &TokenRequest<'_>,
    salt: impl SaltSource + 'static,
) -> Result<String, TokenError> {
    let app_id = AppId::parse(request.app_id)?;
    let certificate = AppCertificate::from_hex(request.app_certificate)?;
    if request.channel_name.is_empty() {
        return Err(TokenError::invalid_input("channel_name must not be empty"));
    }

    match version {
        Version::V007 => {
            let mut token =
                AccessToken::from_parts(app_id, certificate, request.time).with_salt_source(salt);
            let expire_at = privilege_expiry(token.issue_ts(), token.expire())?;
            let mut service = RtcService::new(request.channel_name, request.user_id.clone());
            for privilege in request.role.privileges() {
                service.add_privilege(*privilege, expire_at);
            }
            token.add_service(service);
            token.build()
        }
        Version::V006 => {
            let mut token = ChannelToken::from_parts(
                app_id,
                certificate,
                request.channel_name,
                request.user_id.clone(),
                request.time,
            )?
            .with_salt_source(salt);
            let expire_at = privilege_expiry(token.issue_ts(), request.time.duration)?;
            for privilege in request.role.privileges() {
                token.add_privilege(*privilege, expire_at);
            }
            token.build()
        }
    }
}

fn privilege_expiry(issue_ts: i64, duration: u64) -> Result<u64, TokenError> {
    u64::try_from(issue_ts)
        .ok()
        .and_then(|issue_ts| issue_ts.checked_add(duration))
        .ok_or_else(|| TokenError::encoding("privilege_expire_at", issue_ts, u32::MAX as u64))
}

/// Issues a `007` token for one channel, valid for `expire_after_seconds` from now.
///
/// # Arguments
///
/// * `app_id` - 32-character hex application identifier
/// * `app_certificate` - Hex-encoded signing secret
/// * `channel_name` - Channel to grant access to
/// * `user_id` - Numeric uid (0 = auto-assign) or string account
/// * `role` - Host or audience
/// * `expire_after_seconds` - Validity window
pub fn generate_token(
    app_id: &str,
    app_certificate: &str,
    channel_name: &str,
    user_id: impl Into<UserId>,
    role: Role,
    expire_after_seconds: u32,
) -> Result<String, TokenError> {
    let request = TokenRequest {
        app_id,
        app_certificate,
        channel_name,
        user_id: user_id.into(),
        role,
        time: TokenTimeConfig::with_duration(expire_after_seconds as u64),
    };
    generate_with(Version::V007, &request, RandomSalt)
}

/// Same as [`generate_token`] but in the flat `006` revision
pub fn generate_channel_token(
    app_id: &str,
    app_certificate: &str,
    channel_name: &str,
    user_id: impl Into<UserId>,
    role: Role,
    expire_after_seconds: u32,
) -> Result<String, TokenError> {
    let request = TokenRequest {
        app_id,
        app_certificate,
        channel_name,
        user_id: user_id.into(),
        role,
        time: TokenTimeConfig::with_duration(expire_after_seconds as u64),
    };
    generate_with(Version::V006, &request, RandomSalt)
}
