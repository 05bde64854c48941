//! String form of a signed token.
//!
//! ```text
//! <version:3><app_id:32><base64 signature><base64 payload>
//! ```
//!
//! There are no separators. The version tag and app id have fixed lengths and
//! the signature is always 32 bytes, so its base64 segment is 44 characters when
//! padded and 43 without.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;
use crate::identity::{AppId, APP_ID_LEN};
use crate::sign::SIGNATURE_LEN;
use crate::utils::{decode_segment, encode_segment};

const VERSION_LEN: usize = 3;
const SIGNATURE_B64_PADDED: usize = 44;
const SIGNATURE_B64_UNPADDED: usize = 43;

/// Wire revision of a token.
///
/// The two revisions have incompatible signed content and payload layouts. A
/// deployment picks one; they are never mixed inside a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Version {
    /// Flat payload; channel and user id are mixed into the signed content.
    /// Base64 segments are emitted without padding.
    #[serde(rename = "006")]
    V006,
    /// Nested multi-service payload. Base64 segments keep their padding.
    #[default]
    #[serde(rename = "007")]
    V007,
}

impl Version {
    pub const fn as_str(self) -> &'static str {
        match self {
            Version::V006 => "006",
            Version::V007 => "007",
        }
    }

    pub const fn padded(self) -> bool {
        match self {
            Version::V006 => false,
            Version::V007 => true,
        }
    }
}

impl FromStr for Version {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "006" => Ok(Version::V006),
            "007" => Ok(Version::V007),
            other => Err(TokenError::UnsupportedVersion(other.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assembles the final token string
pub fn encode(version: Version, app_id: &AppId, signature: &[u8], payload: &[u8]) -> String {
    let padded = version.padded();
    let mut token = String::with_capacity(
        VERSION_LEN + APP_ID_LEN + SIGNATURE_B64_PADDED + payload.len().div_ceil(3) * 4,
    );
    token.push_str(version.as_str());
    token.push_str(app_id.as_str());
    token.push_str(&encode_segment(signature, padded));
    token.push_str(&encode_segment(payload, padded));
    token
}

/// A token split into its parts, signature not yet checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub version: Version,
    pub app_id: AppId,
    pub signature: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Splits a token string into version, app id, signature and payload
pub fn decode(token: &str) -> Result<RawToken, TokenError> {
    let token = token.trim();
    if !token.is_ascii() {
        return Err(TokenError::malformed("token contains non-ASCII characters"));
    }
    if token.len() < VERSION_LEN + APP_ID_LEN + SIGNATURE_B64_UNPADDED {
        return Err(TokenError::malformed("token is too short"));
    }

    let (version, rest) = token.split_at(VERSION_LEN);
    let version: Version = version.parse()?;

    let (app_id, rest) = rest.split_at(APP_ID_LEN);
    let app_id = AppId::parse(app_id)
        .map_err(|_| TokenError::malformed("app id segment is not 32 hex characters"))?;

    let signature_len = if rest.as_bytes().get(SIGNATURE_B64_UNPADDED) == Some(&b'=') {
        SIGNATURE_B64_PADDED
    } else {
        SIGNATURE_B64_UNPADDED
    };
    let (signature, payload) = rest.split_at(signature_len);

    let signature = decode_segment(signature)?;
    if signature.len() != SIGNATURE_LEN {
        return Err(TokenError::malformed(format!(
            "signature is {} bytes, expected {}",
            signature.len(),
            SIGNATURE_LEN
        )));
    }
    if payload.is_empty() {
        return Err(TokenError::malformed("token has no payload"));
    }
    let payload = decode_segment(payload)?;

    Ok(RawToken {
        version,
        app_id,
        signature,
        payload,
    })
}
