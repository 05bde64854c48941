use thiserror::Error;

/// Errors produced while building, encoding, decoding or verifying tokens
#[derive(Debug, Error)]
pub enum TokenError {
    /// Empty or malformed identity, certificate or channel name
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A numeric field does not fit its fixed-width wire representation
    #[error("Encoding error: {field} = {value} is outside the wire range 0..={max}")]
    Encoding {
        field: &'static str,
        value: i128,
        max: u64,
    },

    /// The keyed hash rejected the signing key
    #[error("Signing error: {0}")]
    Signing(String),

    /// The token string or its payload could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// The version tag is not one this crate understands, or not the one expected
    #[error("Unsupported token version: {0}")]
    UnsupportedVersion(String),

    /// The recomputed signature does not match the one carried in the token
    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl TokenError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        TokenError::InvalidInput(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        TokenError::Malformed(msg.into())
    }

    pub fn signing<S: Into<String>>(msg: S) -> Self {
        TokenError::Signing(msg.into())
    }

    pub fn encoding(field: &'static str, value: impl Into<i128>, max: u64) -> Self {
        TokenError::Encoding {
            field,
            value: value.into(),
            max,
        }
    }
}

impl From<hex::FromHexError> for TokenError {
    fn from(error: hex::FromHexError) -> Self {
        TokenError::InvalidInput(format!("certificate is not valid hex: {}", error))
    }
}
