use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;

/// Length of an application identifier in characters
pub const APP_ID_LEN: usize = 32;

/// Application identifier: exactly 32 hexadecimal characters.
///
/// The token string has no separators, so decoders rely on this fixed length
/// to find where the signature starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppId(String);

impl AppId {
    pub fn parse(app_id: &str) -> Result<Self, TokenError> {
        if app_id.is_empty() {
            return Err(TokenError::invalid_input("app_id must not be empty"));
        }
        if app_id.len() != APP_ID_LEN || !app_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::invalid_input(format!(
                "app_id must be {} hexadecimal characters",
                APP_ID_LEN
            )));
        }
        Ok(AppId(app_id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for AppId {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppId::parse(s)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The shared signing secret, decoded from its hex form.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCertificate(Vec<u8>);

impl AppCertificate {
    pub fn from_hex(certificate: &str) -> Result<Self, TokenError> {
        if certificate.is_empty() {
            return Err(TokenError::invalid_input(
                "app_certificate must not be empty",
            ));
        }
        Ok(AppCertificate(hex::decode(certificate)?))
    }

    pub fn from_bytes(key: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TokenError::invalid_input(
                "app_certificate must not be empty",
            ));
        }
        Ok(AppCertificate(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for AppCertificate {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppCertificate::from_hex(s)
    }
}

impl fmt::Debug for AppCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppCertificate([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id_validation() {
        assert!(AppId::parse(&"a".repeat(32)).is_ok());
        assert!(AppId::parse("0123456789ABCDEF0123456789abcdef").is_ok());

        let not_hex = "g".repeat(32);
        let too_long = "a".repeat(33);
        for bad in ["", "abc", not_hex.as_str(), too_long.as_str()] {
            assert!(
                matches!(AppId::parse(bad), Err(TokenError::InvalidInput(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_certificate_decodes_hex() {
        let cert = AppCertificate::from_hex(&"00".repeat(16)).unwrap();
        assert_eq!(cert.as_bytes(), &[0u8; 16]);
    }

    #[test]
    fn test_certificate_rejects_empty_and_non_hex() {
        assert!(matches!(
            AppCertificate::from_hex(""),
            Err(TokenError::InvalidInput(_))
        ));
        assert!(matches!(
            AppCertificate::from_hex("zz"),
            Err(TokenError::InvalidInput(_))
        ));
        assert!(matches!(
            AppCertificate::from_hex("abc"),
            Err(TokenError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_certificate_debug_is_redacted() {
        let cert = AppCertificate::from_hex("deadbeef").unwrap();
        assert_eq!(format!("{:?}", cert), "AppCertificate([REDACTED])");
    }
}
