use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 digest in bytes
pub const SIGNATURE_LEN: usize = 32;

/// Incremental HMAC-SHA256 over the signed content of a token.
///
/// Segments fed through [`Signer::update`] are hashed as if concatenated.
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::signing("signing key must not be empty"));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::signing(format!("HMAC rejected the key: {}", e)))?;
        Ok(Self { mac })
    }

    pub fn update(&mut self, segment: &[u8]) -> &mut Self {
        self.mac.update(segment);
        self
    }

    pub fn finalize(self) -> [u8; SIGNATURE_LEN] {
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&self.mac.finalize().into_bytes());
        signature
    }

    /// Constant-time comparison against a signature carried in a token
    pub fn verify(self, signature: &[u8]) -> Result<(), TokenError> {
        self.mac
            .verify_slice(signature)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

/// Signs `message` with `secret`
pub fn sign(secret: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LEN], TokenError> {
    let mut signer = Signer::new(secret)?;
    signer.update(message);
    Ok(signer.finalize())
}
