use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::TokenError;

/// Standard alphabet, accepts input with or without `=` padding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode binary token data to a base64 segment
///
/// # Arguments
///
/// * `bytes` - Binary segment (signature or payload)
/// * `padded` - Whether to keep trailing `=` padding
pub fn encode_segment(bytes: &[u8], padded: bool) -> String {
    if padded {
        STANDARD.encode(bytes)
    } else {
        STANDARD_NO_PAD.encode(bytes)
    }
}

/// Decode a base64 segment, with or without padding
///
/// # Returns
///
/// Binary data or TokenError if decoding fails
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    Ok(LENIENT.decode(segment)?)
}
