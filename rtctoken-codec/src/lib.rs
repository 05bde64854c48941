//! # RTC Token Codec
//!
//! Core library for issuing and verifying signed access tokens for a real-time
//! audio/video platform.
//!
//! A token binds an application identity, a channel, a user and a set of
//! time-limited privileges under an HMAC-SHA256 signature keyed by the
//! application certificate. This crate only builds, encodes, decodes and
//! verifies tokens; it has no networking and no configuration layer.
//!
//! ## Features
//!
//! - Two wire revisions: `007` (multi-service, default) and `006` (flat legacy)
//! - Role-based convenience entry points ([`generate_token`], [`generate_channel_token`])
//! - Signature verification and unverified inspection of existing tokens
//! - Pluggable salt source for reproducible output
//!
//! ## Usage
//!
//! ```
//! use rtctoken_codec::{generate_token, verify_token, AppCertificate, Role};
//!
//! fn main() -> Result<(), rtctoken_codec::TokenError> {
//!     let app_id = "970ca35de60c44645bbae8a215061b33";
//!     let certificate = "5cfd2fd1755d40ecb72977518be15d3b";
//!
//!     let token = generate_token(app_id, certificate, "lobby", 2882341273u32, Role::Host, 3600)?;
//!     let content = verify_token(&token, &AppCertificate::from_hex(certificate)?)?;
//!     assert_eq!(content.expire, 3600);
//!     Ok(())
//! }
//! ```

mod access_token;
mod channel_token;
mod codec;
mod error;
mod generate;
mod identity;
mod privilege;
mod salt;
mod service;
mod sign;
mod utils;
mod verify;
mod wire;

pub use access_token::{AccessToken, TokenTimeConfig, DEFAULT_EXPIRE_SECONDS};
pub use channel_token::ChannelToken;
pub use codec::{decode, encode, RawToken, Version};
pub use error::TokenError;
pub use generate::{generate_channel_token, generate_token, generate_with, Role, TokenRequest};
pub use identity::{AppCertificate, AppId, APP_ID_LEN};
pub use privilege::{Privilege, PrivilegeSet};
pub use salt::{FixedSalt, RandomSalt, SaltSource, SALT_RANGE};
pub use service::{RtcService, Service, ServiceType, UserId};
pub use sign::{sign, Signer, SIGNATURE_LEN};
pub use utils::{decode_segment, encode_segment};
pub use verify::{
    inspect_token, verify_channel_token, verify_token, AccessTokenContent, ChannelTokenContent,
    TokenContent,
};

#[cfg(test)]
mod tests {
    use super::*;

    const APP_ID: &str = "970ca35de60c44645bbae8a215061b33";
    const CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

    #[test]
    fn test_generate_and_verify_access_token() {
        let channel = "7d72365eb983485397e3e3f9d460bdda";
        let token =
            generate_token(APP_ID, CERTIFICATE, channel, 2882341273u32, Role::Host, 3600).unwrap();
        let certificate = AppCertificate::from_hex(CERTIFICATE).unwrap();
        let content = verify_token(&token, &certificate).unwrap();

        assert_eq!(content.app_id, APP_ID);
        assert_eq!(content.services.len(), 1);
        match &content.services[0] {
            Service::Rtc(rtc) => {
                assert_eq!(rtc.channel_name, channel);
                assert_eq!(rtc.user_id.as_str(), "2882341273");
                assert!(rtc.privileges.contains(Privilege::PublishVideoStream));
            }
        }
    }

    #[test]
    fn test_account_user_id() {
        let token =
            generate_token(APP_ID, CERTIFICATE, "lobby", "alice@example.com", Role::Audience, 60)
                .unwrap();
        match inspect_token(&token).unwrap() {
            TokenContent::Access(content) => match &content.services[0] {
                Service::Rtc(rtc) => {
                    assert_eq!(rtc.user_id, UserId::account("alice@example.com"));
                    assert_eq!(
                        rtc.privileges.privileges().collect::<Vec<_>>(),
                        vec![Privilege::JoinChannel]
                    );
                }
            },
            other => panic!("Expected 007 content, got {:?}", other),
        }
    }

    #[test]
    fn test_random_salt_stays_in_range() {
        let first = generate_token(APP_ID, CERTIFICATE, "lobby", 1u32, Role::Host, 60).unwrap();
        let second = generate_token(APP_ID, CERTIFICATE, "lobby", 1u32, Role::Host, 60).unwrap();

        let salts = [&first, &second].map(|token| match inspect_token(token).unwrap() {
            TokenContent::Access(content) => content.salt,
            TokenContent::Channel(content) => content.salt,
        });
        for salt in salts {
            assert!(SALT_RANGE.contains(&salt));
        }
    }

    #[test]
    fn test_legacy_token_needs_channel_context() {
        let token =
            generate_channel_token(APP_ID, CERTIFICATE, "lobby", 0u32, Role::Host, 600).unwrap();
        let certificate = AppCertificate::from_hex(CERTIFICATE).unwrap();

        let content = verify_channel_token(&token, &certificate, "lobby", UserId::auto()).unwrap();
        assert_eq!(content.privileges.len(), 4);
        assert!(verify_channel_token(&token, &certificate, "lobby", 7u32).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let certificate = AppCertificate::from_hex(CERTIFICATE).unwrap();
        assert!(verify_token("", &certificate).is_err());
        assert!(verify_token("not a token", &certificate).is_err());
        assert!(inspect_token(&format!("007{}", APP_ID)).is_err());
    }
}
