use std::sync::Arc;
use tracing::debug;

use crate::access_token::TokenTimeConfig;
use crate::codec::{self, Version};
use crate::error::TokenError;
use crate::identity::{AppCertificate, AppId};
use crate::privilege::{Privilege, PrivilegeSet};
use crate::salt::{RandomSalt, SaltSource, SALT_RANGE};
use crate::service::UserId;
use crate::sign::Signer;
use crate::wire::Packer;

/// Builder for version `006` tokens.
///
/// The payload is flat (`salt || issue_ts || expire_at || privileges`) and does
/// not carry the channel or the user. Both are mixed into the signed content
/// instead, so a verifier must know them up front:
///
/// ```text
/// signature = HMAC(certificate, app_id || channel_name || user_id || payload)
/// ```
#[derive(Clone)]
pub struct ChannelToken {
    app_id: AppId,
    certificate: AppCertificate,
    channel_name: String,
    user_id: UserId,
    issue_ts: i64,
    expire_at: i64,
    privileges: PrivilegeSet,
    salt_source: Arc<dyn SaltSource>,
}

impl ChannelToken {
    pub fn new(
        app_id: &str,
        app_certificate: &str,
        channel_name: &str,
        user_id: impl Into<UserId>,
        time_config: TokenTimeConfig,
    ) -> Result<Self, TokenError> {
        Self::from_parts(
            AppId::parse(app_id)?,
            AppCertificate::from_hex(app_certificate)?,
            channel_name,
            user_id,
            time_config,
        )
    }

    pub fn from_parts(
        app_id: AppId,
        certificate: AppCertificate,
        channel_name: &str,
        user_id: impl Into<UserId>,
        time_config: TokenTimeConfig,
    ) -> Result<Self, TokenError> {
        if channel_name.is_empty() {
            return Err(TokenError::invalid_input("channel_name must not be empty"));
        }
        let issue_ts = time_config.issue_ts();
        let expire_at = i64::try_from(time_config.duration)
            .ok()
            .and_then(|duration| issue_ts.checked_add(duration))
            .ok_or_else(|| {
                TokenError::encoding("expire_at", time_config.duration, u32::MAX as u64)
            })?;
        Ok(Self {
            app_id,
            certificate,
            channel_name: channel_name.to_string(),
            user_id: user_id.into(),
            issue_ts,
            expire_at,
            privileges: PrivilegeSet::new(),
            salt_source: Arc::new(RandomSalt),
        })
    }

    pub fn with_salt_source(mut self, source: impl SaltSource + 'static) -> Self {
        self.salt_source = Arc::new(source);
        self
    }

    pub fn add_privilege(&mut self, privilege: Privilege, expire_at: u64) -> &mut Self {
        self.privileges.add(privilege, expire_at);
        self
    }

    pub fn issue_ts(&self) -> i64 {
        self.issue_ts
    }

    /// Absolute expiration written into the payload header
    pub fn expire_at(&self) -> i64 {
        self.expire_at
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        &self.privileges
    }

    pub(crate) fn pack(&self, salt: u32) -> Result<Vec<u8>, TokenError> {
        if !SALT_RANGE.contains(&salt) {
            return Err(TokenError::encoding("salt", salt, *SALT_RANGE.end() as u64));
        }
        let mut packer = Packer::new();
        packer.put_u32("salt", salt as u64)?;
        packer.put_timestamp("issue_ts", self.issue_ts)?;
        packer.put_timestamp("expire_at", self.expire_at)?;
        self.privileges.pack_into(&mut packer)?;
        Ok(packer.into_bytes())
    }

    pub fn build(&self) -> Result<String, TokenError> {
        let salt = self.salt_source.next_salt();
        let payload = self.pack(salt)?;

        let mut signer = Signer::new(self.certificate.as_bytes())?;
        signer
            .update(self.app_id.as_bytes())
            .update(self.channel_name.as_bytes())
            .update(self.user_id.as_str().as_bytes())
            .update(&payload);
        let signature = signer.finalize();

        debug!(
            app_id = %self.app_id,
            version = %Version::V006,
            channel = %self.channel_name,
            privileges = self.privileges.len(),
            expire_at = self.expire_at,
            "built channel token"
        );

        Ok(codec::encode(
            Version::V006,
            &self.app_id,
            &signature,
            &payload,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::FixedSalt;

    fn fixed_token() -> ChannelToken {
        ChannelToken::new(
            &"a".repeat(32),
            &"00".repeat(16),
            "room1",
            42u32,
            TokenTimeConfig {
                start_time: Some(1_700_000_000),
                duration: 3600,
            },
        )
        .unwrap()
        .with_salt_source(FixedSalt(1))
    }

    #[test]
    fn test_known_payload_and_token() {
        let mut token = fixed_token();
        token.add_privilege(Privilege::JoinChannel, 1_700_003_600);

        assert_eq!(
            hex::encode(token.pack(1).unwrap()),
            "000000016553f1006553ff10000100016553ff10"
        );
        assert_eq!(
            token.build().unwrap(),
            "006aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaah3u20wEJM0Mkn/wq41J4EYlQLiwRn8F54St0Nj2qMhEAAAAAWVT8QBlU/8QAAEAAWVT/xA"
        );
    }

    #[test]
    fn test_channel_is_part_of_signature() {
        let mut a = fixed_token();
        a.add_privilege(Privilege::JoinChannel, 1);

        let mut b = ChannelToken::new(
            &"a".repeat(32),
            &"00".repeat(16),
            "room2",
            42u32,
            TokenTimeConfig {
                start_time: Some(1_700_000_000),
                duration: 3600,
            },
        )
        .unwrap()
        .with_salt_source(FixedSalt(1));
        b.add_privilege(Privilege::JoinChannel, 1);

        let (a, b) = (a.build().unwrap(), b.build().unwrap());
        // identical payload, different signature
        assert_ne!(a, b);
        assert_eq!(a[a.len() - 27..], b[b.len() - 27..]);
    }

    #[test]
    fn test_empty_channel_is_rejected() {
        let result = ChannelToken::new(
            &"a".repeat(32),
            &"00".repeat(16),
            "",
            1u32,
            TokenTimeConfig::default(),
        );
        assert!(matches!(result, Err(TokenError::InvalidInput(_))));
    }
}
