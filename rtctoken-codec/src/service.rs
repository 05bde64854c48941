use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TokenError;
use crate::privilege::{Privilege, PrivilegeSet};
use crate::wire::{Packer, Unpacker};

/// Service kinds and their wire tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Real-time communication (audio/video channels)
    Rtc,
}

impl ServiceType {
    pub const fn tag(self) -> u16 {
        match self {
            ServiceType::Rtc => 1,
        }
    }

    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(ServiceType::Rtc),
            _ => None,
        }
    }
}

/// User identity as carried on the wire.
///
/// Numeric uids are stored in their decimal form; uid `0` becomes the empty
/// string, which asks the media server to assign one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Auto-assigned uid
    pub fn auto() -> Self {
        UserId(String::new())
    }

    /// String user account, carried verbatim
    pub fn account(account: impl Into<String>) -> Self {
        UserId(account.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u32> for UserId {
    fn from(uid: u32) -> Self {
        if uid == 0 {
            UserId::auto()
        } else {
            UserId(uid.to_string())
        }
    }
}

impl From<&str> for UserId {
    fn from(account: &str) -> Self {
        UserId::account(account)
    }
}

impl From<String> for UserId {
    fn from(account: String) -> Self {
        UserId::account(account)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Privileges scoped to one channel for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcService {
    pub channel_name: String,
    pub user_id: UserId,
    pub privileges: PrivilegeSet,
}

impl RtcService {
    pub fn new(channel_name: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            channel_name: channel_name.into(),
            user_id: user_id.into(),
            privileges: PrivilegeSet::new(),
        }
    }

    pub fn add_privilege(&mut self, privilege: Privilege, expire_at: u64) {
        self.privileges.add(privilege, expire_at);
    }

    /// Builder-style variant of [`RtcService::add_privilege`]
    pub fn with_privilege(mut self, privilege: Privilege, expire_at: u64) -> Self {
        self.add_privilege(privilege, expire_at);
        self
    }
}

/// A service block inside an access token.
///
/// Every kind shares the envelope `u16(type) || privileges || kind fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Service {
    Rtc(RtcService),
}

impl Service {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Service::Rtc(_) => ServiceType::Rtc,
        }
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        match self {
            Service::Rtc(rtc) => &rtc.privileges,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, TokenError> {
        let mut packer = Packer::new();
        self.pack_into(&mut packer)?;
        Ok(packer.into_bytes())
    }

    pub(crate) fn pack_into(&self, packer: &mut Packer) -> Result<(), TokenError> {
        packer.put_u16("service_type", self.service_type().tag() as u64)?;
        self.privileges().pack_into(packer)?;
        match self {
            Service::Rtc(rtc) => {
                if rtc.channel_name.is_empty() {
                    return Err(TokenError::invalid_input("channel_name must not be empty"));
                }
                packer.put_bytes("channel_name", rtc.channel_name.as_bytes())?;
                packer.put_bytes("user_id", rtc.user_id.as_str().as_bytes())?;
            }
        }
        Ok(())
    }

    pub(crate) fn unpack_from(unpacker: &mut Unpacker<'_>) -> Result<Self, TokenError> {
        let tag = unpacker.get_u16("service_type")?;
        let service_type = ServiceType::from_tag(tag)
            .ok_or_else(|| TokenError::malformed(format!("unknown service type {}", tag)))?;
        let privileges = PrivilegeSet::unpack_from(unpacker)?;
        match service_type {
            ServiceType::Rtc => {
                let channel_name = unpacker.get_string("channel_name")?;
                let user_id = UserId::account(unpacker.get_string("user_id")?);
                Ok(Service::Rtc(RtcService {
                    channel_name,
                    user_id,
                    privileges,
                }))
            }
        }
    }
}

impl From<RtcService> for Service {
    fn from(rtc: RtcService) -> Self {
        Service::Rtc(rtc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_uid_is_decimal_string() {
        assert_eq!(UserId::from(42u32).as_str(), "42");
        assert!(UserId::from(0u32).is_auto());
        assert_eq!(UserId::from("alice").as_str(), "alice");
    }

    #[test]
    fn test_rtc_service_layout() {
        let service: Service = RtcService::new("room1", 42u32)
            .with_privilege(Privilege::JoinChannel, 1_700_003_600)
            .into();

        let bytes = service.serialize().unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "0001000100016553ff100005726f6f6d3100023432"
        );
    }

    #[test]
    fn test_auto_uid_serializes_as_empty_string() {
        let service: Service = RtcService::new("c", 0u32).into();
        let bytes = service.serialize().unwrap();
        // type, zero privileges, "c", ""
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x01, b'c', 0x00, 0x00]);
    }

    #[test]
    fn test_oversized_channel_name_is_rejected() {
        let service: Service = RtcService::new("x".repeat(70_000), 1u32).into();
        assert!(matches!(
            service.serialize(),
            Err(TokenError::Encoding {
                field: "channel_name",
                ..
            })
        ));
    }

    #[test]
    fn test_unpack_restores_service() {
        let original: Service = RtcService::new("room1", "user-7")
            .with_privilege(Privilege::JoinChannel, 10)
            .with_privilege(Privilege::PublishAudioStream, 20)
            .into();
        let bytes = original.serialize().unwrap();

        let mut unpacker = Unpacker::new(&bytes);
        let parsed = Service::unpack_from(&mut unpacker).unwrap();
        unpacker.finish().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_unknown_service_type_is_malformed() {
        let bytes = [0x00, 0x09, 0x00, 0x00];
        let result = Service::unpack_from(&mut Unpacker::new(&bytes));
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }
}
