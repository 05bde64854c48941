use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TokenError;
use crate::wire::{Packer, Unpacker};

/// A single capability inside a channel.
///
/// The numeric identifiers are part of the signed payload and must match the
/// verifying service exactly, so the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    JoinChannel,
    PublishAudioStream,
    PublishVideoStream,
    PublishDataStream,
    AdministrateChannel,
}

impl Privilege {
    pub const ALL: [Privilege; 5] = [
        Privilege::JoinChannel,
        Privilege::PublishAudioStream,
        Privilege::PublishVideoStream,
        Privilege::PublishDataStream,
        Privilege::AdministrateChannel,
    ];

    /// Wire identifier
    pub const fn id(self) -> u16 {
        match self {
            Privilege::JoinChannel => 1,
            Privilege::PublishAudioStream => 2,
            Privilege::PublishVideoStream => 3,
            Privilege::PublishDataStream => 4,
            Privilege::AdministrateChannel => 101,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|privilege| privilege.id() == id)
    }
}

impl PartialOrd for Privilege {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Privilege {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Privilege::JoinChannel => "join_channel",
            Privilege::PublishAudioStream => "publish_audio_stream",
            Privilege::PublishVideoStream => "publish_video_stream",
            Privilege::PublishDataStream => "publish_data_stream",
            Privilege::AdministrateChannel => "administrate_channel",
        };
        f.write_str(name)
    }
}

/// Privileges mapped to their absolute expiration (Unix seconds).
///
/// Iteration and serialization are in ascending identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeSet {
    entries: BTreeMap<Privilege, u64>,
}

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `privilege`, replacing any previous expiration
    pub fn add(&mut self, privilege: Privilege, expire_at: u64) {
        self.entries.insert(privilege, expire_at);
    }

    pub fn get(&self, privilege: Privilege) -> Option<u64> {
        self.entries.get(&privilege).copied()
    }

    pub fn contains(&self, privilege: Privilege) -> bool {
        self.entries.contains_key(&privilege)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Privilege, u64)> + '_ {
        self.entries.iter().map(|(privilege, expire)| (*privilege, *expire))
    }

    pub fn privileges(&self) -> impl Iterator<Item = Privilege> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `u16(count) || (u16(id) || u32(expire_at))*`
    pub fn serialize(&self) -> Result<Vec<u8>, TokenError> {
        let mut packer = Packer::new();
        self.pack_into(&mut packer)?;
        Ok(packer.into_bytes())
    }

    pub(crate) fn pack_into(&self, packer: &mut Packer) -> Result<(), TokenError> {
        packer.put_u16("privilege_count", self.entries.len() as u64)?;
        for (privilege, expire_at) in &self.entries {
            packer.put_u16("privilege", privilege.id() as u64)?;
            packer.put_u32("privilege_expire_at", *expire_at)?;
        }
        Ok(())
    }

    pub(crate) fn unpack_from(unpacker: &mut Unpacker<'_>) -> Result<Self, TokenError> {
        let count = unpacker.get_u16("privilege_count")?;
        let mut set = PrivilegeSet::new();
        for _ in 0..count {
            let id = unpacker.get_u16("privilege")?;
            let expire_at = unpacker.get_u32("privilege_expire_at")?;
            let privilege = Privilege::from_id(id)
                .ok_or_else(|| TokenError::malformed(format!("unknown privilege id {}", id)))?;
            if set.contains(privilege) {
                return Err(TokenError::malformed(format!(
                    "privilege {} listed twice",
                    privilege
                )));
            }
            set.add(privilege, expire_at as u64);
        }
        Ok(set)
    }
}

impl FromIterator<(Privilege, u64)> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = (Privilege, u64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for privilege in Privilege::ALL {
            assert_eq!(Privilege::from_id(privilege.id()), Some(privilege));
        }
        assert_eq!(Privilege::from_id(5), None);
        assert_eq!(Privilege::AdministrateChannel.id(), 101);
    }

    #[test]
    fn test_serializes_in_ascending_id_order() {
        let mut set = PrivilegeSet::new();
        set.add(Privilege::AdministrateChannel, 30);
        set.add(Privilege::PublishVideoStream, 20);
        set.add(Privilege::JoinChannel, 10);

        let bytes = set.serialize().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x00, 0x03, // count
                0x00, 0x01, 0x00, 0x00, 0x00, 0x0a, // join
                0x00, 0x03, 0x00, 0x00, 0x00, 0x14, // video
                0x00, 0x65, 0x00, 0x00, 0x00, 0x1e, // admin
            ]
        );
    }

    #[test]
    fn test_add_overwrites_expiration() {
        let mut set = PrivilegeSet::new();
        set.add(Privilege::JoinChannel, 10);
        set.add(Privilege::JoinChannel, 99);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Privilege::JoinChannel), Some(99));
    }

    #[test]
    fn test_expiration_beyond_u32_is_rejected() {
        let mut set = PrivilegeSet::new();
        set.add(Privilege::JoinChannel, u32::MAX as u64 + 1);
        assert!(matches!(
            set.serialize(),
            Err(TokenError::Encoding {
                field: "privilege_expire_at",
                ..
            })
        ));
    }

    #[test]
    fn test_unpack_rejects_unknown_and_duplicate_ids() {
        let unknown = [0x00, 0x01, 0x00, 0x09, 0x00, 0x00, 0x00, 0x01];
        let result = PrivilegeSet::unpack_from(&mut Unpacker::new(&unknown));
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let duplicate = [
            0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
        ];
        let result = PrivilegeSet::unpack_from(&mut Unpacker::new(&duplicate));
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }
}
