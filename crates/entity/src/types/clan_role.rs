use std::fmt;

/// The role of a member inside their clan.
///
/// Ordered by authority, so tiers can be compared directly.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ClanRole {
    /// A regular member.
    Member = 0,
    /// An officer, trusted with the membership intake.
    Officer = 1,
    /// The leader of the clan. There is exactly one per clan.
    Leader = 2,
}

/// The provided discriminant is not a known clan role.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown clan role with id `{0}`")]
pub struct UnknownClanRole(pub u8);

impl ClanRole {
    /// The name of the clan role, as displayed on the website.
    pub fn as_str(self) -> &'static str {
        match self {
            ClanRole::Member => "member",
            ClanRole::Officer => "officer",
            ClanRole::Leader => "leader",
        }
    }
}

impl TryFrom<u8> for ClanRole {
    type Error = UnknownClanRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClanRole::Member),
            1 => Ok(ClanRole::Officer),
            2 => Ok(ClanRole::Leader),
            other => Err(UnknownClanRole(other)),
        }
    }
}

impl From<ClanRole> for u8 {
    fn from(value: ClanRole) -> Self {
        value as u8
    }
}

impl fmt::Display for ClanRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
