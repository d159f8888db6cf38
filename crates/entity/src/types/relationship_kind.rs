use std::fmt;

/// The kind of a relationship request.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RelationshipKind {
    /// A friend request between two users.
    Friend = 0,
    /// A request from a user to join a clan.
    ClanJoin = 1,
    /// An invitation from a clan to a user.
    ClanInvite = 2,
}

/// The provided discriminant is not a known relationship kind.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown relationship kind with id `{0}`")]
pub struct UnknownRelationshipKind(pub u8);

impl RelationshipKind {
    /// The name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Friend => "friend",
            RelationshipKind::ClanJoin => "clan join",
            RelationshipKind::ClanInvite => "clan invite",
        }
    }
}

impl TryFrom<u8> for RelationshipKind {
    type Error = UnknownRelationshipKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RelationshipKind::Friend),
            1 => Ok(RelationshipKind::ClanJoin),
            2 => Ok(RelationshipKind::ClanInvite),
            other => Err(UnknownRelationshipKind(other)),
        }
    }
}

impl From<RelationshipKind> for u8 {
    fn from(value: RelationshipKind) -> Self {
        value as u8
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
