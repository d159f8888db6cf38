use std::fmt;

/// The kind of a user submission going through review.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ModerationKind {
    /// A new compendium entry.
    Compendium = 0,
    /// A suggested edit to a wiki page.
    WikiEdit = 1,
    /// An update request for a map.
    MapUpdate = 2,
}

/// The provided discriminant is not a known moderation kind.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown moderation kind with id `{0}`")]
pub struct UnknownModerationKind(pub u8);

impl ModerationKind {
    /// The name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationKind::Compendium => "compendium entry",
            ModerationKind::WikiEdit => "wiki edit",
            ModerationKind::MapUpdate => "map update",
        }
    }
}

impl TryFrom<u8> for ModerationKind {
    type Error = UnknownModerationKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModerationKind::Compendium),
            1 => Ok(ModerationKind::WikiEdit),
            2 => Ok(ModerationKind::MapUpdate),
            other => Err(UnknownModerationKind(other)),
        }
    }
}

impl From<ModerationKind> for u8 {
    fn from(value: ModerationKind) -> Self {
        value as u8
    }
}

impl fmt::Display for ModerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
