/// The status of a moderation item.
///
/// Transitions are one-way: a resolved item never returns to pending.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ModerationStatus {
    /// The item awaits review.
    Pending = 0,
    /// The item was approved and its payload published.
    Approved = 1,
    /// The item was rejected.
    Rejected = 2,
}

/// The provided discriminant is not a known moderation status.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown moderation status with id `{0}`")]
pub struct UnknownModerationStatus(pub u8);

impl TryFrom<u8> for ModerationStatus {
    type Error = UnknownModerationStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModerationStatus::Pending),
            1 => Ok(ModerationStatus::Approved),
            2 => Ok(ModerationStatus::Rejected),
            other => Err(UnknownModerationStatus(other)),
        }
    }
}

impl From<ModerationStatus> for u8 {
    fn from(value: ModerationStatus) -> Self {
        value as u8
    }
}
