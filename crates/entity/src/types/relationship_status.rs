/// The stored status of a relationship request.
///
/// Rejections and cancellations remove the row, so there is no rejected status here.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RelationshipStatus {
    /// The request awaits a response from its target.
    Pending = 0,
    /// The request was accepted.
    Accepted = 1,
}

/// The provided discriminant is not a known relationship status.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown relationship status with id `{0}`")]
pub struct UnknownRelationshipStatus(pub u8);

impl TryFrom<u8> for RelationshipStatus {
    type Error = UnknownRelationshipStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RelationshipStatus::Pending),
            1 => Ok(RelationshipStatus::Accepted),
            other => Err(UnknownRelationshipStatus(other)),
        }
    }
}

impl From<RelationshipStatus> for u8 {
    fn from(value: RelationshipStatus) -> Self {
        value as u8
    }
}
