use sea_orm::entity::prelude::*;

/// A bilateral relationship request between two parties.
///
/// Depending on the [`kind`](Model::kind), the requester and the target are two users
/// (friend requests), a user and a clan (join requests) or a clan and a user
/// (invitations). Rejected and cancelled requests are removed from the table, so the
/// only stored statuses are pending and accepted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "relationships")]
pub struct Model {
    /// The ID of the request.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The kind of the relationship.
    ///
    /// See [`RelationshipKind`](crate::types::RelationshipKind) for the known values.
    pub kind: u8,
    /// The party at the origin of the request.
    pub requester_id: u32,
    /// The party the request is addressed to.
    pub target_id: u32,
    /// The status of the relationship.
    ///
    /// See [`RelationshipStatus`](crate::types::RelationshipStatus) for the known values.
    pub status: u8,
    /// When the request was sent.
    pub requested_at: DateTime,
    /// When the request was accepted, if it was.
    pub resolved_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
