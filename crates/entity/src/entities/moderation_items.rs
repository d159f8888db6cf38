use sea_orm::entity::prelude::*;

/// A piece of user-submitted content awaiting review.
///
/// The payload is opaque to the review pipeline: it is carried verbatim into the
/// published tables when the item is approved.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "moderation_items")]
pub struct Model {
    /// The ID of the item.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The kind of the submitted content.
    ///
    /// See [`ModerationKind`](crate::types::ModerationKind) for the known values.
    pub kind: u8,
    /// The ID of the user who submitted the item.
    pub submitter_id: u32,
    /// The submitted content.
    pub payload: Json,
    /// The status of the item.
    ///
    /// See [`ModerationStatus`](crate::types::ModerationStatus) for the known values.
    pub status: u8,
    /// The ID of the user who resolved the item, set on approval or rejection.
    pub reviewer_id: Option<u32>,
    /// The reason given by the reviewer on rejection.
    pub reject_reason: Option<String>,
    /// When the item was submitted.
    pub submitted_at: DateTime,
    /// When the item was resolved, if it was.
    pub resolved_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SubmitterId",
        to = "super::users::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
