use sea_orm::entity::prelude::*;

/// An applied map update.
///
/// Created by the approval of a map update request; the content is the submitted
/// payload, unchanged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "map_updates")]
pub struct Model {
    /// The ID of the update.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The ID of the moderation item the update originates from.
    #[sea_orm(unique)]
    pub item_id: u32,
    /// The ID of the user who requested the update.
    pub author_id: u32,
    /// The content of the update.
    pub content: Json,
    /// The ID of the reviewer who applied the update.
    pub reviewer_id: u32,
    /// When the update was applied.
    pub published_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
