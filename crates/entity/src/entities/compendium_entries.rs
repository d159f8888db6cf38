use sea_orm::entity::prelude::*;

/// A published compendium entry.
///
/// Created exclusively by the approval of a pending moderation item; the content is
/// the submitted payload, unchanged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "compendium_entries")]
pub struct Model {
    /// The ID of the entry.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The ID of the moderation item the entry originates from.
    #[sea_orm(unique)]
    pub item_id: u32,
    /// The ID of the user who authored the entry.
    pub author_id: u32,
    /// The content of the entry.
    pub content: Json,
    /// The ID of the reviewer who approved the entry.
    pub reviewer_id: u32,
    /// When the entry was published.
    pub published_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
