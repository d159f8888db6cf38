use sea_orm::entity::prelude::*;

/// A published revision of a wiki page.
///
/// Created by the approval of a suggested edit; the content is the submitted payload,
/// unchanged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wiki_revisions")]
pub struct Model {
    /// The ID of the revision.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The ID of the moderation item the revision originates from.
    #[sea_orm(unique)]
    pub item_id: u32,
    /// The ID of the user who suggested the edit.
    pub author_id: u32,
    /// The content of the revision.
    pub content: Json,
    /// The ID of the reviewer who approved the edit.
    pub reviewer_id: u32,
    /// When the revision was published.
    pub published_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
