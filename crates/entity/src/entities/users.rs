use sea_orm::entity::prelude::*;

/// A registered user of the community website.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// The user ID.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The unique username.
    #[sea_orm(unique)]
    pub username: String,
    /// The email address the account was registered with.
    pub email: String,
    /// The role of the user.
    ///
    /// See [`Role`](crate::types::Role) for the known values.
    pub role: u8,
    /// When the account was created.
    pub join_date: DateTime,
    /// An optional note from the staff.
    pub admins_note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::clan_members::Entity")]
    ClanMembers,
    #[sea_orm(has_many = "super::moderation_items::Entity")]
    ModerationItems,
}

impl Related<super::clan_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClanMembers.def()
    }
}

impl Related<super::moderation_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModerationItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
