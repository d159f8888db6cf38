use sea_orm::entity::prelude::*;

/// A clan in the database.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "clans")]
pub struct Model {
    /// The clan ID.
    #[sea_orm(primary_key)]
    pub id: u32,
    /// The name of the clan, unique across the website.
    #[sea_orm(unique)]
    pub name: String,
    /// The description of the clan.
    pub description: Option<String>,
    /// The ID of the user currently leading the clan.
    ///
    /// The leader also has a [`clan_members`](super::clan_members) row with the
    /// leader role. There is exactly one leader at any time.
    pub leader_id: u32,
    /// When the clan was founded.
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::clan_members::Entity")]
    ClanMembers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LeaderId",
        to = "super::users::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Users,
}

impl Related<super::clan_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClanMembers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
