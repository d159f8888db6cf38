use sea_orm::entity::prelude::*;

/// The membership of a user in a clan.
///
/// The user ID is the primary key: a user belongs to at most one clan at a time,
/// and the key makes the invariant structural.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "clan_members")]
pub struct Model {
    /// The ID of the member.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: u32,
    /// The ID of the clan.
    pub clan_id: u32,
    /// The clan role of the member.
    ///
    /// See [`ClanRole`](crate::types::ClanRole) for the known values.
    pub role: u8,
    /// When the member joined the clan.
    pub joined_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clans::Entity",
        from = "Column::ClanId",
        to = "super::clans::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Clans,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::clans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clans.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
