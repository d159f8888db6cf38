pub mod clan_members;
pub mod clans;
pub mod compendium_entries;
pub mod map_updates;
pub mod moderation_items;
pub mod relationships;
pub mod users;
pub mod wiki_revisions;

pub mod prelude {
    pub use super::clan_members::Entity as ClanMembers;
    pub use super::clans::Entity as Clans;
    pub use super::compendium_entries::Entity as CompendiumEntries;
    pub use super::map_updates::Entity as MapUpdates;
    pub use super::moderation_items::Entity as ModerationItems;
    pub use super::relationships::Entity as Relationships;
    pub use super::users::Entity as Users;
    pub use super::wiki_revisions::Entity as WikiRevisions;
}
