//! This module contains utility functions used to retrieve some objects from the
//! database, that must exist. This is why it is called `must`.
//!
//! Unlike the Rust conventions, when such an object doesn't exist, the returned value
//! isn't `Option::None` but the corresponding error (for example,
//! [`CommunityError::UserNotFound`]). At the points where these functions are called,
//! the object is most likely already registered, and the caller wants the error
//! propagated to the client rather than checked repeatedly.

use entity::{clan_members, clans, moderation_items, users};
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::error::{CommunityError, CommunityResult};
use crate::user;

/// Returns the user in the database bound to the provided ID.
pub async fn have_user<C: ConnectionTrait>(conn: &C, user_id: u32) -> CommunityResult<users::Model> {
    user::get_user(conn, user_id)
        .await?
        .ok_or(CommunityError::UserNotFound(user_id))
}

/// Returns the user in the database bound to the provided username.
pub async fn have_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> CommunityResult<users::Model> {
    user::get_user_by_username(conn, username)
        .await?
        .ok_or_else(|| CommunityError::UsernameNotFound(username.to_owned()))
}

/// Returns the clan in the database bound to the provided ID.
pub async fn have_clan<C: ConnectionTrait>(conn: &C, clan_id: u32) -> CommunityResult<clans::Model> {
    clans::Entity::find_by_id(clan_id)
        .one(conn)
        .await?
        .ok_or(CommunityError::ClanNotFound(clan_id))
}

/// Returns the membership of the provided user in the provided clan.
pub async fn have_member<C: ConnectionTrait>(
    conn: &C,
    clan_id: u32,
    user_id: u32,
) -> CommunityResult<clan_members::Model> {
    match clan_members::Entity::find_by_id(user_id).one(conn).await? {
        Some(member) if member.clan_id == clan_id => Ok(member),
        _ => Err(CommunityError::NotAClanMember(user_id, clan_id)),
    }
}

/// Returns the moderation item in the database bound to the provided ID.
pub async fn have_item<C: ConnectionTrait>(
    conn: &C,
    item_id: u32,
) -> CommunityResult<moderation_items::Model> {
    moderation_items::Entity::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or(CommunityError::ModerationItemNotFound(item_id))
}
