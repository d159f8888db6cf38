//! This module contains anything related to user accounts in this library.

use chrono::Utc;
use entity::types::Role;
use entity::users;
use notifier::{ActivityEntry, Notification, Sinks};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait, QueryFilter as _};

use crate::error::{CommunityError, CommunityResult};
use crate::perms::{self, Permission};
use crate::{must, sink};

/// Returns the optional user from the provided ID.
pub async fn get_user<C: ConnectionTrait>(
    conn: &C,
    user_id: u32,
) -> CommunityResult<Option<users::Model>> {
    Ok(users::Entity::find_by_id(user_id).one(conn).await?)
}

/// Returns the optional user from the provided username.
pub async fn get_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> CommunityResult<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?)
}

/// Creates a new account with the [`Role::User`] role.
pub async fn create_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    email: &str,
) -> CommunityResult<users::Model> {
    if get_user_by_username(conn, username).await?.is_some() {
        return Err(CommunityError::UsernameTaken(username.to_owned()));
    }

    let user = users::ActiveModel {
        username: Set(username.to_owned()),
        email: Set(email.to_owned()),
        role: Set(Role::User.into()),
        join_date: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let id = users::Entity::insert(user).exec(conn).await?.last_insert_id;
    must::have_user(conn, id).await
}

/// Changes the role of a user.
///
/// The acting user must hold [`Permission::ManageUsers`]. The role byte is validated
/// before anything is mutated.
pub async fn set_role<C: ConnectionTrait>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    user_id: u32,
    role: u8,
) -> CommunityResult<users::Model> {
    perms::require(actor, Permission::ManageUsers)?;
    let role = Role::try_from(role)?;

    let target = must::have_user(conn, user_id).await?;
    let mut target = users::ActiveModel::from(target);
    target.role = Set(role.into());
    let updated = users::Entity::update(target).exec(conn).await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(user_id, actor.id, "role_change", format!("role set to {role}")),
    );
    sink::notify(
        sinks,
        Notification::new(
            user_id,
            "role_change",
            format!("Your role is now {role}"),
            Some(actor.id),
        ),
    );

    Ok(updated)
}
