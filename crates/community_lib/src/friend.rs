//! Friend requests and friendships.
//!
//! A thin surface over the [`relationship`](crate::relationship) engine: it checks the
//! caller is the party allowed to trigger the transition, and emits the notifications
//! the website shows. The accepted relationship row is the friendship itself.

use entity::relationships;
use entity::types::{RelationshipKind, RelationshipStatus};
use entity::users;
use notifier::{Notification, Sinks};
use sea_orm::{
    ColumnTrait as _, Condition, ConnectionTrait, EntityTrait, QueryFilter as _, TransactionTrait,
};

use crate::error::{CommunityError, CommunityResult};
use crate::perms::{self, Permission};
use crate::relationship::{self, RequestOutcome};
use crate::{must, sink, transaction};

/// The state of the friendship between two users, as read by one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipState {
    /// No relation between the two users.
    NotFriends,
    /// The reader sent a request which is still pending.
    RequestSent,
    /// The other user sent a request the reader has not resolved yet.
    RequestReceived,
    /// The two users are friends.
    Friends,
}

/// Sends a friend request from `requester` to the user with the provided ID.
pub async fn request<C>(
    conn: &C,
    sinks: &Sinks,
    requester: &users::Model,
    target_id: u32,
) -> CommunityResult<RequestOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    perms::require(requester, Permission::SendFriendRequests)?;
    if requester.id == target_id {
        return Err(CommunityError::SelfRelationship);
    }
    let target = must::have_user(conn, target_id).await?;

    let outcome = transaction::within(conn, async |txn| {
        relationship::request(txn, RelationshipKind::Friend, requester.id, target_id).await
    })
    .await?;

    match &outcome {
        RequestOutcome::Sent(_) => sink::notify(
            sinks,
            Notification::new(
                target.id,
                "friend_request",
                format!("{} sent you a friend request", requester.username),
                Some(requester.id),
            ),
        ),
        RequestOutcome::AutoAccepted(_) => sink::notify(
            sinks,
            Notification::new(
                target.id,
                "friend_accept",
                format!("You are now friends with {}", requester.username),
                Some(requester.id),
            ),
        ),
        _ => (),
    }

    Ok(outcome)
}

/// Accepts the friend request sent by `requester_id` to `target`.
pub async fn accept<C: ConnectionTrait>(
    conn: &C,
    sinks: &Sinks,
    target: &users::Model,
    requester_id: u32,
) -> CommunityResult<()> {
    relationship::accept(conn, RelationshipKind::Friend, requester_id, target.id).await?;

    sink::notify(
        sinks,
        Notification::new(
            requester_id,
            "friend_accept",
            format!("{} accepted your friend request", target.username),
            Some(target.id),
        ),
    );

    Ok(())
}

/// Rejects the friend request sent by `requester_id` to `target`.
///
/// The requester is not notified: from their side, the request silently stops
/// existing.
pub async fn reject<C: ConnectionTrait>(
    conn: &C,
    target: &users::Model,
    requester_id: u32,
) -> CommunityResult<()> {
    relationship::reject(conn, RelationshipKind::Friend, requester_id, target.id).await
}

/// Cancels the pending friend request `requester` sent to the user with the provided
/// ID.
pub async fn cancel<C: ConnectionTrait>(
    conn: &C,
    requester: &users::Model,
    target_id: u32,
) -> CommunityResult<()> {
    relationship::cancel(conn, RelationshipKind::Friend, requester.id, target_id).await
}

/// Removes the friendship between `caller` and the user with the provided ID.
pub async fn remove<C: ConnectionTrait>(
    conn: &C,
    caller: &users::Model,
    other_id: u32,
) -> CommunityResult<()> {
    relationship::remove(conn, RelationshipKind::Friend, caller.id, other_id).await
}

/// Returns the friendship state between `user_id` and `other_id`, from `user_id`'s
/// point of view.
pub async fn state<C: ConnectionTrait>(
    conn: &C,
    user_id: u32,
    other_id: u32,
) -> CommunityResult<FriendshipState> {
    let Some(row) =
        relationship::get_between(conn, RelationshipKind::Friend, user_id, other_id).await?
    else {
        return Ok(FriendshipState::NotFriends);
    };

    Ok(match RelationshipStatus::try_from(row.status)? {
        RelationshipStatus::Accepted => FriendshipState::Friends,
        RelationshipStatus::Pending if row.requester_id == user_id => FriendshipState::RequestSent,
        RelationshipStatus::Pending => FriendshipState::RequestReceived,
    })
}

/// Returns the IDs of the friends of `user_id`.
pub async fn friends_of<C: ConnectionTrait>(conn: &C, user_id: u32) -> CommunityResult<Vec<u32>> {
    let rows = relationships::Entity::find()
        .filter(relationships::Column::Kind.eq(u8::from(RelationshipKind::Friend)))
        .filter(relationships::Column::Status.eq(u8::from(RelationshipStatus::Accepted)))
        .filter(
            Condition::any()
                .add(relationships::Column::RequesterId.eq(user_id))
                .add(relationships::Column::TargetId.eq(user_id)),
        )
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            if row.requester_id == user_id {
                row.target_id
            } else {
                row.requester_id
            }
        })
        .collect())
}

/// Returns the pending friend requests addressed to `user_id`, oldest first.
pub async fn incoming_requests<C: ConnectionTrait>(
    conn: &C,
    user_id: u32,
) -> CommunityResult<Vec<relationships::Model>> {
    relationship::pending_for(conn, RelationshipKind::Friend, user_id).await
}
