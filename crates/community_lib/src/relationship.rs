//! The generic engine behind friend requests, clan join requests and clan invitations.
//!
//! All three kinds share the same shape:
//!
//! ```text
//! none     --request(requester, target)-->  pending
//! pending  --accept(target)-->              accepted
//! pending  --reject(target)-->              none      (row removed)
//! pending  --cancel(requester)-->           none      (row removed)
//! accepted --remove(either party)-->        none      (row removed)
//! ```
//!
//! This module only applies transitions on the `relationships` table; deciding *who*
//! may trigger them is the job of the callers ([`friend`](crate::friend) checks the
//! involved users, [`clan`](crate::clan) checks clan authority). For clan kinds, the
//! durable accepted state is the membership row: the caller takes the pending row with
//! [`take_pending`] and creates the membership inside the same transaction.

use chrono::Utc;
use entity::relationships;
use entity::types::{RelationshipKind, RelationshipStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait as _, Condition, ConnectionTrait, EntityTrait, QueryFilter as _, QueryOrder as _,
    SqlErr,
};

use crate::error::{CommunityError, CommunityResult};
use crate::internal;

/// The result of a [`request`] call.
///
/// Re-sending an existing request is idempotent, not an error; the variants tell the
/// caller which case it hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request was created.
    Sent(relationships::Model),
    /// The same request was already pending.
    AlreadyPending(relationships::Model),
    /// The two parties are already in an accepted relationship.
    AlreadyAccepted(relationships::Model),
    /// The other party had a pending request in the opposite direction; both proposals
    /// collapsed into an acceptance.
    AutoAccepted(relationships::Model),
}

impl RequestOutcome {
    /// The relationship row the outcome refers to.
    pub fn row(&self) -> &relationships::Model {
        match self {
            Self::Sent(row)
            | Self::AlreadyPending(row)
            | Self::AlreadyAccepted(row)
            | Self::AutoAccepted(row) => row,
        }
    }
}

/// Returns the relationship row from `requester_id` to `target_id`, in this direction
/// only.
pub async fn get<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<Option<relationships::Model>> {
    let row = relationships::Entity::find()
        .filter(relationships::Column::Kind.eq(u8::from(kind)))
        .filter(relationships::Column::RequesterId.eq(requester_id))
        .filter(relationships::Column::TargetId.eq(target_id))
        .one(conn)
        .await?;
    Ok(row)
}

/// Returns the relationship row between `a` and `b`, in either direction.
pub async fn get_between<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    a: u32,
    b: u32,
) -> CommunityResult<Option<relationships::Model>> {
    let row = relationships::Entity::find()
        .filter(relationships::Column::Kind.eq(u8::from(kind)))
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(relationships::Column::RequesterId.eq(a))
                        .add(relationships::Column::TargetId.eq(b)),
                )
                .add(
                    Condition::all()
                        .add(relationships::Column::RequesterId.eq(b))
                        .add(relationships::Column::TargetId.eq(a)),
                ),
        )
        .one(conn)
        .await?;
    Ok(row)
}

/// Returns the pending requests addressed to `target_id`, oldest first.
pub async fn pending_for<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    target_id: u32,
) -> CommunityResult<Vec<relationships::Model>> {
    let rows = relationships::Entity::find()
        .filter(relationships::Column::Kind.eq(u8::from(kind)))
        .filter(relationships::Column::TargetId.eq(target_id))
        .filter(relationships::Column::Status.eq(u8::from(RelationshipStatus::Pending)))
        .order_by_asc(relationships::Column::RequestedAt)
        .order_by_asc(relationships::Column::Id)
        .all(conn)
        .await?;
    Ok(rows)
}

/// Creates a pending request from `requester_id` to `target_id`.
///
/// Tie-breaks, per pair and kind:
///
/// * the same request already pending reports [`RequestOutcome::AlreadyPending`];
/// * an accepted relationship reports [`RequestOutcome::AlreadyAccepted`];
/// * a pending request in the opposite direction is accepted instead of creating a
///   second row — two symmetric proposals mean both parties agree.
///
/// A concurrent duplicate insert loses against the unique index on
/// (kind, requester, target) and is reported as [`RequestOutcome::AlreadyPending`].
pub async fn request<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<RequestOutcome> {
    if let Some(row) = get_between(conn, kind, requester_id, target_id).await? {
        return Ok(match RelationshipStatus::try_from(row.status)? {
            RelationshipStatus::Accepted => RequestOutcome::AlreadyAccepted(row),
            RelationshipStatus::Pending if row.requester_id == requester_id => {
                RequestOutcome::AlreadyPending(row)
            }
            RelationshipStatus::Pending => {
                let accepted = accept(conn, kind, row.requester_id, row.target_id).await?;
                RequestOutcome::AutoAccepted(accepted)
            }
        });
    }

    let row = relationships::ActiveModel {
        kind: Set(kind.into()),
        requester_id: Set(requester_id),
        target_id: Set(target_id),
        status: Set(RelationshipStatus::Pending.into()),
        requested_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match relationships::Entity::insert(row).exec(conn).await {
        Ok(res) => {
            let row = relationships::Entity::find_by_id(res.last_insert_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    internal!("relationship {} should be in database", res.last_insert_id)
                })?;
            Ok(RequestOutcome::Sent(row))
        }
        // A concurrent caller just created the same pending row.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let row = get(conn, kind, requester_id, target_id)
                .await?
                .ok_or_else(|| internal!("relationship unique conflict without a stored row"))?;
            Ok(RequestOutcome::AlreadyPending(row))
        }
        Err(e) => Err(e.into()),
    }
}

/// Accepts the pending request from `requester_id` to `target_id`, keeping the row as
/// the durable accepted state.
///
/// This is the friend path; clan flows use [`take_pending`] instead.
pub async fn accept<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<relationships::Model> {
    let row = pending(conn, kind, requester_id, target_id).await?;

    let mut row = relationships::ActiveModel::from(row);
    row.status = Set(RelationshipStatus::Accepted.into());
    row.resolved_at = Set(Some(Utc::now().naive_utc()));
    Ok(relationships::Entity::update(row).exec(conn).await?)
}

/// Deletes and returns the pending request from `requester_id` to `target_id`.
///
/// Clan flows resolve acceptance into a membership row; the request row itself is not
/// kept around.
pub async fn take_pending<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<relationships::Model> {
    let row = pending(conn, kind, requester_id, target_id).await?;
    relationships::Entity::delete_by_id(row.id).exec(conn).await?;
    Ok(row)
}

/// Rejects the pending request from `requester_id` to `target_id`, removing it.
pub async fn reject<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<()> {
    take_pending(conn, kind, requester_id, target_id)
        .await
        .map(drop)
}

/// Cancels the pending request from `requester_id` to `target_id`, removing it.
///
/// Same removal as [`reject`]; the caller is expected to be the requester rather than
/// the target.
pub async fn cancel<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<()> {
    take_pending(conn, kind, requester_id, target_id)
        .await
        .map(drop)
}

/// Removes the accepted relationship between `a` and `b`.
pub async fn remove<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    a: u32,
    b: u32,
) -> CommunityResult<()> {
    let Some(row) = get_between(conn, kind, a, b).await? else {
        return Err(CommunityError::RelationshipNotFound(kind));
    };
    if RelationshipStatus::try_from(row.status)? != RelationshipStatus::Accepted {
        return Err(CommunityError::RelationshipNotFound(kind));
    }

    relationships::Entity::delete_by_id(row.id).exec(conn).await?;
    Ok(())
}

async fn pending<C: ConnectionTrait>(
    conn: &C,
    kind: RelationshipKind,
    requester_id: u32,
    target_id: u32,
) -> CommunityResult<relationships::Model> {
    let Some(row) = get(conn, kind, requester_id, target_id).await? else {
        return Err(CommunityError::RelationshipNotFound(kind));
    };
    if RelationshipStatus::try_from(row.status)? != RelationshipStatus::Pending {
        return Err(CommunityError::RelationshipNotFound(kind));
    }
    Ok(row)
}
