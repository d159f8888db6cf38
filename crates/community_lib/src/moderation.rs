//! The review pipeline of user-submitted content.
//!
//! Compendium entries, suggested wiki edits and map update requests all follow the
//! same pending → approved/rejected lifecycle. Approval is the only path that
//! materializes the submitted payload into the published tables, and it does so in the
//! same transaction as the status flip: there is no observable state where one exists
//! without the other.

use chrono::Utc;
use entity::types::{ModerationKind, ModerationStatus};
use entity::{compendium_entries, map_updates, moderation_items, users, wiki_revisions};
use notifier::{Notification, Sinks};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait, QueryFilter as _, QueryOrder as _,
    TransactionTrait,
};

use crate::error::{CommunityError, CommunityResult};
use crate::perms::{self, Permission};
use crate::{internal, must, sink, transaction};

/// Returns the permission required to submit an item of the provided kind.
pub fn submit_permission(kind: ModerationKind) -> Permission {
    match kind {
        ModerationKind::Compendium => Permission::NewCompendium,
        ModerationKind::WikiEdit => Permission::SuggestWikiEdits,
        ModerationKind::MapUpdate => Permission::SubmitMapUpdates,
    }
}

/// Returns the permission required to review an item of the provided kind.
pub fn review_permission(kind: ModerationKind) -> Permission {
    match kind {
        ModerationKind::Compendium => Permission::ApproveCompendium,
        ModerationKind::WikiEdit => Permission::ApproveWikiEdits,
        ModerationKind::MapUpdate => Permission::ReviewMapUpdates,
    }
}

/// The published entity materialized by an approval.
#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    /// A new compendium entry.
    Compendium(compendium_entries::Model),
    /// A new revision of a wiki page.
    WikiRevision(wiki_revisions::Model),
    /// An applied map update.
    MapUpdate(map_updates::Model),
}

impl Published {
    /// The payload carried by the published entity.
    pub fn content(&self) -> &serde_json::Value {
        match self {
            Self::Compendium(entry) => &entry.content,
            Self::WikiRevision(revision) => &revision.content,
            Self::MapUpdate(update) => &update.content,
        }
    }
}

/// Submits a payload for review.
///
/// The submitter must hold the kind-specific submission permission; the payload itself
/// is opaque to the pipeline.
pub async fn submit<C: ConnectionTrait>(
    conn: &C,
    submitter: &users::Model,
    kind: ModerationKind,
    payload: serde_json::Value,
) -> CommunityResult<moderation_items::Model> {
    perms::require(submitter, submit_permission(kind))?;

    let item = moderation_items::ActiveModel {
        kind: Set(kind.into()),
        submitter_id: Set(submitter.id),
        payload: Set(payload),
        status: Set(ModerationStatus::Pending.into()),
        submitted_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let id = moderation_items::Entity::insert(item)
        .exec(conn)
        .await?
        .last_insert_id;
    must::have_item(conn, id).await
}

/// Approves a pending item, materializing its payload into the published entity set.
pub async fn approve<C>(
    conn: &C,
    sinks: &Sinks,
    reviewer: &users::Model,
    item_id: u32,
) -> CommunityResult<Published>
where
    C: ConnectionTrait + TransactionTrait,
{
    let (published, submitter_id) = transaction::within(conn, async |txn| {
        let (item, kind) = pending_item_for_review(txn, reviewer, item_id).await?;
        let submitter_id = item.submitter_id;
        let now = Utc::now().naive_utc();

        let published = match kind {
            ModerationKind::Compendium => {
                let entry = compendium_entries::ActiveModel {
                    item_id: Set(item.id),
                    author_id: Set(item.submitter_id),
                    content: Set(item.payload.clone()),
                    reviewer_id: Set(reviewer.id),
                    published_at: Set(now),
                    ..Default::default()
                };
                let id = compendium_entries::Entity::insert(entry)
                    .exec(txn)
                    .await?
                    .last_insert_id;
                let entry = compendium_entries::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| internal!("compendium entry {id} should be in database"))?;
                Published::Compendium(entry)
            }
            ModerationKind::WikiEdit => {
                let revision = wiki_revisions::ActiveModel {
                    item_id: Set(item.id),
                    author_id: Set(item.submitter_id),
                    content: Set(item.payload.clone()),
                    reviewer_id: Set(reviewer.id),
                    published_at: Set(now),
                    ..Default::default()
                };
                let id = wiki_revisions::Entity::insert(revision)
                    .exec(txn)
                    .await?
                    .last_insert_id;
                let revision = wiki_revisions::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| internal!("wiki revision {id} should be in database"))?;
                Published::WikiRevision(revision)
            }
            ModerationKind::MapUpdate => {
                let update = map_updates::ActiveModel {
                    item_id: Set(item.id),
                    author_id: Set(item.submitter_id),
                    content: Set(item.payload.clone()),
                    reviewer_id: Set(reviewer.id),
                    published_at: Set(now),
                    ..Default::default()
                };
                let id = map_updates::Entity::insert(update)
                    .exec(txn)
                    .await?
                    .last_insert_id;
                let update = map_updates::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| internal!("map update {id} should be in database"))?;
                Published::MapUpdate(update)
            }
        };

        let mut item = moderation_items::ActiveModel::from(item);
        item.status = Set(ModerationStatus::Approved.into());
        item.reviewer_id = Set(Some(reviewer.id));
        item.resolved_at = Set(Some(now));
        moderation_items::Entity::update(item).exec(txn).await?;

        Ok::<_, CommunityError>((published, submitter_id))
    })
    .await?;

    sink::notify(
        sinks,
        Notification::new(
            submitter_id,
            "submission_approved",
            "Your submission has been approved",
            Some(reviewer.id),
        ),
    );

    Ok(published)
}

/// Rejects a pending item, recording the reviewer and an optional reason.
///
/// Nothing is materialized on this path.
pub async fn reject<C>(
    conn: &C,
    sinks: &Sinks,
    reviewer: &users::Model,
    item_id: u32,
    reason: Option<String>,
) -> CommunityResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let submitter_id = transaction::within(conn, async |txn| {
        let (item, _) = pending_item_for_review(txn, reviewer, item_id).await?;
        let submitter_id = item.submitter_id;

        let mut item = moderation_items::ActiveModel::from(item);
        item.status = Set(ModerationStatus::Rejected.into());
        item.reviewer_id = Set(Some(reviewer.id));
        item.reject_reason = Set(reason.clone());
        item.resolved_at = Set(Some(Utc::now().naive_utc()));
        moderation_items::Entity::update(item).exec(txn).await?;

        Ok::<_, CommunityError>(submitter_id)
    })
    .await?;

    let content = match &reason {
        Some(reason) => format!("Your submission has been rejected: {reason}"),
        None => "Your submission has been rejected".to_owned(),
    };
    sink::notify(
        sinks,
        Notification::new(submitter_id, "submission_rejected", content, Some(reviewer.id)),
    );

    Ok(())
}

/// Returns the item if the caller may see it.
///
/// Visibility is restricted to the submitter and to the reviewers of the item's kind.
/// Anyone else gets a not-found error: whether the item exists is not theirs to learn.
pub async fn get_item<C: ConnectionTrait>(
    conn: &C,
    caller: &users::Model,
    item_id: u32,
) -> CommunityResult<moderation_items::Model> {
    let item = must::have_item(conn, item_id).await?;
    let kind = ModerationKind::try_from(item.kind)?;

    if item.submitter_id != caller.id
        && !perms::has_permission(Some(caller), review_permission(kind))
    {
        return Err(CommunityError::ModerationItemNotFound(item_id));
    }

    Ok(item)
}

/// Returns the pending items of the provided kind, oldest first.
pub async fn pending_queue<C: ConnectionTrait>(
    conn: &C,
    caller: &users::Model,
    kind: ModerationKind,
) -> CommunityResult<Vec<moderation_items::Model>> {
    perms::require(caller, review_permission(kind))?;

    let items = moderation_items::Entity::find()
        .filter(moderation_items::Column::Kind.eq(u8::from(kind)))
        .filter(moderation_items::Column::Status.eq(u8::from(ModerationStatus::Pending)))
        .order_by_asc(moderation_items::Column::SubmittedAt)
        .order_by_asc(moderation_items::Column::Id)
        .all(conn)
        .await?;
    Ok(items)
}

/// Loads a pending item and checks the reviewer may resolve it.
///
/// A missing item is not-found; a present but already-resolved one is an invalid-state
/// error, and stays untouched.
async fn pending_item_for_review<C: ConnectionTrait>(
    conn: &C,
    reviewer: &users::Model,
    item_id: u32,
) -> CommunityResult<(moderation_items::Model, ModerationKind)> {
    let item = must::have_item(conn, item_id).await?;
    let kind = ModerationKind::try_from(item.kind)?;
    perms::require(reviewer, review_permission(kind))?;

    if ModerationStatus::try_from(item.status)? != ModerationStatus::Pending {
        return Err(CommunityError::AlreadyResolved(item_id));
    }

    Ok((item, kind))
}
