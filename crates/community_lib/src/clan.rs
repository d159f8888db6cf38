//! Clans: creation, tiered membership, join requests and invitations.
//!
//! Join and invite flows delegate to the [`relationship`](crate::relationship) engine;
//! the membership row created on acceptance is the durable state, written in the same
//! transaction as the request resolution. Authority is two-layered: clan-scoped
//! (leader, officers) or global through [`Permission::ManageClans`].
//!
//! Every state change appends an activity-log entry; the entry is a fire-and-forget
//! side effect and never rolls back the change it describes.

use chrono::Utc;
use entity::types::{ClanRole, RelationshipKind};
use entity::{clan_members, clans, relationships, users};
use itertools::Itertools as _;
use mkenv::prelude::*;
use notifier::{ActivityEntry, Notification, Sinks};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait as _, Condition, ConnectionTrait, EntityTrait, PaginatorTrait as _,
    QueryFilter as _, SqlErr, TransactionTrait,
};

use crate::error::{CommunityError, CommunityResult};
use crate::perms::{self, Permission};
use crate::relationship::{self, RequestOutcome};
use crate::{must, sink, transaction};

const MAX_NAME_LEN: usize = 40;

/// Returns the membership row of the provided user, in whatever clan.
pub async fn membership_of<C: ConnectionTrait>(
    conn: &C,
    user_id: u32,
) -> CommunityResult<Option<clan_members::Model>> {
    Ok(clan_members::Entity::find_by_id(user_id).one(conn).await?)
}

/// Returns the members of a clan with their accounts, highest tier first, then by
/// username.
pub async fn members<C: ConnectionTrait>(
    conn: &C,
    clan_id: u32,
) -> CommunityResult<Vec<(clan_members::Model, users::Model)>> {
    must::have_clan(conn, clan_id).await?;

    let rows = clan_members::Entity::find()
        .filter(clan_members::Column::ClanId.eq(clan_id))
        .find_also_related(users::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(member, user)| user.map(|user| (member, user)))
        .sorted_by_key(|(member, user)| (std::cmp::Reverse(member.role), user.username.clone()))
        .collect())
}

/// Founds a new clan, with `founder` as its leader.
pub async fn create_clan<C>(
    conn: &C,
    sinks: &Sinks,
    founder: &users::Model,
    name: &str,
    description: Option<String>,
) -> CommunityResult<clans::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    perms::require(founder, Permission::CreateClans)?;
    let name = validate_name(name)?;

    let clan = transaction::within(conn, async |txn| {
        if membership_of(txn, founder.id).await?.is_some() {
            return Err(CommunityError::AlreadyInClan(founder.id));
        }
        if clans::Entity::find()
            .filter(clans::Column::Name.eq(name))
            .one(txn)
            .await?
            .is_some()
        {
            return Err(CommunityError::ClanNameTaken(name.to_owned()));
        }

        let now = Utc::now().naive_utc();
        let clan = clans::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(description.clone()),
            leader_id: Set(founder.id),
            created_at: Set(now),
            ..Default::default()
        };
        let clan_id = match clans::Entity::insert(clan).exec(txn).await {
            Ok(res) => res.last_insert_id,
            // Unique index backstop for concurrent founders picking the same name.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(CommunityError::ClanNameTaken(name.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        let leader = clan_members::ActiveModel {
            user_id: Set(founder.id),
            clan_id: Set(clan_id),
            role: Set(ClanRole::Leader.into()),
            joined_at: Set(now),
        };
        clan_members::Entity::insert(leader)
            .exec(txn)
            .await
            .map_err(|e| member_insert_err(founder.id, e))?;

        must::have_clan(txn, clan_id).await
    })
    .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan.id,
            founder.id,
            "clan_created",
            format!("clan `{}` founded by {}", clan.name, founder.username),
        ),
    );

    Ok(clan)
}

/// Deletes a clan, its memberships and its pending requests.
pub async fn delete_clan<C>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
) -> CommunityResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;
    require_leader(actor, &clan)?;

    transaction::within(conn, async |txn| {
        clan_members::Entity::delete_many()
            .filter(clan_members::Column::ClanId.eq(clan_id))
            .exec(txn)
            .await?;

        relationships::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(
                                relationships::Column::Kind
                                    .eq(u8::from(RelationshipKind::ClanJoin)),
                            )
                            .add(relationships::Column::TargetId.eq(clan_id)),
                    )
                    .add(
                        Condition::all()
                            .add(
                                relationships::Column::Kind
                                    .eq(u8::from(RelationshipKind::ClanInvite)),
                            )
                            .add(relationships::Column::RequesterId.eq(clan_id)),
                    ),
            )
            .exec(txn)
            .await?;

        clans::Entity::delete_by_id(clan_id).exec(txn).await?;
        Ok::<_, CommunityError>(())
    })
    .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan_id,
            actor.id,
            "clan_deleted",
            format!("clan `{}` deleted", clan.name),
        ),
    );

    Ok(())
}

/// Asks to join a clan.
///
/// If the clan already invited the user, the two proposals collapse into an immediate
/// acceptance, like symmetric friend requests do.
pub async fn request_join<C>(
    conn: &C,
    sinks: &Sinks,
    user: &users::Model,
    clan_id: u32,
) -> CommunityResult<RequestOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;
    if membership_of(conn, user.id).await?.is_some() {
        return Err(CommunityError::AlreadyInClan(user.id));
    }

    let outcome = transaction::within(conn, async |txn| {
        match relationship::take_pending(txn, RelationshipKind::ClanInvite, clan.id, user.id).await
        {
            Ok(row) => {
                insert_member(txn, &clan, user.id, ClanRole::Member).await?;
                Ok(RequestOutcome::AutoAccepted(row))
            }
            Err(CommunityError::RelationshipNotFound(_)) => {
                relationship::request(txn, RelationshipKind::ClanJoin, user.id, clan.id).await
            }
            Err(e) => Err(e),
        }
    })
    .await?;

    match &outcome {
        RequestOutcome::Sent(_) => sink::notify(
            sinks,
            Notification::new(
                clan.leader_id,
                "clan_join_request",
                format!("{} asked to join {}", user.username, clan.name),
                Some(user.id),
            ),
        ),
        RequestOutcome::AutoAccepted(_) => sink::record_activity(
            sinks,
            ActivityEntry::new(
                clan.id,
                user.id,
                "member_joined",
                format!("{} joined the clan", user.username),
            ),
        ),
        _ => (),
    }

    Ok(outcome)
}

/// Cancels one's own pending join request.
pub async fn cancel_join<C: ConnectionTrait>(
    conn: &C,
    user: &users::Model,
    clan_id: u32,
) -> CommunityResult<()> {
    relationship::cancel(conn, RelationshipKind::ClanJoin, user.id, clan_id).await
}

/// Invites a user into a clan.
///
/// If the user already asked to join, the two proposals collapse into an immediate
/// acceptance.
pub async fn invite<C>(
    conn: &C,
    sinks: &Sinks,
    inviter: &users::Model,
    clan_id: u32,
    user_id: u32,
) -> CommunityResult<RequestOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;
    require_officer(conn, inviter, &clan).await?;
    let target = must::have_user(conn, user_id).await?;
    if membership_of(conn, user_id).await?.is_some() {
        return Err(CommunityError::AlreadyInClan(user_id));
    }

    let outcome = transaction::within(conn, async |txn| {
        match relationship::take_pending(txn, RelationshipKind::ClanJoin, user_id, clan.id).await {
            Ok(row) => {
                insert_member(txn, &clan, user_id, ClanRole::Member).await?;
                Ok(RequestOutcome::AutoAccepted(row))
            }
            Err(CommunityError::RelationshipNotFound(_)) => {
                relationship::request(txn, RelationshipKind::ClanInvite, clan.id, user_id).await
            }
            Err(e) => Err(e),
        }
    })
    .await?;

    match &outcome {
        RequestOutcome::Sent(_) => sink::notify(
            sinks,
            Notification::new(
                user_id,
                "clan_invite",
                format!("You have been invited to join {}", clan.name),
                Some(inviter.id),
            ),
        ),
        RequestOutcome::AutoAccepted(_) => sink::record_activity(
            sinks,
            ActivityEntry::new(
                clan.id,
                inviter.id,
                "member_joined",
                format!("{} joined the clan", target.username),
            ),
        ),
        _ => (),
    }

    Ok(outcome)
}

/// Revokes a pending invitation.
pub async fn revoke_invite<C: ConnectionTrait>(
    conn: &C,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
) -> CommunityResult<()> {
    let clan = must::have_clan(conn, clan_id).await?;
    require_officer(conn, actor, &clan).await?;
    relationship::cancel(conn, RelationshipKind::ClanInvite, clan.id, user_id).await
}

/// Approves a pending join request.
pub async fn approve_join<C>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
) -> CommunityResult<clan_members::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;
    require_officer(conn, actor, &clan).await?;

    let member = transaction::within(conn, async |txn| {
        relationship::take_pending(txn, RelationshipKind::ClanJoin, user_id, clan.id).await?;
        insert_member(txn, &clan, user_id, ClanRole::Member).await
    })
    .await?;

    sink::notify(
        sinks,
        Notification::new(
            user_id,
            "clan_join_approved",
            format!("Your request to join {} was approved", clan.name),
            Some(actor.id),
        ),
    );
    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan.id,
            actor.id,
            "member_joined",
            format!("user {user_id} joined the clan"),
        ),
    );

    Ok(member)
}

/// Rejects a pending join request.
pub async fn reject_join<C: ConnectionTrait>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
) -> CommunityResult<()> {
    let clan = must::have_clan(conn, clan_id).await?;
    require_officer(conn, actor, &clan).await?;
    relationship::reject(conn, RelationshipKind::ClanJoin, user_id, clan.id).await?;

    sink::notify(
        sinks,
        Notification::new(
            user_id,
            "clan_join_rejected",
            format!("Your request to join {} was rejected", clan.name),
            Some(actor.id),
        ),
    );

    Ok(())
}

/// Accepts an invitation, joining the clan as a member.
pub async fn accept_invite<C>(
    conn: &C,
    sinks: &Sinks,
    user: &users::Model,
    clan_id: u32,
) -> CommunityResult<clan_members::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;

    let member = transaction::within(conn, async |txn| {
        relationship::take_pending(txn, RelationshipKind::ClanInvite, clan.id, user.id).await?;
        insert_member(txn, &clan, user.id, ClanRole::Member).await
    })
    .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan.id,
            user.id,
            "member_joined",
            format!("{} joined the clan", user.username),
        ),
    );

    Ok(member)
}

/// Declines an invitation.
pub async fn decline_invite<C: ConnectionTrait>(
    conn: &C,
    user: &users::Model,
    clan_id: u32,
) -> CommunityResult<()> {
    relationship::reject(conn, RelationshipKind::ClanInvite, clan_id, user.id).await
}

/// Adds a user to a clan directly, bypassing the request flows.
///
/// Reserved to the clan leader or a global clan manager. The leader tier cannot be
/// handed out here; it only moves through [`change_role`].
pub async fn add_member<C>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
    role: u8,
) -> CommunityResult<clan_members::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let role = ClanRole::try_from(role)?;
    if role == ClanRole::Leader {
        return Err(CommunityError::LeaderRequired);
    }

    let clan = must::have_clan(conn, clan_id).await?;
    require_leader(actor, &clan)?;
    must::have_user(conn, user_id).await?;

    let member =
        transaction::within(conn, async |txn| insert_member(txn, &clan, user_id, role).await)
            .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan_id,
            actor.id,
            "member_added",
            format!("user {user_id} added as {role}"),
        ),
    );

    Ok(member)
}

/// Removes a member from a clan.
///
/// The caller must be the leader, a global clan manager, or the member themselves
/// (leaving). Removing the leader requires a `successor` promoted in the same call, so
/// the clan never loses its single leader.
pub async fn remove_member<C>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
    successor: Option<u32>,
) -> CommunityResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let clan = must::have_clan(conn, clan_id).await?;
    if actor.id != user_id {
        require_leader(actor, &clan)?;
    }

    transaction::within(conn, async |txn| {
        let member = must::have_member(txn, clan_id, user_id).await?;

        if ClanRole::try_from(member.role)? == ClanRole::Leader {
            let successor_id = successor.ok_or(CommunityError::LeaderRequired)?;
            if successor_id == user_id {
                return Err(CommunityError::LeaderRequired);
            }
            promote_leader(txn, &clan, successor_id).await?;
        }

        clan_members::Entity::delete_by_id(user_id).exec(txn).await?;
        Ok::<_, CommunityError>(())
    })
    .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan_id,
            actor.id,
            if actor.id == user_id {
                "member_left"
            } else {
                "member_removed"
            },
            format!("user {user_id} left the clan"),
        ),
    );

    Ok(())
}

/// Leaves one's clan.
pub async fn leave<C>(
    conn: &C,
    sinks: &Sinks,
    user: &users::Model,
    clan_id: u32,
    successor: Option<u32>,
) -> CommunityResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    remove_member(conn, sinks, user, clan_id, user.id, successor).await
}

/// Changes the clan role of a member.
///
/// Promoting to leader transfers the leadership: the incumbent steps down to officer
/// in the same transaction. Demoting the sitting leader directly is refused — the clan
/// keeps exactly one leader at all times.
pub async fn change_role<C>(
    conn: &C,
    sinks: &Sinks,
    actor: &users::Model,
    clan_id: u32,
    user_id: u32,
    new_role: u8,
) -> CommunityResult<clan_members::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let new_role = ClanRole::try_from(new_role)?;
    let clan = must::have_clan(conn, clan_id).await?;
    require_leader(actor, &clan)?;

    let member = transaction::within(conn, async |txn| {
        let member = must::have_member(txn, clan_id, user_id).await?;

        if user_id == clan.leader_id {
            return if new_role == ClanRole::Leader {
                Ok(member)
            } else {
                Err(CommunityError::LeaderRequired)
            };
        }

        if new_role == ClanRole::Leader {
            let incumbent = must::have_member(txn, clan_id, clan.leader_id).await?;
            let mut incumbent = clan_members::ActiveModel::from(incumbent);
            incumbent.role = Set(ClanRole::Officer.into());
            clan_members::Entity::update(incumbent).exec(txn).await?;

            let mut clan_row = clans::ActiveModel::from(clan.clone());
            clan_row.leader_id = Set(user_id);
            clans::Entity::update(clan_row).exec(txn).await?;
        }

        let mut member = clan_members::ActiveModel::from(member);
        member.role = Set(new_role.into());
        Ok(clan_members::Entity::update(member).exec(txn).await?)
    })
    .await?;

    sink::record_activity(
        sinks,
        ActivityEntry::new(
            clan_id,
            actor.id,
            "role_change",
            format!("user {user_id} is now {new_role}"),
        ),
    );

    Ok(member)
}

fn validate_name(name: &str) -> CommunityResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommunityError::InvalidClanName("name is empty".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CommunityError::InvalidClanName(format!(
            "name is longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

/// Checks the actor is the clan leader or holds global clan management.
fn require_leader(actor: &users::Model, clan: &clans::Model) -> CommunityResult<()> {
    if clan.leader_id == actor.id || perms::has_permission(Some(actor), Permission::ManageClans) {
        Ok(())
    } else {
        Err(CommunityError::NotClanLeader)
    }
}

/// Checks the actor may manage the clan's membership intake (officer tier or above).
async fn require_officer<C: ConnectionTrait>(
    conn: &C,
    actor: &users::Model,
    clan: &clans::Model,
) -> CommunityResult<()> {
    if perms::has_permission(Some(actor), Permission::ManageClans) {
        return Ok(());
    }

    let member = match must::have_member(conn, clan.id, actor.id).await {
        Ok(member) => member,
        Err(CommunityError::NotAClanMember(..)) => return Err(CommunityError::NotClanOfficer),
        Err(e) => return Err(e),
    };
    if ClanRole::try_from(member.role)? >= ClanRole::Officer {
        Ok(())
    } else {
        Err(CommunityError::NotClanOfficer)
    }
}

/// Inserts a membership row, enforcing the one-clan-per-user and clan-size invariants.
async fn insert_member<C: ConnectionTrait>(
    conn: &C,
    clan: &clans::Model,
    user_id: u32,
    role: ClanRole,
) -> CommunityResult<clan_members::Model> {
    if membership_of(conn, user_id).await?.is_some() {
        return Err(CommunityError::AlreadyInClan(user_id));
    }

    let count = clan_members::Entity::find()
        .filter(clan_members::Column::ClanId.eq(clan.id))
        .count(conn)
        .await?;
    if count >= crate::env().max_clan_members.get() {
        return Err(CommunityError::ClanFull(clan.id));
    }

    let member = clan_members::ActiveModel {
        user_id: Set(user_id),
        clan_id: Set(clan.id),
        role: Set(role.into()),
        joined_at: Set(Utc::now().naive_utc()),
    };
    clan_members::Entity::insert(member)
        .exec(conn)
        .await
        .map_err(|e| member_insert_err(user_id, e))?;

    must::have_member(conn, clan.id, user_id).await
}

// The membership primary key is the user ID: a concurrent double-join surfaces here.
fn member_insert_err(user_id: u32, e: sea_orm::DbErr) -> CommunityError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CommunityError::AlreadyInClan(user_id),
        _ => e.into(),
    }
}
