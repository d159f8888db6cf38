use community_lib::clan;
use community_lib::error::ErrorKind;
use community_lib::relationship::RequestOutcome;
use entity::types::{ClanRole, Role};
use entity::{clan_members, clans, relationships};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use test_env::{recording_sinks, seed_user, wrap};

#[tokio::test]
async fn founding_a_clan_makes_the_founder_leader() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, recorder) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        assert_eq!(clan.name, "Raiders");
        assert_eq!(clan.leader_id, alice.id);

        let member = clan_members::Entity::find_by_id(alice.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(member.clan_id, clan.id);
        assert_eq!(member.role, u8::from(ClanRole::Leader));

        let activity = recorder.activity();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, "clan_created");
        assert_eq!(activity[0].subject_id, clan.id);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn clan_names_are_unique() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        let err = clan::create_clan(&db, &sinks, &bob, "Raiders", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(clans::Entity::find().count(&db).await?, 1);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn empty_clan_names_are_invalid() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;

        let err = clan::create_clan(&db, &sinks, &alice, "   ", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn join_request_flow() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, recorder) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;

        let outcome = clan::request_join(&db, &sinks, &bob, clan.id).await?;
        assert!(matches!(outcome, RequestOutcome::Sent(_)));

        let member = clan::approve_join(&db, &sinks, &alice, clan.id, bob.id).await?;
        assert_eq!(member.role, u8::from(ClanRole::Member));

        // The request row is resolved into the membership, not kept around.
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        let kinds: Vec<_> = recorder
            .notifications()
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, ["clan_join_request", "clan_join_approved"]);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn rejected_join_requests_disappear() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::request_join(&db, &sinks, &bob, clan.id).await?;
        clan::reject_join(&db, &sinks, &alice, clan.id, bob.id).await?;

        assert_eq!(relationships::Entity::find().count(&db).await?, 0);
        assert!(clan::membership_of(&db, bob.id).await?.is_none());

        // Rejecting again: nothing left to reject.
        let err = clan::reject_join(&db, &sinks, &alice, clan.id, bob.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn invite_flow() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;

        let outcome = clan::invite(&db, &sinks, &alice, clan.id, bob.id).await?;
        assert!(matches!(outcome, RequestOutcome::Sent(_)));

        let member = clan::accept_invite(&db, &sinks, &bob, clan.id).await?;
        assert_eq!(member.clan_id, clan.id);
        assert_eq!(member.role, u8::from(ClanRole::Member));
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn inviting_a_pending_requester_collapses_into_membership() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::request_join(&db, &sinks, &bob, clan.id).await?;

        let outcome = clan::invite(&db, &sinks, &alice, clan.id, bob.id).await?;
        assert!(matches!(outcome, RequestOutcome::AutoAccepted(_)));

        let member = clan::membership_of(&db, bob.id).await?.unwrap();
        assert_eq!(member.clan_id, clan.id);
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn users_belong_to_at_most_one_clan() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;
        let carol = seed_user(&db, "carol", Role::User).await?;

        let raiders = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        let pioneers = clan::create_clan(&db, &sinks, &bob, "Pioneers", None).await?;

        clan::invite(&db, &sinks, &alice, raiders.id, carol.id).await?;
        clan::accept_invite(&db, &sinks, &carol, raiders.id).await?;

        let err = clan::add_member(&db, &sinks, &bob, pioneers.id, carol.id, ClanRole::Member.into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = clan::request_join(&db, &sinks, &carol, pioneers.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // Founding a clan while in one is refused too.
        let err = clan::create_clan(&db, &sinks, &carol, "Nomads", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn the_leader_cannot_leave_without_a_successor() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::invite(&db, &sinks, &alice, clan.id, bob.id).await?;
        clan::accept_invite(&db, &sinks, &bob, clan.id).await?;

        let err = clan::remove_member(&db, &sinks, &alice, clan.id, alice.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        clan::remove_member(&db, &sinks, &alice, clan.id, alice.id, Some(bob.id)).await?;

        let stored = clans::Entity::find_by_id(clan.id).one(&db).await?.unwrap();
        assert_eq!(stored.leader_id, bob.id);

        let leaders = clan_members::Entity::find()
            .filter(clan_members::Column::ClanId.eq(clan.id))
            .filter(clan_members::Column::Role.eq(u8::from(ClanRole::Leader)))
            .count(&db)
            .await?;
        assert_eq!(leaders, 1);
        assert!(clan::membership_of(&db, alice.id).await?.is_none());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn promoting_to_leader_transfers_leadership() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::invite(&db, &sinks, &alice, clan.id, bob.id).await?;
        clan::accept_invite(&db, &sinks, &bob, clan.id).await?;

        let member = clan::change_role(&db, &sinks, &alice, clan.id, bob.id, ClanRole::Leader.into())
            .await?;
        assert_eq!(member.role, u8::from(ClanRole::Leader));

        let stored = clans::Entity::find_by_id(clan.id).one(&db).await?.unwrap();
        assert_eq!(stored.leader_id, bob.id);

        let alice_member = clan::membership_of(&db, alice.id).await?.unwrap();
        assert_eq!(alice_member.role, u8::from(ClanRole::Officer));

        let leaders = clan_members::Entity::find()
            .filter(clan_members::Column::ClanId.eq(clan.id))
            .filter(clan_members::Column::Role.eq(u8::from(ClanRole::Leader)))
            .count(&db)
            .await?;
        assert_eq!(leaders, 1);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn demoting_the_sitting_leader_is_refused() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        let err = clan::change_role(&db, &sinks, &alice, clan.id, alice.id, ClanRole::Member.into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn clan_authority_is_leader_or_global() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;
        let admin = seed_user(&db, "admin", Role::Admin).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::invite(&db, &sinks, &alice, clan.id, bob.id).await?;
        clan::accept_invite(&db, &sinks, &bob, clan.id).await?;

        // A plain member cannot change roles.
        let err = clan::change_role(&db, &sinks, &bob, clan.id, bob.id, ClanRole::Officer.into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        // An admin holds the global clan-management permission, member of it or not.
        let member =
            clan::change_role(&db, &sinks, &admin, clan.id, bob.id, ClanRole::Officer.into())
                .await?;
        assert_eq!(member.role, u8::from(ClanRole::Officer));

        // Officers handle the membership intake.
        let carol = seed_user(&db, "carol", Role::User).await?;
        clan::request_join(&db, &sinks, &carol, clan.id).await?;
        clan::approve_join(&db, &sinks, &bob, clan.id, carol.id).await?;
        assert!(clan::membership_of(&db, carol.id).await?.is_some());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn deleting_a_clan_clears_memberships_and_requests() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        clan::request_join(&db, &sinks, &bob, clan.id).await?;

        clan::delete_clan(&db, &sinks, &alice, clan.id).await?;

        assert_eq!(clans::Entity::find().count(&db).await?, 0);
        assert_eq!(clan_members::Entity::find().count(&db).await?, 0);
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn members_are_listed_by_tier() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;
        let carol = seed_user(&db, "carol", Role::User).await?;

        let clan = clan::create_clan(&db, &sinks, &alice, "Raiders", None).await?;
        for user in [&bob, &carol] {
            clan::invite(&db, &sinks, &alice, clan.id, user.id).await?;
            clan::accept_invite(&db, &sinks, user, clan.id).await?;
        }
        clan::change_role(&db, &sinks, &alice, clan.id, carol.id, ClanRole::Officer.into())
            .await?;

        let members = clan::members(&db, clan.id).await?;
        let usernames: Vec<_> = members.iter().map(|(_, user)| &*user.username).collect();
        assert_eq!(usernames, ["alice", "carol", "bob"]);

        anyhow::Ok(())
    })
    .await
}
