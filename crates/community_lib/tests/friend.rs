use community_lib::error::ErrorKind;
use community_lib::friend::{self, FriendshipState};
use community_lib::relationship::RequestOutcome;
use entity::relationships;
use entity::types::{RelationshipStatus, Role};
use sea_orm::{EntityTrait, PaginatorTrait};
use test_env::{recording_sinks, seed_user, wrap};

#[tokio::test]
async fn request_then_accept_then_remove() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, recorder) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let outcome = friend::request(&db, &sinks, &alice, bob.id).await?;
        assert!(matches!(outcome, RequestOutcome::Sent(_)));
        assert_eq!(
            friend::state(&db, alice.id, bob.id).await?,
            FriendshipState::RequestSent
        );
        assert_eq!(
            friend::state(&db, bob.id, alice.id).await?,
            FriendshipState::RequestReceived
        );

        friend::accept(&db, &sinks, &bob, alice.id).await?;
        assert_eq!(
            friend::state(&db, alice.id, bob.id).await?,
            FriendshipState::Friends
        );
        assert_eq!(
            friend::state(&db, bob.id, alice.id).await?,
            FriendshipState::Friends
        );
        assert_eq!(friend::friends_of(&db, alice.id).await?, vec![bob.id]);

        let kinds: Vec<_> = recorder
            .notifications()
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, ["friend_request", "friend_accept"]);

        friend::remove(&db, &alice, bob.id).await?;
        assert_eq!(
            friend::state(&db, alice.id, bob.id).await?,
            FriendshipState::NotFriends
        );
        assert_eq!(
            friend::state(&db, bob.id, alice.id).await?,
            FriendshipState::NotFriends
        );

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn resending_a_request_is_idempotent() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let first = friend::request(&db, &sinks, &alice, bob.id).await?;
        let second = friend::request(&db, &sinks, &alice, bob.id).await?;
        assert!(matches!(first, RequestOutcome::Sent(_)));
        assert!(matches!(second, RequestOutcome::AlreadyPending(_)));

        assert_eq!(relationships::Entity::find().count(&db).await?, 1);

        friend::accept(&db, &sinks, &bob, alice.id).await?;
        let third = friend::request(&db, &sinks, &alice, bob.id).await?;
        assert!(matches!(third, RequestOutcome::AlreadyAccepted(_)));
        assert_eq!(relationships::Entity::find().count(&db).await?, 1);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn symmetric_requests_collapse_into_acceptance() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        friend::request(&db, &sinks, &bob, alice.id).await?;
        let outcome = friend::request(&db, &sinks, &alice, bob.id).await?;
        assert!(matches!(outcome, RequestOutcome::AutoAccepted(_)));

        // One accepted row, no leftover pending one.
        let rows = relationships::Entity::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, u8::from(RelationshipStatus::Accepted));

        assert_eq!(
            friend::state(&db, alice.id, bob.id).await?,
            FriendshipState::Friends
        );
        assert_eq!(
            friend::state(&db, bob.id, alice.id).await?,
            FriendshipState::Friends
        );

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn reject_and_cancel_remove_the_request() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        friend::request(&db, &sinks, &alice, bob.id).await?;
        friend::reject(&db, &bob, alice.id).await?;
        assert_eq!(
            friend::state(&db, alice.id, bob.id).await?,
            FriendshipState::NotFriends
        );

        // A rejected request does not block a new one.
        let outcome = friend::request(&db, &sinks, &alice, bob.id).await?;
        assert!(matches!(outcome, RequestOutcome::Sent(_)));

        friend::cancel(&db, &alice, bob.id).await?;
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn resolving_a_missing_request_is_not_found() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;
        let bob = seed_user(&db, "bob", Role::User).await?;

        let err = friend::accept(&db, &sinks, &bob, alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = friend::cancel(&db, &alice, bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = friend::remove(&db, &alice, bob.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn self_requests_are_rejected_up_front() -> anyhow::Result<()> {
    wrap(async |db| {
        let (sinks, _) = recording_sinks();
        let alice = seed_user(&db, "alice", Role::User).await?;

        let err = friend::request(&db, &sinks, &alice, alice.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(relationships::Entity::find().count(&db).await?, 0);

        anyhow::Ok(())
    })
    .await
}
