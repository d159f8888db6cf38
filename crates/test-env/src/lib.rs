use std::panic;
use std::sync::Arc;

use anyhow::Context as _;
use entity::types::Role;
use entity::users;
use futures::FutureExt as _;
use migration::MigratorTrait as _;
use mkenv::{error::ConfigInitError, prelude::*};
use notifier::Sinks;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectOptions, DbConn, EntityTrait};
use tracing_subscriber::fmt::TestWriter;

pub trait IntoResult {
    type Out;

    fn into_result(self) -> anyhow::Result<Self::Out>;
}

impl IntoResult for () {
    type Out = ();

    fn into_result(self) -> anyhow::Result<Self::Out> {
        Ok(())
    }
}

impl<T, E> IntoResult for Result<T, E>
where
    anyhow::Error: From<E>,
{
    type Out = T;

    fn into_result(self) -> anyhow::Result<Self::Out> {
        self.map_err(From::from)
    }
}

pub fn init_env() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => return Err(err).context("cannot retrieve .env files"),
        _ => (),
    }

    let _ = tracing_subscriber::fmt()
        .with_writer(TestWriter::new())
        .try_init();

    fn map_err(err: ConfigInitError<'_>) -> anyhow::Error {
        anyhow::anyhow!("{err}")
    }

    let lib_env = community_lib::LibEnv::define();
    lib_env.try_init().map_err(map_err)?;
    community_lib::init_env(lib_env);

    Ok(())
}

/// Runs the provided test against a fresh in-memory database with the schema applied.
pub async fn wrap<F, R>(test: F) -> anyhow::Result<<R as IntoResult>::Out>
where
    F: AsyncFnOnce(DbConn) -> R,
    R: IntoResult,
{
    init_env()?;

    // A single connection, so every statement of the test sees the same in-memory
    // database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = sea_orm::Database::connect(options).await?;

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Created in-memory test database");

    let r = panic::AssertUnwindSafe(test(db)).catch_unwind().await;
    match r {
        Ok(r) => r.into_result(),
        Err(e) => panic::resume_unwind(e),
    }
}

/// Inserts a user with the provided role.
pub async fn seed_user(conn: &DbConn, username: &str, role: Role) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        username: Set(username.to_owned()),
        email: Set(format!("{username}@example.org")),
        role: Set(role.into()),
        join_date: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let id = users::Entity::insert(user).exec(conn).await?.last_insert_id;
    let user = users::Entity::find_by_id(id)
        .one(conn)
        .await?
        .unwrap_or_else(|| panic!("User should exist in database"));
    Ok(user)
}

/// Returns sinks recording everything they receive, with the recorder to inspect them.
pub fn recording_sinks() -> (Sinks, Arc<notifier::Memory>) {
    Sinks::recording()
}
