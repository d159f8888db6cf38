//! The identity boundary of the core.
//!
//! Session management — token issuance, cookie handling, credential verification —
//! lives in the transport layer. What reaches this crate is an already-verified
//! [`Claim`], resolved here to the stored account before any permission check.

use entity::users;
use sea_orm::ConnectionTrait;

use crate::error::CommunityResult;
use crate::must;

/// The verified identity of a caller, as produced by the session layer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claim {
    /// The user ID.
    pub id: u32,
    /// The username at the time the session was opened.
    pub username: String,
    /// The role byte at the time the session was opened.
    pub role: u8,
}

impl From<&users::Model> for Claim {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Resolves a claim to the stored account.
///
/// The database is authoritative for the role: a session opened before a role change
/// carries the old byte, which is ignored.
pub async fn authenticated_user<C: ConnectionTrait>(
    conn: &C,
    claim: &Claim,
) -> CommunityResult<users::Model> {
    let user = must::have_user(conn, claim.id).await?;

    if user.role != claim.role {
        tracing::debug!(
            "stale role in session claim for user {}: claim has {}, database has {}",
            user.id,
            claim.role,
            user.role
        );
    }

    Ok(user)
}
