//! A module containing the [`CommunityError`] struct, which contains various basic error types.

use entity::types::{
    RelationshipKind, UnknownClanRole, UnknownModerationKind, UnknownModerationStatus,
    UnknownRelationshipKind, UnknownRelationshipStatus, UnknownRole,
};
use sea_orm::TransactionError;

use crate::perms::Permission;

/// Represents any type of error that could happen when using this crate.
#[derive(thiserror::Error, Debug)]
#[rustfmt::skip]
pub enum CommunityError {
    // --------
    // --- Internal errors
    // --------

    /// An error that happened when interacting with the database.
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
    /// An internal error.
    #[error("internal error: {0}")]
    Internal(String),

    // --------
    // --- Permission errors
    // --------

    /// The caller lacks the permission required by the operation.
    #[error("missing the `{0}` permission")]
    MissingPermission(Permission),
    /// The operation is reserved to the clan leader.
    #[error("this action is reserved to the clan leader")]
    NotClanLeader,
    /// The operation is reserved to the clan officers.
    #[error("this action is reserved to the clan officers")]
    NotClanOfficer,

    // --------
    // --- Not-found errors
    // --------

    /// The user with the provided ID was not found.
    #[error("user with id `{0}` not found")]
    UserNotFound(u32),
    /// The user with the provided username was not found.
    #[error("user `{0}` not found")]
    UsernameNotFound(String),
    /// The clan with the provided ID was not found.
    #[error("clan with id `{0}` not found")]
    ClanNotFound(u32),
    /// The user is not a member of the clan.
    #[error("user `{0}` is not a member of clan `{1}`")]
    NotAClanMember(u32, u32),
    /// No relationship request matches the operation.
    #[error("no matching {0} request")]
    RelationshipNotFound(RelationshipKind),
    /// The moderation item was not found, or the caller may not see it.
    #[error("moderation item `{0}` not found")]
    ModerationItemNotFound(u32),

    // --------
    // --- Conflict errors
    // --------

    /// The username is already taken.
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    /// The clan name is already taken.
    #[error("clan name `{0}` is already taken")]
    ClanNameTaken(String),
    /// The user already belongs to a clan.
    #[error("user `{0}` already belongs to a clan")]
    AlreadyInClan(u32),
    /// The clan reached its configured member cap.
    #[error("clan `{0}` is full")]
    ClanFull(u32),

    // --------
    // --- Invalid-state errors
    // --------

    /// The moderation item has already been approved or rejected.
    #[error("moderation item `{0}` has already been resolved")]
    AlreadyResolved(u32),
    /// The operation would leave the clan without its single leader.
    #[error("a clan must keep exactly one leader")]
    LeaderRequired,

    // --------
    // --- Validation errors
    // --------

    /// The provided role is unknown.
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
    /// The provided clan role is unknown.
    #[error(transparent)]
    UnknownClanRole(#[from] UnknownClanRole),
    /// A user may not be in a relationship with themselves.
    #[error("requester and target must be distinct")]
    SelfRelationship,
    /// The clan name is empty or too long.
    #[error("invalid clan name: {0}")]
    InvalidClanName(String),
}

/// The broad category of a [`CommunityError`].
///
/// The transport layer maps each kind to a response status; the tests assert on it
/// rather than on specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks the permission, role or ownership required by the operation.
    PermissionDenied,
    /// Something referenced by the operation does not exist, or is hidden from the
    /// caller.
    NotFound,
    /// A uniqueness or cardinality invariant would be violated.
    Conflict,
    /// The operation is structurally disallowed in the current state.
    InvalidState,
    /// The input is malformed; nothing was mutated.
    Validation,
    /// A database or other internal failure.
    Internal,
}

impl CommunityError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        use CommunityError as E;

        match self {
            E::Db(_) | E::Internal(_) => ErrorKind::Internal,

            E::MissingPermission(_) | E::NotClanLeader | E::NotClanOfficer => {
                ErrorKind::PermissionDenied
            }

            E::UserNotFound(_)
            | E::UsernameNotFound(_)
            | E::ClanNotFound(_)
            | E::NotAClanMember(..)
            | E::RelationshipNotFound(_)
            | E::ModerationItemNotFound(_) => ErrorKind::NotFound,

            E::UsernameTaken(_) | E::ClanNameTaken(_) | E::AlreadyInClan(_) | E::ClanFull(_) => {
                ErrorKind::Conflict
            }

            E::AlreadyResolved(_) | E::LeaderRequired => ErrorKind::InvalidState,

            E::UnknownRole(_)
            | E::UnknownClanRole(_)
            | E::SelfRelationship
            | E::InvalidClanName(_) => ErrorKind::Validation,
        }
    }
}

impl AsRef<CommunityError> for CommunityError {
    fn as_ref(&self) -> &CommunityError {
        self
    }
}

/// Shortcut for creating an internal error, by formatting a message.
///
/// See [`CommunityError::Internal`].
#[macro_export]
macro_rules! internal {
    ($($t:tt)*) => {{
        $crate::error::CommunityError::Internal($crate::error::__private::format!($($t)*))
    }};
}

#[doc(hidden)]
pub mod __private {
    pub use std::format;
}

// Unknown discriminants read back from the database are data corruption, not caller
// mistakes.
impl From<UnknownRelationshipKind> for CommunityError {
    fn from(value: UnknownRelationshipKind) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<UnknownRelationshipStatus> for CommunityError {
    fn from(value: UnknownRelationshipStatus) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<UnknownModerationKind> for CommunityError {
    fn from(value: UnknownModerationKind) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<UnknownModerationStatus> for CommunityError {
    fn from(value: UnknownModerationStatus) -> Self {
        Self::Internal(value.to_string())
    }
}

impl<E> From<TransactionError<E>> for CommunityError
where
    CommunityError: From<E>,
{
    fn from(value: TransactionError<E>) -> Self {
        match value {
            TransactionError::Connection(db_err) => From::from(db_err),
            TransactionError::Transaction(e) => From::from(e),
        }
    }
}

/// Represents the result of a computation that could return a [`CommunityError`].
pub type CommunityResult<T = ()> = Result<T, CommunityError>;
