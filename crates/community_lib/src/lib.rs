//! The core crate of the community website infrastructure.
//!
//! It contains the role/permission model of the website and the state machines gated by
//! it: friend requests, clan membership, and the review pipeline of user-submitted
//! content (compendium entries, wiki edits, map update requests).
//!
//! The crate exposes no transport: route handlers resolve the caller through
//! [`auth`], then call into [`friend`], [`clan`], [`moderation`] or [`user`] with a
//! database connection and the side-effect [`Sinks`](notifier::Sinks). Every mutating
//! operation checks the caller through [`perms`] before touching any state, and every
//! multi-step mutation runs inside [`transaction::within`].

#![warn(missing_docs)]

mod env;
mod sink;

pub mod auth;
pub mod clan;
pub mod error;
pub mod friend;
pub mod moderation;
pub mod must;
pub mod perms;
pub mod relationship;
pub mod transaction;
pub mod user;

pub use env::*;
pub use error::{CommunityError, CommunityResult, ErrorKind};
