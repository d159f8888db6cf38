//! The role/permission model of the website.
//!
//! Every mutating operation of this crate routes through [`require`] (or
//! [`has_permission`] for read-side filtering) instead of re-deriving role logic
//! locally. Changing what a role may do is a single edit to [`RoleMatrix::builtin`].

use std::fmt;

use entity::types::Role;
use entity::users;

use crate::error::{CommunityError, CommunityResult};

/// An atomic capability of the website.
///
/// The set is closed: permissions are the vocabulary of this module, they are never
/// persisted nor granted dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Change user accounts (roles, staff notes).
    ManageUsers,
    /// Administrate any clan, member of it or not.
    ManageClans,
    /// Found a new clan.
    CreateClans,
    /// Send friend requests to other users.
    SendFriendRequests,
    /// Submit a new compendium entry for review.
    NewCompendium,
    /// Edit published compendium entries directly.
    EditCompendium,
    /// Approve or reject pending compendium entries.
    ApproveCompendium,
    /// Suggest an edit to a wiki page.
    SuggestWikiEdits,
    /// Approve or reject suggested wiki edits.
    ApproveWikiEdits,
    /// Submit an update request for a map.
    SubmitMapUpdates,
    /// Review map update requests.
    ReviewMapUpdates,
}

impl Permission {
    /// Every permission known to the website.
    pub const UNIVERSE: [Permission; 11] = [
        Permission::ManageUsers,
        Permission::ManageClans,
        Permission::CreateClans,
        Permission::SendFriendRequests,
        Permission::NewCompendium,
        Permission::EditCompendium,
        Permission::ApproveCompendium,
        Permission::SuggestWikiEdits,
        Permission::ApproveWikiEdits,
        Permission::SubmitMapUpdates,
        Permission::ReviewMapUpdates,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// The name of the permission, as reported in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManageClans => "manage_clans",
            Permission::CreateClans => "create_clans",
            Permission::SendFriendRequests => "send_friend_requests",
            Permission::NewCompendium => "new_compendium",
            Permission::EditCompendium => "edit_compendium",
            Permission::ApproveCompendium => "approve_compendium",
            Permission::SuggestWikiEdits => "suggest_wiki_edits",
            Permission::ApproveWikiEdits => "approve_wiki_edits",
            Permission::SubmitMapUpdates => "submit_map_updates",
            Permission::ReviewMapUpdates => "review_map_updates",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable set of [`Permission`]s, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet(u16);

impl PermissionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set containing every permission of [`Permission::UNIVERSE`].
    pub const ALL: Self = Self((1 << Permission::UNIVERSE.len() as u16) - 1);

    /// Returns the set with `permission` added.
    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bit())
    }

    /// Returns whether the set contains `permission`.
    pub const fn contains(self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// Returns the permissions of the set, in universe order.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::UNIVERSE
            .into_iter()
            .filter(move |p| self.contains(*p))
    }

    /// Returns the number of permissions in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// The total role → permission map.
///
/// Constructed once, immutable afterwards: there is no runtime grant path, so no
/// synchronization either.
#[derive(Debug, Clone, Copy)]
pub struct RoleMatrix {
    grants: [PermissionSet; 4],
}

impl RoleMatrix {
    /// The matrix the website runs with.
    pub const fn builtin() -> Self {
        const USER: PermissionSet = PermissionSet::EMPTY
            .with(Permission::SendFriendRequests)
            .with(Permission::CreateClans)
            .with(Permission::SuggestWikiEdits)
            .with(Permission::SubmitMapUpdates);
        const CONTRIBUTOR: PermissionSet = USER.with(Permission::NewCompendium);
        const MODERATOR: PermissionSet = CONTRIBUTOR
            .with(Permission::EditCompendium)
            .with(Permission::ApproveCompendium)
            .with(Permission::ApproveWikiEdits)
            .with(Permission::ReviewMapUpdates);

        Self {
            grants: [USER, CONTRIBUTOR, MODERATOR, PermissionSet::ALL],
        }
    }

    /// Returns the permission set granted to `role`.
    ///
    /// Admins resolve to the full universe by construction: a permission added to
    /// [`Permission`] is granted to them without touching the matrix.
    pub const fn grants(&self, role: Role) -> PermissionSet {
        match role {
            Role::Admin => PermissionSet::ALL,
            _ => self.grants[role as usize],
        }
    }
}

static MATRIX: RoleMatrix = RoleMatrix::builtin();

/// Returns whether `user` holds `permission`.
///
/// Fails closed: an absent user, or a user whose stored role byte is not a known
/// [`Role`], holds nothing.
pub fn has_permission(user: Option<&users::Model>, permission: Permission) -> bool {
    let Some(user) = user else {
        return false;
    };
    let Ok(role) = Role::try_from(user.role) else {
        return false;
    };
    MATRIX.grants(role).contains(permission)
}

/// Returns the full permission set resolved for `user`.
///
/// Used for authorization previews on the website, never for granting.
pub fn user_permissions(user: &users::Model) -> PermissionSet {
    match Role::try_from(user.role) {
        Ok(role) => MATRIX.grants(role),
        Err(_) => PermissionSet::EMPTY,
    }
}

/// Ensures `user` holds `permission`.
pub fn require(user: &users::Model, permission: Permission) -> CommunityResult<()> {
    if has_permission(Some(user), permission) {
        Ok(())
    } else {
        Err(CommunityError::MissingPermission(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> users::Model {
        users::Model {
            id: 1,
            username: "ahmad".to_owned(),
            email: "ahmad@example.org".to_owned(),
            role: role.into(),
            join_date: chrono::Utc::now().naive_utc(),
            admins_note: None,
        }
    }

    #[test]
    fn admin_holds_the_full_universe() {
        let admin = user(Role::Admin);
        for permission in Permission::UNIVERSE {
            assert!(has_permission(Some(&admin), permission));
        }
        assert_eq!(user_permissions(&admin), PermissionSet::ALL);
        assert_eq!(user_permissions(&admin).len(), Permission::UNIVERSE.len());
    }

    #[test]
    fn non_admin_roles_match_the_matrix() {
        for role in [Role::User, Role::Contributor, Role::Moderator] {
            let u = user(role);
            let granted = RoleMatrix::builtin().grants(role);
            for permission in Permission::UNIVERSE {
                assert_eq!(
                    has_permission(Some(&u), permission),
                    granted.contains(permission),
                    "{role}/{permission}"
                );
            }
        }
    }

    #[test]
    fn every_role_grants_something() {
        for role in Role::ALL {
            assert!(!RoleMatrix::builtin().grants(role).is_empty(), "{role}");
        }
    }

    #[test]
    fn fails_closed() {
        assert!(!has_permission(None, Permission::ManageUsers));

        let mut bogus = user(Role::Admin);
        bogus.role = 42;
        assert!(!has_permission(Some(&bogus), Permission::ManageUsers));
        assert!(user_permissions(&bogus).is_empty());
    }

    #[test]
    fn contributor_submits_but_does_not_approve() {
        let contributor = user(Role::Contributor);
        assert!(has_permission(Some(&contributor), Permission::NewCompendium));
        assert!(!has_permission(
            Some(&contributor),
            Permission::ApproveCompendium
        ));
    }

    #[test]
    fn require_reports_the_missing_permission() {
        let u = user(Role::User);
        let err = require(&u, Permission::ManageUsers).unwrap_err();
        assert!(
            matches!(err, CommunityError::MissingPermission(Permission::ManageUsers))
        );
    }
}
