use std::fmt;

/// The role of a user account.
///
/// Roles are coarse-grained: the fine-grained capabilities they grant are resolved by
/// the permission model of the core library.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// A regular member of the website.
    User = 0,
    /// A member trusted to author compendium entries.
    Contributor = 1,
    /// A member of the moderation team.
    Moderator = 2,
    /// A site administrator.
    Admin = 3,
}

/// The provided role discriminant is not a known role.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown role with id `{0}`")]
pub struct UnknownRole(pub u8);

impl Role {
    /// Every role, in ascending order of authority.
    pub const ALL: [Role; 4] = [Role::User, Role::Contributor, Role::Moderator, Role::Admin];

    /// The name of the role, as displayed on the website.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Contributor => "contributor",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = UnknownRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::User),
            1 => Ok(Role::Contributor),
            2 => Ok(Role::Moderator),
            3 => Ok(Role::Admin),
            other => Err(UnknownRole(other)),
        }
    }
}

impl From<Role> for u8 {
    fn from(value: Role) -> Self {
        value as u8
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::try_from(u8::from(role)), Ok(role));
        }
    }

    #[test]
    fn unknown_discriminant() {
        assert_eq!(Role::try_from(42), Err(UnknownRole(42)));
    }
}
