//! User entity and role-gate policy.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a user (store-assigned, immutable).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl FromStr for UserId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A registered identity.
///
/// # Invariants
/// - `email` is unique across all users (enforced by the store).
/// - `id` and `date_joined` never change after creation.
/// - Superuser records are only mutable by superusers, and never deletable
///   through the admin directory (enforced at the gateway via the policy
///   functions below).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub profile_url: String,
    /// Argon2 PHC string. `None` for identities provisioned by an external
    /// provider; such users cannot password-authenticate.
    pub password_hash: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub profile_url: String,
    pub password_hash: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial update applied through the admin directory.
///
/// The role flags are deliberately not representable here: they cannot be set
/// through the directory regardless of the caller's privileges.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub profile_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Role flags of the acting identity, as captured in its token claims.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorFlags {
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// A superuser record may only be modified by another superuser.
pub fn can_modify_user(actor: ActorFlags, target: &User) -> bool {
    !target.is_superuser || actor.is_superuser
}

/// Superuser records can never be deleted through the admin directory.
pub fn can_delete_user(target: &User) -> bool {
    !target.is_superuser
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_superuser: bool) -> User {
        User {
            id: UserId::new(1),
            email: "alice@example.com".to_string(),
            full_name: "Alice".to_string(),
            profile_url: String::new(),
            password_hash: None,
            is_staff: true,
            is_superuser,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn staff_can_modify_regular_users() {
        let actor = ActorFlags {
            is_staff: true,
            is_superuser: false,
        };
        assert!(can_modify_user(actor, &user(false)));
    }

    #[test]
    fn only_superusers_modify_superusers() {
        let staff = ActorFlags {
            is_staff: true,
            is_superuser: false,
        };
        let superuser = ActorFlags {
            is_staff: true,
            is_superuser: true,
        };

        assert!(!can_modify_user(staff, &user(true)));
        assert!(can_modify_user(superuser, &user(true)));
    }

    #[test]
    fn superusers_are_never_deletable() {
        assert!(!can_delete_user(&user(true)));
        assert!(can_delete_user(&user(false)));
    }

    #[test]
    fn user_id_parses_from_path_segment() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId::new(42));
        assert!("abc".parse::<UserId>().is_err());
    }
}
