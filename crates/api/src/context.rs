//! Request-scoped actor identity.

use gatehouse_auth::{ActorFlags, TokenClaims, UserId};

/// Authenticated actor for a request, taken from the access-token claims.
///
/// This is a mint-time snapshot: the role flags here may lag the user record
/// until the actor's token is reissued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    email: String,
    is_staff: bool,
    is_superuser: bool,
}

impl ActorContext {
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            user_id: UserId::new(claims.sub),
            email: claims.email.clone(),
            is_staff: claims.is_staff,
            is_superuser: claims.is_superuser,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn flags(&self) -> ActorFlags {
        ActorFlags {
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }
}
