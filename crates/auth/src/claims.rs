//! JWT claims model.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::user::User;

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Claims carried by every Gatehouse token.
///
/// The identity claims (`email`, `is_staff`, `is_superuser`) are a snapshot
/// taken at mint time; they do not track later changes to the user record
/// until the token is reissued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: i64,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub token_use: TokenUse,
    /// Unique token id.
    pub jti: Uuid,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl TokenClaims {
    pub(crate) fn for_user(user: &User, token_use: TokenUse, iat: i64, exp: i64) -> Self {
        Self {
            sub: user.id.as_i64(),
            email: user.email.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            token_use,
            jti: Uuid::now_v7(),
            iat,
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("{0}")]
    Invalid(String),

    #[error("wrong token type for this operation")]
    WrongTokenUse,

    #[error("failed to encode token: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_use_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(TokenUse::Access).unwrap(),
            serde_json::json!("access")
        );
        assert_eq!(
            serde_json::to_value(TokenUse::Refresh).unwrap(),
            serde_json::json!("refresh")
        );
    }
}
