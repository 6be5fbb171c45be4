//! Token issuance and the refresh exchange.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenError, TokenUse};
use crate::user::User;

/// An access/refresh credential pair minted for one identity.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Result of a refresh exchange.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access: String,
    /// Present only when rotation is enabled.
    pub refresh: Option<String>,
}

/// Stateless HS256 token mint.
///
/// There is no server-side token record; invalidation is purely TTL expiry.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mint a fresh access/refresh pair for an already-authenticated user.
    ///
    /// Both tokens carry the same identity claims, read from the user at this
    /// moment. No authentication happens here; callers reject bad credentials
    /// before invoking the issuer.
    pub fn pair_for_user(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access = TokenClaims::for_user(
            user,
            TokenUse::Access,
            now,
            now + self.access_ttl.num_seconds(),
        );
        let refresh = TokenClaims::for_user(
            user,
            TokenUse::Refresh,
            now,
            now + self.refresh_ttl.num_seconds(),
        );

        Ok(TokenPair {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
        })
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_use != TokenUse::Access {
            return Err(TokenError::WrongTokenUse);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new access token (and, when `rotate` is
    /// set, a replacement refresh token).
    ///
    /// Identity claims are carried over from the refresh token unchanged; they
    /// stay a snapshot of the user as it was when the pair was first minted.
    pub fn refresh(&self, refresh_token: &str, rotate: bool) -> Result<RefreshedTokens, TokenError> {
        let claims = self.decode(refresh_token)?;
        if claims.token_use != TokenUse::Refresh {
            return Err(TokenError::WrongTokenUse);
        }

        let now = Utc::now().timestamp();
        let access = TokenClaims {
            token_use: TokenUse::Access,
            jti: Uuid::now_v7(),
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
            ..claims.clone()
        };
        let access = self.encode(&access)?;

        let refresh = if rotate {
            let next = TokenClaims {
                token_use: TokenUse::Refresh,
                jti: Uuid::now_v7(),
                iat: now,
                exp: now + self.refresh_ttl.num_seconds(),
                ..claims
            };
            Some(self.encode(&next)?)
        } else {
            None
        };

        Ok(RefreshedTokens { access, refresh })
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::Invalid("signature mismatch".to_string()),
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    TokenError::Invalid("malformed token".to_string())
                }
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserId;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::minutes(15), Duration::days(7))
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(7),
            email: "ada@example.com".to_string(),
            full_name: "Ada".to_string(),
            profile_url: String::new(),
            password_hash: None,
            is_staff: true,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn pair_embeds_snapshot_claims() {
        let issuer = issuer();
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        let claims = issuer.verify_access(&pair.access).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.is_staff);
        assert!(!claims.is_superuser);
        assert_eq!(claims.token_use, TokenUse::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let issuer = issuer();
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.refresh),
            Err(TokenError::WrongTokenUse)
        ));
    }

    #[test]
    fn access_token_cannot_be_refreshed() {
        let issuer = issuer();
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        assert!(matches!(
            issuer.refresh(&pair.access, false),
            Err(TokenError::WrongTokenUse)
        ));
    }

    #[test]
    fn expired_access_token_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::seconds(-60), Duration::days(7));
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn foreign_signature_rejected() {
        let issuer = issuer();
        let other = TokenIssuer::new(b"other-secret", Duration::minutes(15), Duration::days(7));
        let pair = other.pair_for_user(&sample_user()).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(matches!(
            issuer().verify_access("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn refresh_preserves_identity_claims() {
        let issuer = issuer();
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        let refreshed = issuer.refresh(&pair.refresh, false).unwrap();
        assert!(refreshed.refresh.is_none());

        let claims = issuer.verify_access(&refreshed.access).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.is_staff);
    }

    #[test]
    fn rotation_mints_a_usable_refresh_token() {
        let issuer = issuer();
        let pair = issuer.pair_for_user(&sample_user()).unwrap();

        let refreshed = issuer.refresh(&pair.refresh, true).unwrap();
        let rotated = refreshed.refresh.expect("rotation enabled");

        // The rotated credential goes through the exchange again.
        let again = issuer.refresh(&rotated, false).unwrap();
        let claims = issuer.verify_access(&again.access).unwrap();
        assert_eq!(claims.email, "ada@example.com");
    }
}
