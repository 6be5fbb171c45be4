//! `gatehouse-auth` — pure authentication domain.
//!
//! This crate is intentionally decoupled from HTTP and storage: it owns the
//! user entity with its role-gate policy, the JWT claims model, the stateless
//! token issuer, and password hashing.

pub mod claims;
pub mod issuer;
pub mod password;
pub mod user;

pub use claims::{TokenClaims, TokenError, TokenUse};
pub use issuer::{RefreshedTokens, TokenIssuer, TokenPair};
pub use password::{PasswordError, hash_password, verify_password};
pub use user::{ActorFlags, NewUser, User, UserChanges, UserId, can_delete_user, can_modify_user};
