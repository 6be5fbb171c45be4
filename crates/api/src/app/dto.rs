//! Request/response DTOs and JSON mapping.

use serde::{Deserialize, Serialize};

use gatehouse_auth::{User, UserChanges};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub profile_url: String,
}

/// Partial update. The role flags are not representable here; unknown fields
/// in the request body are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub profile_url: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            email: self.email,
            full_name: self.full_name,
            profile_url: self.profile_url,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleActiveRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub profile_url: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            profile_url: user.profile_url.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
        }
    }
}
