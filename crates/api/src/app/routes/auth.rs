//! Auth gateway: login, token obtain, and refresh endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use gatehouse_auth::{TokenError, TokenPair, User, verify_password};

use crate::app::dto::{GoogleLoginRequest, LoginRequest, RefreshRequest, UserResponse};
use crate::app::errors;
use crate::app::google::GoogleVerifyError;
use crate::app::services::AppServices;
use crate::app::store::ProfileDefaults;

pub fn router() -> Router {
    Router::new()
        .route("/admin-login", post(admin_login))
        .route("/google-login", post(google_login))
        .route("/token", post(token_obtain))
        .route("/token/refresh", post(token_refresh))
}

/// POST /admin-login - email/password to a token pair plus the user payload.
pub async fn admin_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match authenticate(&services, &body.email, &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::error_body(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(response) => return response,
    };

    let pair = match mint_pair(&services, &user) {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "refresh": pair.refresh,
            "access": pair.access,
            "user": UserResponse::from(&user),
        })),
    )
        .into_response()
}

/// POST /token - standard obtain-pair shape (no user payload).
pub async fn token_obtain(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match authenticate(&services, &body.email, &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::error_body(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(response) => return response,
    };

    let pair = match mint_pair(&services, &user) {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "refresh": pair.refresh,
            "access": pair.access,
        })),
    )
        .into_response()
}

/// POST /google-login - verify an opaque provider token, provision the user on
/// first login, and issue a token pair.
///
/// Any resolved identity may log in here; there is no staff gate on this
/// endpoint. Blocked accounts are rejected after identity resolution.
pub async fn google_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<GoogleLoginRequest>,
) -> axum::response::Response {
    let Some(token) = body.token.filter(|t| !t.trim().is_empty()) else {
        return errors::message_body(StatusCode::BAD_REQUEST, "Token is required");
    };

    let profile = match services.google.verify(&token).await {
        Ok(profile) => profile,
        Err(GoogleVerifyError::Rejected) => {
            return errors::message_body(StatusCode::BAD_REQUEST, "Invalid Google token");
        }
        Err(GoogleVerifyError::Upstream(e)) => {
            tracing::warn!(error = %e, "identity provider call failed");
            return errors::error_body(StatusCode::BAD_GATEWAY, "Identity provider unavailable");
        }
    };

    let (user, created) = match services
        .users
        .get_or_create_by_email(
            &profile.email,
            ProfileDefaults {
                full_name: profile.name,
                profile_url: profile.picture,
            },
        )
        .await
    {
        Ok(resolved) => resolved,
        Err(e) => return errors::store_error_to_response(e),
    };

    if created {
        tracing::info!(user_id = %user.id, "provisioned user from google login");
    }

    if !user.is_active {
        return errors::message_body(StatusCode::FORBIDDEN, "You are blocked by admin");
    }

    let pair = match mint_pair(&services, &user) {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "refresh": pair.refresh,
            "access": pair.access,
            "user": UserResponse::from(&user),
        })),
    )
        .into_response()
}

/// POST /token/refresh - exchange a refresh credential for a new access
/// credential (and a rotated refresh credential when configured).
pub async fn token_refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RefreshRequest>,
) -> axum::response::Response {
    // Log a short prefix only; the full credential must never reach the logs.
    let prefix: String = body.refresh.chars().take(8).collect();

    match services
        .issuer
        .refresh(&body.refresh, services.rotate_refresh_tokens)
    {
        Ok(tokens) => {
            tracing::debug!(token_prefix = %prefix, "token refresh succeeded");
            let mut payload = serde_json::json!({ "access": tokens.access });
            if let Some(refresh) = tokens.refresh {
                payload["refresh"] = serde_json::Value::String(refresh);
            }
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e @ (TokenError::Expired | TokenError::Invalid(_) | TokenError::WrongTokenUse)) => {
            tracing::info!(token_prefix = %prefix, error = %e, "token refresh rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Invalid refresh token",
                    "detail": e.to_string(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(token_prefix = %prefix, error = %e, "token refresh failed");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Token refresh failed",
                    "detail": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Check email/password against the store. Every failure mode (unknown email,
/// missing hash, wrong password, inactive account) collapses to `None` so the
/// response never reveals which part was wrong.
async fn authenticate(
    services: &AppServices,
    email: &str,
    password: &str,
) -> Result<Option<User>, axum::response::Response> {
    let user = services
        .users
        .find_by_email(email)
        .await
        .map_err(errors::store_error_to_response)?;

    let Some(user) = user else {
        return Ok(None);
    };
    let Some(hash) = user.password_hash.as_deref() else {
        return Ok(None);
    };
    if !user.is_active || !verify_password(password, hash) {
        return Ok(None);
    }

    Ok(Some(user))
}

fn mint_pair(services: &AppServices, user: &User) -> Result<TokenPair, axum::response::Response> {
    services.issuer.pair_for_user(user).map_err(|e| {
        tracing::error!(error = %e, "token minting failed");
        errors::error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
    })
}
