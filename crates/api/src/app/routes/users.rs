//! Admin directory: role-gated CRUD over the identity store.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use gatehouse_auth::{NewUser, UserId, can_delete_user, can_modify_user, hash_password};

use crate::app::dto::{CreateUserRequest, ToggleActiveRequest, UpdateUserRequest, UserResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/user-active-status", post(toggle_active_status))
}

/// GET /users - all users, newest first.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    match services.users.list().await {
        Ok(users) => {
            let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
            (StatusCode::OK, Json(users)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /users - direct creation by an administrator.
///
/// Always creates a regular user; the role flags cannot be granted through
/// this surface.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<CreateUserRequest>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    if body.email.trim().is_empty() || !body.email.contains('@') {
        return errors::error_body(StatusCode::BAD_REQUEST, "A valid email is required");
    }
    if body.password.is_empty() {
        return errors::error_body(StatusCode::BAD_REQUEST, "Password is required");
    }

    let password_hash = match hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal_error");
        }
    };

    let new = NewUser {
        email: body.email,
        full_name: body.full_name,
        profile_url: body.profile_url,
        password_hash: Some(password_hash),
        is_staff: false,
        is_superuser: false,
    };

    match services.users.create(new).await {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /users/:id - fetch one user.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    match services.users.get(UserId::new(id)).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(&user))).into_response(),
        Ok(None) => errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /users/:id - partial update.
///
/// Superuser targets require a superuser actor; `is_staff` and `is_superuser`
/// are read-only regardless of role.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    let id = UserId::new(id);
    let target = match services.users.get(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !can_modify_user(actor.flags(), &target) {
        return errors::error_body(
            StatusCode::FORBIDDEN,
            "Only superusers can modify superuser accounts",
        );
    }

    match services.users.update(id, body.into_changes()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(&user))).into_response(),
        Ok(None) => errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /users/:id - remove one user. Superusers are never deletable.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    let id = UserId::new(id);
    let target = match services.users.get(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !can_delete_user(&target) {
        return errors::error_body(StatusCode::BAD_REQUEST, "Cannot delete superuser accounts");
    }

    match services.users.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /user-active-status - flip a user's active flag.
pub async fn toggle_active_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<ToggleActiveRequest>,
) -> axum::response::Response {
    if let Err(response) = authz::require_admin(&actor) {
        return response;
    }

    let Some(user_id) = body.user_id else {
        return errors::error_body(StatusCode::BAD_REQUEST, "user_id is required");
    };

    match services.users.toggle_active(UserId::new(user_id)).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": if user.is_active {
                    "User unblocked successfully"
                } else {
                    "User blocked successfully"
                },
                "user_id": user.id.as_i64(),
                "is_active": user.is_active,
            })),
        )
            .into_response(),
        Ok(None) => errors::error_body(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
