//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: store/verifier/issuer wiring behind `AppServices`
//! - `routes/`: HTTP routes + handlers (one file per surface)
//! - `dto.rs`: request/response DTOs and JSON mapping
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod google;
pub mod routes;
pub mod services;
pub mod store;
#[cfg(feature = "postgres")]
pub mod store_pg;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        issuer: services.issuer.clone(),
    };

    // Admin directory: requires a valid access token; the staff gate is
    // enforced per-handler.
    let admin = routes::users::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::auth::router())
        .merge(admin)
        .layer(Extension(services))
}
