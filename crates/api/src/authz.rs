//! Role gates checked at the handler boundary.
//!
//! The authorization model is two boolean flags carried in the token claims:
//! `is_staff` opens the admin directory, `is_superuser` additionally allows
//! mutating other superusers (checked per-handler against the target record).

use axum::http::StatusCode;

use crate::app::errors;
use crate::context::ActorContext;

/// Admin directory gate.
///
/// Intended to be called at the top of every admin handler, before any store
/// access.
pub fn require_admin(actor: &ActorContext) -> Result<(), axum::response::Response> {
    if actor.is_staff() || actor.is_superuser() {
        Ok(())
    } else {
        Err(errors::error_body(
            StatusCode::FORBIDDEN,
            "Admin access required",
        ))
    }
}
