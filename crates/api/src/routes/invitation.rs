//! Route definitions for invitations.

use axum::routing::post;
use axum::Router;

use crate::handlers::invitation;
use crate::state::AppState;

/// Invitation routes, nested under `/invitations`.
///
/// ```text
/// POST   /accept                    accept_invitation
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/accept", post(invitation::accept_invitation))
}
