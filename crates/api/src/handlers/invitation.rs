//! Handler for accepting contract invitations.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use accord_db::models::invitation::AcceptInvitation;
use accord_db::repositories::InvitationRepo;
use accord_events::{kinds, DomainEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/invitations/accept
///
/// Redeem a single-use invitation code, binding the acting user into the
/// contract's collaborator registry as a recipient.
pub async fn accept_invitation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AcceptInvitation>,
) -> AppResult<impl IntoResponse> {
    let (invitation, collaborator) =
        InvitationRepo::accept(&state.pool, &input.code, auth.user_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = invitation.contract_id,
        invitation_id = invitation.id,
        "Invitation accepted"
    );

    state.event_bus.publish(DomainEvent::new(
        kinds::INVITATION_ACCEPTED,
        invitation.contract_id,
        auth.user_id,
    ));

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "invitation": invitation,
            "collaborator": collaborator,
        }),
    }))
}
