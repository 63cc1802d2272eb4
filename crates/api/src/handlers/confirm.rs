//! Handler for the server side of the confirmation gate.
//!
//! The client runs the 3-second hold locally (`accord_core::confirm`) and
//! calls this endpoint only after the hold completes. The server does not
//! re-time the hold; it records the confirmation and activates the contract
//! once every party has confirmed.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use accord_core::types::DbId;
use accord_db::repositories::CollaboratorRepo;
use accord_events::{kinds, DomainEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts/{contract_id}/confirm
///
/// Record the acting collaborator's confirmation. Idempotent: a repeat
/// confirm returns the original timestamp. The confirmation that completes
/// the set activates the contract in the same transaction.
pub async fn confirm_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = CollaboratorRepo::confirm(&state.pool, contract_id, auth.user_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        all_parties_confirmed = outcome.all_parties_confirmed,
        "Collaborator confirmed contract"
    );

    state.event_bus.publish(DomainEvent::new(
        kinds::COLLABORATOR_CONFIRMED,
        contract_id,
        auth.user_id,
    ));

    if outcome.newly_activated {
        state.event_bus.publish(DomainEvent::new(
            kinds::CONTRACT_ACTIVATED,
            contract_id,
            auth.user_id,
        ));
    }

    Ok(Json(DataResponse { data: outcome }))
}
