//! Handler for amending a shared or active contract.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use accord_core::amendment::AmendmentProposal;
use accord_core::types::DbId;
use accord_db::repositories::ContractRepo;
use accord_events::{kinds, DomainEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts/{contract_id}/amendments
///
/// Apply an amendment to the contract's acts or schedule. Every
/// collaborator's confirmation is cleared and the contract returns to
/// `pending_approval`, reopening the confirmation cycle. This is the only
/// way to change the terms of an active contract.
pub async fn amend_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(proposal): Json<AmendmentProposal>,
) -> AppResult<impl IntoResponse> {
    let contract = ContractRepo::apply_amendment(
        &state.pool,
        contract_id,
        auth.user_id,
        &proposal,
        chrono::Utc::now(),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        "Contract amended; confirmations reset"
    );

    state.event_bus.publish(
        DomainEvent::new(kinds::CONTRACT_AMENDED, contract_id, auth.user_id).with_payload(
            serde_json::json!({ "reason": proposal.reason }),
        ),
    );

    Ok(Json(DataResponse { data: contract }))
}
