//! Handlers for the per-collaborator review cycle: review, approve, reject.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use accord_core::types::DbId;
use accord_db::models::collaborator::RejectRequest;
use accord_db::repositories::CollaboratorRepo;
use accord_events::{kinds, DomainEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts/{contract_id}/review
///
/// Record that the acting collaborator opened the contract for review.
/// Their own row moves `pending → reviewing`; the contract status is
/// untouched.
pub async fn review_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let collaborator = CollaboratorRepo::review(&state.pool, contract_id, auth.user_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        "Collaborator reviewing contract"
    );

    state.event_bus.publish(DomainEvent::new(
        kinds::COLLABORATOR_REVIEWING,
        contract_id,
        auth.user_id,
    ));

    Ok(Json(DataResponse { data: collaborator }))
}

/// POST /api/v1/contracts/{contract_id}/approve
///
/// Approve the terms on the acting collaborator's own row. Approval never
/// activates the contract; activation is gated on every party confirming.
pub async fn approve_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let collaborator = CollaboratorRepo::approve(&state.pool, contract_id, auth.user_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        "Collaborator approved contract"
    );

    state.event_bus.publish(DomainEvent::new(
        kinds::COLLABORATOR_APPROVED,
        contract_id,
        auth.user_id,
    ));

    Ok(Json(DataResponse { data: collaborator }))
}

/// POST /api/v1/contracts/{contract_id}/reject
///
/// Reject the contract with a mandatory reason. The first rejection moves
/// the whole contract to its terminal `rejected` status.
pub async fn reject_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<impl IntoResponse> {
    let collaborator =
        CollaboratorRepo::reject(&state.pool, contract_id, auth.user_id, &input.reason).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        "Collaborator rejected contract"
    );

    state.event_bus.publish(
        DomainEvent::new(kinds::CONTRACT_REJECTED, contract_id, auth.user_id)
            .with_payload(serde_json::json!({ "reason": input.reason })),
    );

    Ok(Json(DataResponse { data: collaborator }))
}
