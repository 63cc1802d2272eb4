//! Handlers for contract creation, retrieval, and sharing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use accord_core::contract::validate_schedule;
use accord_core::error::CoreError;
use accord_core::types::DbId;
use accord_db::models::contract::{ContractDetail, CreateContract, ShareContract};
use accord_db::repositories::{CollaboratorRepo, ContractRepo};
use accord_events::{kinds, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts
///
/// Persist a draft contract from a (possibly partial) flow session. The
/// acting user becomes the initiator collaborator.
pub async fn create_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContract>,
) -> AppResult<impl IntoResponse> {
    let flow = &input.flow;
    if !flow.can_persist_draft() {
        return Err(AppError::Core(CoreError::Validation(
            "A draft requires an encounter type".to_string(),
        )));
    }
    validate_schedule(flow.start_time, flow.duration_minutes)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    if let Some(m) = flow.method.as_deref() {
        if !accord_core::contract::is_valid_method(m) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown consent method: {m}"
            ))));
        }
    }

    let contract = ContractRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract.id,
        is_collaborative = contract.is_collaborative,
        "Contract created"
    );

    state.event_bus.publish(DomainEvent::new(
        kinds::CONTRACT_CREATED,
        contract.id,
        auth.user_id,
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: contract })))
}

/// GET /api/v1/contracts
///
/// List every contract the acting user is a party to, newest first.
pub async fn list_contracts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contracts = ContractRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: contracts }))
}

/// GET /api/v1/contracts/{contract_id}
///
/// Fetch one contract together with its collaborator registry. Only parties
/// to the contract may see it.
pub async fn get_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let contract = ContractRepo::find_by_id(&state.pool, contract_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contract",
            id: contract_id,
        }))?;

    let collaborators = CollaboratorRepo::list_for_contract(&state.pool, contract_id).await?;
    if !collaborators.iter().any(|c| c.user_id == auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "User {} is not a party to contract {contract_id}",
            auth.user_id
        ))));
    }

    Ok(Json(DataResponse {
        data: ContractDetail {
            contract,
            collaborators,
        },
    }))
}

/// POST /api/v1/contracts/{contract_id}/share
///
/// Share a contract with its other parties. Known users become recipient
/// collaborators; unknown emails receive single-use invitations. Moves the
/// contract to `pending_approval`.
pub async fn share_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(input): Json<ShareContract>,
) -> AppResult<impl IntoResponse> {
    if input.parties.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Sharing requires at least one party".to_string(),
        )));
    }

    let outcome = ContractRepo::share(&state.pool, contract_id, auth.user_id, &input.parties).await?;

    tracing::info!(
        user_id = auth.user_id,
        contract_id = contract_id,
        collaborators = outcome.collaborators.len(),
        invitations = outcome.invitations.len(),
        "Contract shared"
    );

    state.event_bus.publish(
        DomainEvent::new(kinds::CONTRACT_SHARED, contract_id, auth.user_id).with_payload(
            serde_json::json!({
                "collaborators": outcome.collaborators.len(),
                "invitations": outcome.invitations.len(),
            }),
        ),
    );

    Ok(Json(DataResponse { data: outcome }))
}
