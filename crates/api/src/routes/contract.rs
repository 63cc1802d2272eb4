//! Route definitions for the contract lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{amendment, confirm, contract, review};
use crate::state::AppState;

/// Contract routes, nested under `/contracts`.
///
/// ```text
/// GET    /                          list_contracts
/// POST   /                          create_contract
/// GET    /{contract_id}             get_contract
/// POST   /{contract_id}/share       share_contract
/// POST   /{contract_id}/review      review_contract
/// POST   /{contract_id}/approve     approve_contract
/// POST   /{contract_id}/reject      reject_contract
/// POST   /{contract_id}/amendments  amend_contract
/// POST   /{contract_id}/confirm     confirm_contract
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contract::list_contracts).post(contract::create_contract),
        )
        .route("/{contract_id}", get(contract::get_contract))
        .route("/{contract_id}/share", post(contract::share_contract))
        .route("/{contract_id}/review", post(review::review_contract))
        .route("/{contract_id}/approve", post(review::approve_contract))
        .route("/{contract_id}/reject", post(review::reject_contract))
        .route("/{contract_id}/amendments", post(amendment::amend_contract))
        .route("/{contract_id}/confirm", post(confirm::confirm_contract))
}
