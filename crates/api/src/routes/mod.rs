pub mod contract;
pub mod health;
pub mod invitation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /contracts                            list, create
/// /contracts/{id}                       get (with collaborator registry)
/// /contracts/{id}/share                 share with parties (POST)
/// /contracts/{id}/review                mark reviewing (POST)
/// /contracts/{id}/approve               approve terms (POST)
/// /contracts/{id}/reject                reject with reason (POST)
/// /contracts/{id}/amendments            apply amendment (POST)
/// /contracts/{id}/confirm               confirm after hold gate (POST)
///
/// /invitations/accept                   redeem invitation code (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/contracts", contract::router())
        .nest("/invitations", invitation::router())
}
