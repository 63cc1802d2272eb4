//! Collaborator rows and confirmation-gate DTOs.

use accord_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `collaborators` table: one party's independent
/// review/approval/confirmation state for one contract.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collaborator {
    pub id: DbId,
    pub contract_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub status: String,
    pub last_viewed_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for rejecting a contract. The reason is mandatory.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Server-side result of one confirm call.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    /// The caller's own confirmation timestamp (existing one if this call
    /// was an idempotent repeat).
    pub confirmed_at: Timestamp,
    /// Whether every collaborator has now confirmed.
    pub all_parties_confirmed: bool,
    /// Whether this call was the one that activated the contract.
    #[serde(skip)]
    pub newly_activated: bool,
}
