//! Domain error taxonomy shared by every layer.
//!
//! - [`CoreError::Validation`] -- malformed or incomplete input; recoverable,
//!   no state was mutated.
//! - [`CoreError::Conflict`] -- the target contract/collaborator/invitation is
//!   in an incompatible state (terminal contract, expired invitation, ...).
//! - [`CoreError::Forbidden`] -- the actor is not a party to the record they
//!   are trying to mutate.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
