//! Error type for repository operations that enforce lifecycle rules.
//!
//! Plain CRUD methods return `sqlx::Error` directly. Transition methods
//! return [`DbError`] so they can surface domain violations (terminal
//! contract, non-collaborator actor, invalid amendment) discovered inside
//! the transaction, alongside transport failures.

use accord_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The transition violated a lifecycle rule.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The underlying query failed.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
