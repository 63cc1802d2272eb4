//! Accord domain core.
//!
//! Pure, I/O-free building blocks for the consent contract lifecycle:
//! identifier validation, the draft flow session, the contract/collaborator
//! status vocabulary, amendment validation, and the hold-to-confirm gate
//! protocol. This crate has no internal dependencies so the persistence,
//! event, and API layers can all share the same rules.

pub mod acts;
pub mod amendment;
pub mod confirm;
pub mod contract;
pub mod error;
pub mod flow;
pub mod identity;
pub mod types;
