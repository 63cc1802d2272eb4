//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs for the operations that touch that entity

pub mod collaborator;
pub mod contract;
pub mod invitation;
pub mod user;
