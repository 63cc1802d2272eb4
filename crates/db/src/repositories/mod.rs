//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lifecycle transitions run in
//! transactions that lock the owning contract row first (see
//! `lock_contract` in `contract_repo`).

pub mod collaborator_repo;
pub mod contract_repo;
pub mod invitation_repo;
pub mod user_repo;

pub use collaborator_repo::CollaboratorRepo;
pub use contract_repo::ContractRepo;
pub use invitation_repo::InvitationRepo;
pub use user_repo::UserRepo;
