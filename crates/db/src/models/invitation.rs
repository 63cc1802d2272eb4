//! Invitation rows: single-use, time-bounded codes that bind an external
//! party (by email) into a contract's collaborator registry.

use accord_core::types::{DbId, Timestamp};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invitation lifetime in days.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Length of the random invitation code.
pub const INVITATION_CODE_LEN: usize = 32;

/// Invitation statuses.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const EXPIRED: &str = "expired";
}

/// A row from the `invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub contract_id: DbId,
    pub sender_id: DbId,
    pub recipient_email: String,
    /// Resolved at acceptance time; NULL until then.
    pub recipient_user_id: Option<DbId>,
    pub code: String,
    pub status: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for accepting an invitation. The acting user comes from auth.
#[derive(Debug, Deserialize)]
pub struct AcceptInvitation {
    pub code: String,
}

/// Generate a random single-use invitation code.
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(INVITATION_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_have_expected_length() {
        assert_eq!(generate_code().len(), INVITATION_CODE_LEN);
    }

    #[test]
    fn test_generated_codes_are_unique() {
        assert_ne!(generate_code(), generate_code());
    }

    #[test]
    fn test_generated_codes_are_alphanumeric() {
        assert!(generate_code().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
