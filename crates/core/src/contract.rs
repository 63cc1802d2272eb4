//! Contract and collaborator status vocabulary and transition rules.
//!
//! Statuses are persisted as strings; this module is the single source of
//! truth for the valid values and for which transitions the lifecycle
//! permits. The repositories enforce these rules inside per-contract
//! transactions; handlers call the validation helpers before touching the
//! database so bad input fails fast.

/// Contract lifecycle statuses.
pub mod status {
    /// Created, not yet shared with the other parties.
    pub const DRAFT: &str = "draft";
    /// Shared; waiting on collaborator review and confirmation.
    pub const PENDING_APPROVAL: &str = "pending_approval";
    /// Every collaborator confirmed. Terminal.
    pub const ACTIVE: &str = "active";
    /// A collaborator rejected. Terminal.
    pub const REJECTED: &str = "rejected";
}

/// All valid contract statuses.
pub const VALID_STATUSES: &[&str] = &[
    status::DRAFT,
    status::PENDING_APPROVAL,
    status::ACTIVE,
    status::REJECTED,
];

/// Returns `true` once a contract can accept no further transitions.
pub fn is_terminal(contract_status: &str) -> bool {
    contract_status == status::ACTIVE || contract_status == status::REJECTED
}

/// Per-collaborator review statuses.
pub mod collaborator_status {
    pub const PENDING: &str = "pending";
    pub const REVIEWING: &str = "reviewing";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
}

/// All valid collaborator statuses.
pub const VALID_COLLABORATOR_STATUSES: &[&str] = &[
    collaborator_status::PENDING,
    collaborator_status::REVIEWING,
    collaborator_status::APPROVED,
    collaborator_status::REJECTED,
];

/// Collaborator roles. Exactly one initiator exists per contract.
pub mod role {
    pub const INITIATOR: &str = "initiator";
    pub const RECIPIENT: &str = "recipient";
}

/// Documentation methods a contract may commit to.
pub mod method {
    pub const SIGNATURE: &str = "signature";
    pub const VOICE: &str = "voice";
    pub const PHOTO: &str = "photo";
    pub const BIOMETRIC: &str = "biometric";
}

/// All valid documentation methods.
pub const VALID_METHODS: &[&str] = &[
    method::SIGNATURE,
    method::VOICE,
    method::PHOTO,
    method::BIOMETRIC,
];

/// Returns `true` if the given documentation method is valid.
pub fn is_valid_method(m: &str) -> bool {
    VALID_METHODS.contains(&m)
}

/// Validate an optional schedule: duration must be positive when present,
/// and a duration without a start time is meaningless.
pub fn validate_schedule(
    start_time: Option<crate::types::Timestamp>,
    duration_minutes: Option<i64>,
) -> Result<(), String> {
    match (start_time, duration_minutes) {
        (_, Some(mins)) if mins <= 0 => {
            Err(format!("Duration must be positive, got {mins} minute(s)"))
        }
        (None, Some(_)) => Err("A duration requires a start time".to_string()),
        _ => Ok(()),
    }
}

/// Validate that a rejection carries a usable reason.
pub fn validate_rejection_reason(reason: &str) -> Result<(), String> {
    if reason.trim().is_empty() {
        Err("A rejection requires a reason".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal(status::ACTIVE));
        assert!(is_terminal(status::REJECTED));
        assert!(!is_terminal(status::DRAFT));
        assert!(!is_terminal(status::PENDING_APPROVAL));
    }

    #[test]
    fn test_valid_methods() {
        assert!(is_valid_method("signature"));
        assert!(is_valid_method("voice"));
        assert!(is_valid_method("photo"));
        assert!(is_valid_method("biometric"));
    }

    #[test]
    fn test_invalid_methods() {
        assert!(!is_valid_method(""));
        assert!(!is_valid_method("video"));
        assert!(!is_valid_method("SIGNATURE"));
    }

    #[test]
    fn test_schedule_with_positive_duration() {
        assert!(validate_schedule(Some(Utc::now()), Some(120)).is_ok());
    }

    #[test]
    fn test_schedule_without_times() {
        assert!(validate_schedule(None, None).is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = validate_schedule(Some(Utc::now()), Some(0));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("positive"));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(validate_schedule(Some(Utc::now()), Some(-30)).is_err());
    }

    #[test]
    fn test_duration_without_start_rejected() {
        assert!(validate_schedule(None, Some(60)).is_err());
    }

    #[test]
    fn test_empty_rejection_reason() {
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason("   ").is_err());
        assert!(validate_rejection_reason("changed my mind").is_ok());
    }
}
