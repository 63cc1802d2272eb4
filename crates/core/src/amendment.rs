//! Amendment proposals against a shared contract.
//!
//! An amendment is a protocol object, not a persisted entity: a collaborator
//! proposes a change to the acts map or the scheduled end, the proposal is
//! validated synchronously against the contract's current state, and -- when
//! valid -- applied in the same transaction that clears every collaborator's
//! confirmation. Invalid proposals are discarded with no effect.

use serde::{Deserialize, Serialize};

use crate::acts::{self, ActDecision, ActsMap};
use crate::types::Timestamp;

/// The proposed change, tagged for the wire as
/// `{"type": "add_acts", "changes": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "changes", rename_all = "snake_case")]
pub enum AmendmentKind {
    /// Mark the named acts yes. None of them may already be yes.
    AddActs { acts: Vec<String> },
    /// Withdraw consent for the named acts. All of them must currently be yes.
    RemoveActs { acts: Vec<String> },
    /// Push the scheduled end later.
    ExtendDuration { new_end_time: Timestamp },
    /// Pull the scheduled end earlier.
    ShortenDuration { new_end_time: Timestamp },
}

/// A full proposal: the change plus the mandatory reason.
#[derive(Debug, Clone, Deserialize)]
pub struct AmendmentProposal {
    #[serde(flatten)]
    pub kind: AmendmentKind,
    pub reason: String,
}

/// Validate a proposal against the contract's current acts and schedule.
///
/// `now` is passed in so callers (and tests) control the clock. Returns the
/// first violated rule as an error message; a valid proposal returns `Ok`.
pub fn validate_amendment(
    proposal: &AmendmentProposal,
    current_acts: &ActsMap,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), String> {
    if proposal.reason.trim().is_empty() {
        return Err("An amendment requires a reason".to_string());
    }

    match &proposal.kind {
        AmendmentKind::AddActs { acts: names } => {
            validate_act_list(names)?;
            for name in names {
                if acts::decision(current_acts, name) == ActDecision::Yes {
                    return Err(format!("Act '{name}' is already agreed to"));
                }
            }
            Ok(())
        }
        AmendmentKind::RemoveActs { acts: names } => {
            validate_act_list(names)?;
            for name in names {
                if acts::decision(current_acts, name) != ActDecision::Yes {
                    return Err(format!("Act '{name}' is not currently agreed to"));
                }
            }
            Ok(())
        }
        AmendmentKind::ExtendDuration { new_end_time } => {
            let current_end =
                end_time.ok_or_else(|| "Contract has no scheduled end to extend".to_string())?;
            if *new_end_time <= now {
                return Err("New end time must be in the future".to_string());
            }
            if *new_end_time <= current_end {
                return Err("An extension must move the end time later".to_string());
            }
            Ok(())
        }
        AmendmentKind::ShortenDuration { new_end_time } => {
            let current_end =
                end_time.ok_or_else(|| "Contract has no scheduled end to shorten".to_string())?;
            if *new_end_time <= now {
                return Err("New end time must be in the future".to_string());
            }
            if *new_end_time >= current_end {
                return Err("A reduction must move the end time earlier".to_string());
            }
            if let Some(start) = start_time {
                // Durations are stored in whole minutes; anything shorter
                // than a minute would round down to zero.
                if *new_end_time < start + chrono::Duration::minutes(1) {
                    return Err(
                        "New end time must leave at least one minute after the start".to_string(),
                    );
                }
            }
            Ok(())
        }
    }
}

/// Apply a validated amendment to the contract's acts map and end time.
///
/// Added acts become yes; removed acts become an explicit no (the withdrawal
/// is recorded, not silently forgotten). Callers must have validated first.
pub fn apply_amendment(
    kind: &AmendmentKind,
    current_acts: &mut ActsMap,
    end_time: &mut Option<Timestamp>,
) {
    match kind {
        AmendmentKind::AddActs { acts: names } => {
            for name in names {
                acts::set_decision(current_acts, name, ActDecision::Yes);
            }
        }
        AmendmentKind::RemoveActs { acts: names } => {
            for name in names {
                acts::set_decision(current_acts, name, ActDecision::No);
            }
        }
        AmendmentKind::ExtendDuration { new_end_time }
        | AmendmentKind::ShortenDuration { new_end_time } => {
            *end_time = Some(*new_end_time);
        }
    }
}

fn validate_act_list(names: &[String]) -> Result<(), String> {
    if names.is_empty() {
        return Err("An act amendment must name at least one act".to_string());
    }
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err("Act names must be non-empty".to_string());
    }
    Ok(())
}
