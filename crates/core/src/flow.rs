//! The draft flow session.
//!
//! [`ConsentFlowState`] is the explicit, caller-owned object holding
//! everything the user has entered before a contract is persisted. It is
//! created when contract creation begins, mutated as the user progresses,
//! and reset once a draft id is obtained or the flow is abandoned. All
//! operations are plain methods on the object; nothing here is global.

use serde::{Deserialize, Serialize};

use crate::acts::{self, ActsMap};
use crate::identity::{normalize_identifier, validate_identifier};
use crate::types::{DbId, Timestamp};

/// Client-side draft state for one contract-creation flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsentFlowState {
    /// Selected university / jurisdiction, if any.
    pub university: Option<String>,
    /// Encounter type (required before the draft may be persisted).
    pub encounter_type: Option<String>,
    /// Ordered, normalized party identifiers.
    pub partners: Vec<String>,
    /// Per-act decisions (absent = undecided).
    pub acts: ActsMap,
    /// Optional scheduled start.
    pub start_time: Option<Timestamp>,
    /// Optional duration in minutes (requires a start time, must be > 0).
    pub duration_minutes: Option<i64>,
    /// Chosen documentation method.
    pub method: Option<String>,
    /// Back-reference to the persisted draft, once one exists.
    pub draft_contract_id: Option<DbId>,
}

impl ConsentFlowState {
    /// Start a fresh flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all entered data, returning the flow to its initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Normalize, validate, and append a party identifier.
    ///
    /// Duplicates (after normalization) are rejected so the distinct-party
    /// requirement cannot be satisfied by entering the same person twice.
    pub fn add_partner(&mut self, raw: &str) -> Result<(), String> {
        let normalized = normalize_identifier(raw);
        validate_identifier(&normalized)?;
        if self.partners.contains(&normalized) {
            return Err(format!("'{normalized}' is already a party to this contract"));
        }
        self.partners.push(normalized);
        Ok(())
    }

    /// Remove a previously added party. Returns `true` if one was removed.
    pub fn remove_partner(&mut self, identifier: &str) -> bool {
        let before = self.partners.len();
        self.partners.retain(|p| p != identifier);
        self.partners.len() != before
    }

    /// Cycle the decision for an act: undecided → yes → no → undecided.
    pub fn toggle_act(&mut self, name: &str) {
        let next = acts::decision(&self.acts, name).toggled();
        acts::set_decision(&mut self.acts, name, next);
    }

    /// Computed end time: start + duration, when both are present.
    pub fn end_time(&self) -> Option<Timestamp> {
        match (self.start_time, self.duration_minutes) {
            (Some(start), Some(mins)) => Some(start + chrono::Duration::minutes(mins)),
            _ => None,
        }
    }

    /// The flow may be persisted as a draft once an encounter type is set.
    pub fn can_persist_draft(&self) -> bool {
        self.encounter_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// The flow may be shared (or a non-collaborative contract activated)
    /// only when encounter type, method, and at least two distinct valid
    /// parties are all present.
    pub fn can_activate_or_share(&self) -> bool {
        if !self.can_persist_draft() {
            return false;
        }
        match self.method.as_deref() {
            Some(m) if crate::contract::is_valid_method(m) => {}
            _ => return false,
        }
        let mut distinct: Vec<&str> = self
            .partners
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty() && validate_identifier(p).is_ok())
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        distinct.len() >= 2
    }
}
