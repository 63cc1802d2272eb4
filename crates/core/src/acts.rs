//! Per-act consent decisions.
//!
//! Each intimate act in a contract carries an independent three-state
//! decision. The serialized acts map (stored as JSONB on the contract row)
//! only contains explicit yes/no entries; an absent act is undecided.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Serialized form of a contract's acts: act name → explicitly decided value.
/// `true` means consented, `false` means declined, absence means undecided.
pub type ActsMap = BTreeMap<String, bool>;

/// Decision state for a single act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActDecision {
    #[default]
    Undecided,
    Yes,
    No,
}

impl ActDecision {
    /// Advance the decision one step in the UI toggle cycle:
    /// undecided → yes → no → undecided.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Undecided => Self::Yes,
            Self::Yes => Self::No,
            Self::No => Self::Undecided,
        }
    }

    /// The map entry this decision serializes to (`None` = absent).
    pub const fn as_entry(self) -> Option<bool> {
        match self {
            Self::Undecided => None,
            Self::Yes => Some(true),
            Self::No => Some(false),
        }
    }

    /// Decode a map entry back into a decision.
    pub const fn from_entry(entry: Option<bool>) -> Self {
        match entry {
            None => Self::Undecided,
            Some(true) => Self::Yes,
            Some(false) => Self::No,
        }
    }
}

/// Look up the decision recorded for an act.
pub fn decision(acts: &ActsMap, name: &str) -> ActDecision {
    ActDecision::from_entry(acts.get(name).copied())
}

/// Record a decision for an act, removing the entry when undecided.
pub fn set_decision(acts: &mut ActsMap, name: &str, decision: ActDecision) {
    match decision.as_entry() {
        Some(value) => {
            acts.insert(name.to_string(), value);
        }
        None => {
            acts.remove(name);
        }
    }
}

/// Names of all acts currently marked yes, in map order.
pub fn consented(acts: &ActsMap) -> Vec<&str> {
    acts.iter()
        .filter(|(_, yes)| **yes)
        .map(|(name, _)| name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles_through_all_states() {
        let mut d = ActDecision::Undecided;
        d = d.toggled();
        assert_eq!(d, ActDecision::Yes);
        d = d.toggled();
        assert_eq!(d, ActDecision::No);
        d = d.toggled();
        assert_eq!(d, ActDecision::Undecided);
    }

    #[test]
    fn test_absent_act_is_undecided() {
        let acts = ActsMap::new();
        assert_eq!(decision(&acts, "holding_hands"), ActDecision::Undecided);
    }

    #[test]
    fn test_set_and_read_decision() {
        let mut acts = ActsMap::new();
        set_decision(&mut acts, "kissing", ActDecision::Yes);
        set_decision(&mut acts, "photos", ActDecision::No);
        assert_eq!(decision(&acts, "kissing"), ActDecision::Yes);
        assert_eq!(decision(&acts, "photos"), ActDecision::No);
    }

    #[test]
    fn test_undecided_removes_entry() {
        let mut acts = ActsMap::new();
        set_decision(&mut acts, "kissing", ActDecision::Yes);
        set_decision(&mut acts, "kissing", ActDecision::Undecided);
        assert!(acts.is_empty());
    }

    #[test]
    fn test_consented_lists_only_yes_entries() {
        let mut acts = ActsMap::new();
        set_decision(&mut acts, "a", ActDecision::Yes);
        set_decision(&mut acts, "b", ActDecision::No);
        set_decision(&mut acts, "c", ActDecision::Yes);
        assert_eq!(consented(&acts), vec!["a", "c"]);
    }

    #[test]
    fn test_entry_roundtrip() {
        for d in [ActDecision::Undecided, ActDecision::Yes, ActDecision::No] {
            assert_eq!(ActDecision::from_entry(d.as_entry()), d);
        }
    }
}
