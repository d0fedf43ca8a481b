//! Content gating predicate
//!
//! A gate rule decides whether the player's party (the set of unlocked
//! characters) may access a monolith. Rules combine an ALL clause and an ANY
//! clause; both present means both must hold.

use serde::{Deserialize, Serialize};

use crate::progress::CharacterId;

/// Character requirements for accessing gated content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRule {
    /// Every listed character must be in the party (vacuously true if empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<CharacterId>>,
    /// At least one listed character must be in the party.
    /// An empty list is never satisfied - `Some(vec![])` locks the gate shut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<CharacterId>>,
}

/// Evaluate a gate against the current party. No rule means no gate.
pub fn gate_allows(rule: Option<&GateRule>, party: &[CharacterId]) -> bool {
    let Some(rule) = rule else {
        return true;
    };
    if let Some(all) = &rule.all {
        if !all.iter().all(|req| party.contains(req)) {
            return false;
        }
    }
    if let Some(any) = &rule.any {
        if !any.iter().any(|req| party.contains(req)) {
            return false;
        }
    }
    true
}
