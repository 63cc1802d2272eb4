//! Contract rows and the DTOs for create/share/amend operations.

use accord_core::acts::ActsMap;
use accord_core::flow::ConsentFlowState;
use accord_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::collaborator::Collaborator;
use crate::models::invitation::Invitation;

/// A row from the `contracts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub user_id: DbId,
    pub university: Option<String>,
    pub encounter_type: String,
    /// Ordered party identifiers (JSONB array of strings).
    pub partners: serde_json::Value,
    /// Act name → decided boolean (JSONB object; absent = undecided).
    pub acts: serde_json::Value,
    pub start_time: Option<Timestamp>,
    pub duration_minutes: Option<i64>,
    pub end_time: Option<Timestamp>,
    pub method: Option<String>,
    pub signature_blob_id: Option<String>,
    pub photo_url: Option<String>,
    pub audio_url: Option<String>,
    pub biometric_descriptor: Option<String>,
    pub status: String,
    pub is_collaborative: bool,
    pub last_edited_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contract {
    /// Decode the JSONB acts column. Malformed data decodes as empty.
    pub fn acts_map(&self) -> ActsMap {
        serde_json::from_value(self.acts.clone()).unwrap_or_default()
    }

    /// Decode the JSONB partners column.
    pub fn partner_list(&self) -> Vec<String> {
        serde_json::from_value(self.partners.clone()).unwrap_or_default()
    }

    /// Rebuild a draft flow session from this row (resuming an abandoned
    /// draft on another device).
    pub fn flow_state(&self) -> ConsentFlowState {
        ConsentFlowState {
            university: self.university.clone(),
            encounter_type: Some(self.encounter_type.clone()),
            partners: self.partner_list(),
            acts: self.acts_map(),
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            method: self.method.clone(),
            draft_contract_id: Some(self.id),
        }
    }
}

/// References to externally stored documentation artifacts. The service
/// never produces these, only records them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactRefs {
    pub signature_blob_id: Option<String>,
    pub photo_url: Option<String>,
    pub audio_url: Option<String>,
    pub biometric_descriptor: Option<String>,
}

/// DTO for creating a contract from a completed (or partial) draft flow.
#[derive(Debug, Deserialize)]
pub struct CreateContract {
    pub flow: ConsentFlowState,
    #[serde(default)]
    pub is_collaborative: bool,
    #[serde(default)]
    pub artifacts: ArtifactRefs,
}

/// One party named in a share request: an existing user by id, or an
/// external party by email (who will receive an invitation).
#[derive(Debug, Clone, Deserialize)]
pub struct SharedParty {
    pub user_id: Option<DbId>,
    pub email: Option<String>,
}

/// DTO for sharing a contract with its other parties.
#[derive(Debug, Deserialize)]
pub struct ShareContract {
    pub parties: Vec<SharedParty>,
}

/// Result of a share: the rows that now bind each party to the contract.
#[derive(Debug, Serialize)]
pub struct ShareOutcome {
    pub contract: Contract,
    pub collaborators: Vec<Collaborator>,
    pub invitations: Vec<Invitation>,
}

/// A contract together with its collaborator registry.
#[derive(Debug, Serialize)]
pub struct ContractDetail {
    pub contract: Contract,
    pub collaborators: Vec<Collaborator>,
}
