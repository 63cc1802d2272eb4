//! Repository for the `contracts` table and the contract-level transitions
//! (create, share, amendment application).
//!
//! Every mutating method here begins a transaction and locks the contract
//! row with `SELECT ... FOR UPDATE` before reading any dependent state, so
//! all transitions touching one contract are applied serially.

use accord_core::amendment::{self, AmendmentProposal};
use accord_core::contract::{role, status};
use accord_core::error::CoreError;
use accord_core::types::{DbId, Timestamp};
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DbError;
use crate::models::contract::{Contract, CreateContract, ShareOutcome, SharedParty};
use crate::models::invitation::{self, Invitation};
use crate::models::user::User;
use crate::repositories::collaborator_repo;

/// Column list for `contracts` queries.
pub(crate) const COLUMNS: &str = "id, user_id, university, encounter_type, partners, acts, \
     start_time, duration_minutes, end_time, method, signature_blob_id, photo_url, \
     audio_url, biometric_descriptor, status, is_collaborative, last_edited_by, \
     created_at, updated_at";

/// Lock a contract row for the remainder of the transaction.
///
/// This is the serialization point for all per-contract transitions:
/// whoever holds the lock sees (and writes) a consistent collaborator
/// registry until commit.
pub(crate) async fn lock_contract(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: DbId,
) -> Result<Contract, DbError> {
    let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Contract>(&query)
        .bind(contract_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Contract",
                id: contract_id,
            }
            .into()
        })
}

/// Reject any transition against a contract already in a terminal state.
pub(crate) fn ensure_not_terminal(contract: &Contract) -> Result<(), DbError> {
    if accord_core::contract::is_terminal(&contract.status) {
        return Err(CoreError::Conflict(format!(
            "Contract {} is already {}",
            contract.id, contract.status
        ))
        .into());
    }
    Ok(())
}

/// Provides contract persistence and contract-level transitions.
pub struct ContractRepo;

impl ContractRepo {
    /// Persist a draft contract and its initiator collaborator in one
    /// transaction.
    ///
    /// Callers must have checked `can_persist_draft` and validated the
    /// schedule/method/partners; this method only writes. Non-collaborative
    /// contracts get their sole collaborator pre-approved, since there is no
    /// peer review to wait for.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateContract,
    ) -> Result<Contract, DbError> {
        let flow = &input.flow;
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO contracts
                (user_id, university, encounter_type, partners, acts, start_time,
                 duration_minutes, end_time, method, signature_blob_id, photo_url,
                 audio_url, biometric_descriptor, status, is_collaborative, last_edited_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $1)
             RETURNING {COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&query)
            .bind(user_id)
            .bind(&flow.university)
            .bind(flow.encounter_type.as_deref().unwrap_or_default())
            .bind(serde_json::json!(flow.partners))
            .bind(serde_json::json!(flow.acts))
            .bind(flow.start_time)
            .bind(flow.duration_minutes)
            .bind(flow.end_time())
            .bind(&flow.method)
            .bind(&input.artifacts.signature_blob_id)
            .bind(&input.artifacts.photo_url)
            .bind(&input.artifacts.audio_url)
            .bind(&input.artifacts.biometric_descriptor)
            .bind(status::DRAFT)
            .bind(input.is_collaborative)
            .fetch_one(&mut *tx)
            .await?;

        let initiator_status = if input.is_collaborative {
            accord_core::contract::collaborator_status::PENDING
        } else {
            accord_core::contract::collaborator_status::APPROVED
        };
        collaborator_repo::insert_in_tx(&mut tx, contract.id, user_id, role::INITIATOR, initiator_status)
            .await?;

        tx.commit().await?;
        Ok(contract)
    }

    /// Find a contract by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every contract the user is a party to, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts
             WHERE id IN (SELECT contract_id FROM collaborators WHERE user_id = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Share a contract with its other parties, moving it to
    /// `pending_approval`.
    ///
    /// Only the initiator may share. Parties who are known users become
    /// recipient collaborators directly; parties named by an unknown email
    /// receive a single-use invitation instead. Sharing again is allowed
    /// while the contract is non-terminal (to add late parties) and is
    /// idempotent per party.
    pub async fn share(
        pool: &PgPool,
        contract_id: DbId,
        actor_id: DbId,
        parties: &[SharedParty],
    ) -> Result<ShareOutcome, DbError> {
        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;
        ensure_not_terminal(&contract)?;

        let actor = collaborator_repo::find_in_tx(&mut tx, contract_id, actor_id)
            .await?
            .ok_or_else(|| {
                CoreError::Forbidden(format!("User {actor_id} is not a party to contract {contract_id}"))
            })?;
        if actor.role != role::INITIATOR {
            return Err(
                CoreError::Forbidden("Only the initiator may share a contract".to_string()).into(),
            );
        }

        // Sharing requires the same completeness as activation: encounter
        // type, method, and at least two distinct valid parties.
        if !contract.flow_state().can_activate_or_share() {
            return Err(CoreError::Validation(
                "Contract is incomplete: set an encounter type, a documentation method, \
                 and at least two distinct parties before sharing"
                    .to_string(),
            )
            .into());
        }

        let mut collaborators = Vec::new();
        let mut invitations = Vec::new();
        for party in parties {
            match (party.user_id, party.email.as_deref()) {
                (Some(user_id), _) => {
                    ensure_user_exists(&mut tx, user_id).await?;
                    collaborators
                        .push(add_recipient(&mut tx, contract_id, user_id).await?);
                }
                (None, Some(email)) => {
                    // Known member emails bypass the invitation subsystem.
                    let known: Option<User> = sqlx::query_as(
                        "SELECT id, username, email, display_name, created_at, updated_at \
                         FROM users WHERE LOWER(email) = LOWER($1)",
                    )
                    .bind(email)
                    .fetch_optional(&mut *tx)
                    .await?;

                    match known {
                        Some(user) => collaborators
                            .push(add_recipient(&mut tx, contract_id, user.id).await?),
                        None => invitations
                            .push(create_invitation(&mut tx, contract_id, actor_id, email).await?),
                    }
                }
                (None, None) => {
                    return Err(CoreError::Validation(
                        "Each shared party needs a user_id or an email".to_string(),
                    )
                    .into());
                }
            }
        }

        let query = format!(
            "UPDATE contracts
             SET status = $2, last_edited_by = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&query)
            .bind(contract_id)
            .bind(status::PENDING_APPROVAL)
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ShareOutcome {
            contract,
            collaborators,
            invitations,
        })
    }

    /// Validate and apply an amendment proposal.
    ///
    /// Runs entirely under the contract row lock: validates the proposal
    /// against the current acts/schedule, applies the change, clears every
    /// collaborator's `confirmed_at`, and moves the contract back to
    /// `pending_approval` so the re-confirmation cycle is an explicit status,
    /// not an implicit derived state. Invalid proposals leave no trace.
    ///
    /// Amendment is the one transition allowed on an `active` contract: an
    /// activated contract's acts and schedule are immutable except through
    /// this path, which reopens the confirmation cycle. Drafts are edited
    /// directly and rejected contracts stay rejected.
    pub async fn apply_amendment(
        pool: &PgPool,
        contract_id: DbId,
        actor_id: DbId,
        proposal: &AmendmentProposal,
        now: Timestamp,
    ) -> Result<Contract, DbError> {
        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;
        if contract.status == status::REJECTED {
            return Err(CoreError::Conflict(format!(
                "Contract {contract_id} was rejected and can no longer be amended"
            ))
            .into());
        }
        if contract.status == status::DRAFT {
            return Err(CoreError::Conflict(
                "Contract is still a draft; edit it directly instead of amending".to_string(),
            )
            .into());
        }

        collaborator_repo::find_in_tx(&mut tx, contract_id, actor_id)
            .await?
            .ok_or_else(|| {
                CoreError::Forbidden(format!("User {actor_id} is not a party to contract {contract_id}"))
            })?;

        let mut acts = contract.acts_map();
        let mut end_time = contract.end_time;
        amendment::validate_amendment(proposal, &acts, contract.start_time, end_time, now)
            .map_err(CoreError::Validation)?;
        amendment::apply_amendment(&proposal.kind, &mut acts, &mut end_time);

        // Validation guarantees end >= start + 1 minute, so the truncated
        // value stays positive and satisfies ck_contracts_duration.
        let duration_minutes = match (contract.start_time, end_time) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => contract.duration_minutes,
        };

        let query = format!(
            "UPDATE contracts
             SET acts = $2, end_time = $3, duration_minutes = $4,
                 status = $5, last_edited_by = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Contract>(&query)
            .bind(contract_id)
            .bind(serde_json::json!(acts))
            .bind(end_time)
            .bind(duration_minutes)
            .bind(status::PENDING_APPROVAL)
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await?;

        // Every party must re-confirm the amended terms.
        sqlx::query(
            "UPDATE collaborators SET confirmed_at = NULL, updated_at = NOW()
             WHERE contract_id = $1 AND confirmed_at IS NOT NULL",
        )
        .bind(contract_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

async fn ensure_user_exists(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
) -> Result<(), DbError> {
    let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    if exists.is_none() {
        return Err(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }
        .into());
    }
    Ok(())
}

async fn add_recipient(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: DbId,
    user_id: DbId,
) -> Result<crate::models::collaborator::Collaborator, DbError> {
    collaborator_repo::insert_in_tx(
        tx,
        contract_id,
        user_id,
        role::RECIPIENT,
        accord_core::contract::collaborator_status::PENDING,
    )
    .await
}

/// At most one live invitation exists per (contract, email). Re-sharing
/// with the same party returns the original code; a stale pending code is
/// superseded by a fresh one.
async fn create_invitation(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: DbId,
    sender_id: DbId,
    email: &str,
) -> Result<Invitation, DbError> {
    let query = format!(
        "SELECT {} FROM invitations
         WHERE contract_id = $1 AND LOWER(recipient_email) = LOWER($2) AND status = 'pending'",
        crate::repositories::invitation_repo::COLUMNS,
    );
    let existing = sqlx::query_as::<_, Invitation>(&query)
        .bind(contract_id)
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?;
    if let Some(found) = existing {
        if found.expires_at > Utc::now() {
            return Ok(found);
        }
        // Overdue but not yet swept; retire it before issuing a new code.
        sqlx::query("UPDATE invitations SET status = 'expired', updated_at = NOW() WHERE id = $1")
            .bind(found.id)
            .execute(&mut **tx)
            .await?;
    }

    let query = format!(
        "INSERT INTO invitations (contract_id, sender_id, recipient_email, code, expires_at)
         VALUES ($1, $2, $3, $4, NOW() + INTERVAL '{} days')
         RETURNING {}",
        invitation::INVITATION_TTL_DAYS,
        crate::repositories::invitation_repo::COLUMNS,
    );
    let row = sqlx::query_as::<_, Invitation>(&query)
        .bind(contract_id)
        .bind(sender_id)
        .bind(email)
        .bind(invitation::generate_code())
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}
