//! Repository for the `collaborators` table: per-party review, approval,
//! rejection, and the server side of the confirmation gate.
//!
//! Each action mutates only the acting collaborator's own row (plus the
//! parent contract's derived status where the lifecycle demands it), always
//! under the contract row lock taken by
//! [`contract_repo::lock_contract`](crate::repositories::contract_repo).

use accord_core::contract::{collaborator_status, status};
use accord_core::error::CoreError;
use accord_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DbError;
use crate::models::collaborator::{Collaborator, ConfirmOutcome};
use crate::repositories::contract_repo::{ensure_not_terminal, lock_contract};

/// Column list for `collaborators` queries.
pub(crate) const COLUMNS: &str = "id, contract_id, user_id, role, status, last_viewed_at, \
     approved_at, rejected_at, rejection_reason, confirmed_at, created_at, updated_at";

/// Insert a collaborator row inside an open transaction.
///
/// Idempotent per (contract, user): re-adding an existing party returns the
/// existing row untouched.
pub(crate) async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: DbId,
    user_id: DbId,
    role: &str,
    initial_status: &str,
) -> Result<Collaborator, DbError> {
    let query = format!(
        "INSERT INTO collaborators (contract_id, user_id, role, status, approved_at)
         VALUES ($1, $2, $3, $4, CASE WHEN $4 = 'approved' THEN NOW() END)
         ON CONFLICT (contract_id, user_id) DO NOTHING
         RETURNING {COLUMNS}"
    );
    let inserted = sqlx::query_as::<_, Collaborator>(&query)
        .bind(contract_id)
        .bind(user_id)
        .bind(role)
        .bind(initial_status)
        .fetch_optional(&mut **tx)
        .await?;

    match inserted {
        Some(row) => Ok(row),
        None => find_in_tx(tx, contract_id, user_id)
            .await?
            .ok_or_else(|| CoreError::Internal("Collaborator insert conflict with no existing row".to_string()).into()),
    }
}

/// Fetch one collaborator row inside an open transaction.
pub(crate) async fn find_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    contract_id: DbId,
    user_id: DbId,
) -> Result<Option<Collaborator>, DbError> {
    let query =
        format!("SELECT {COLUMNS} FROM collaborators WHERE contract_id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, Collaborator>(&query)
        .bind(contract_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Provides per-collaborator lifecycle operations.
pub struct CollaboratorRepo;

impl CollaboratorRepo {
    /// List the collaborator registry for a contract, initiator first.
    pub async fn list_for_contract(
        pool: &PgPool,
        contract_id: DbId,
    ) -> Result<Vec<Collaborator>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM collaborators
             WHERE contract_id = $1
             ORDER BY role = 'initiator' DESC, created_at ASC"
        );
        sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .fetch_all(pool)
            .await
    }

    /// Find one party's row for a contract.
    pub async fn find(
        pool: &PgPool,
        contract_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Collaborator>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM collaborators WHERE contract_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Record that the acting collaborator opened the contract.
    ///
    /// Moves their own row `pending → reviewing` (other statuses are left
    /// alone) and stamps `last_viewed_at`. Idempotent; never changes the
    /// contract status.
    pub async fn review(
        pool: &PgPool,
        contract_id: DbId,
        user_id: DbId,
    ) -> Result<Collaborator, DbError> {
        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;
        ensure_not_terminal(&contract)?;

        let query = format!(
            "UPDATE collaborators
             SET status = CASE WHEN status = 'pending' THEN 'reviewing' ELSE status END,
                 last_viewed_at = NOW(), updated_at = NOW()
             WHERE contract_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_a_party(contract_id, user_id))?;

        tx.commit().await?;
        Ok(row)
    }

    /// Approve on the acting collaborator's own row.
    ///
    /// Approval signals agreement with the terms; it never activates the
    /// contract by itself -- activation is gated on [`Self::confirm`].
    pub async fn approve(
        pool: &PgPool,
        contract_id: DbId,
        user_id: DbId,
    ) -> Result<Collaborator, DbError> {
        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;
        ensure_not_terminal(&contract)?;

        let query = format!(
            "UPDATE collaborators
             SET status = $3, approved_at = COALESCE(approved_at, NOW()), updated_at = NOW()
             WHERE contract_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .bind(user_id)
            .bind(collaborator_status::APPROVED)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_a_party(contract_id, user_id))?;

        tx.commit().await?;
        Ok(row)
    }

    /// Reject on the acting collaborator's own row, with a mandatory reason.
    ///
    /// The first rejection moves the parent contract to `rejected` in the
    /// same transaction; the contract is then terminal and every later
    /// transition fails with a conflict.
    pub async fn reject(
        pool: &PgPool,
        contract_id: DbId,
        user_id: DbId,
        reason: &str,
    ) -> Result<Collaborator, DbError> {
        accord_core::contract::validate_rejection_reason(reason).map_err(CoreError::Validation)?;

        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;
        ensure_not_terminal(&contract)?;

        let query = format!(
            "UPDATE collaborators
             SET status = $3, rejected_at = NOW(), rejection_reason = $4, updated_at = NOW()
             WHERE contract_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .bind(user_id)
            .bind(collaborator_status::REJECTED)
            .bind(reason.trim())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_a_party(contract_id, user_id))?;

        sqlx::query(
            "UPDATE contracts SET status = $2, last_edited_by = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(contract_id)
        .bind(status::REJECTED)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// The server side of the confirmation gate.
    ///
    /// Idempotent per (contract, collaborator): a repeat confirm returns the
    /// original `confirmed_at` and is a no-op success. When the caller's
    /// confirmation completes the set, the contract transitions to `active`
    /// in the same transaction -- the row lock guarantees two concurrent
    /// last-confirmations cannot both activate.
    ///
    /// A live (pending, unexpired) invitation counts as an unconfirmed
    /// party: the invited person has no collaborator row yet, and activating
    /// without them would make the contract terminal before they could ever
    /// accept. Expired invitations do not block, whether or not the sweep
    /// has flagged them yet.
    pub async fn confirm(
        pool: &PgPool,
        contract_id: DbId,
        user_id: DbId,
    ) -> Result<ConfirmOutcome, DbError> {
        let mut tx = pool.begin().await?;
        let contract = lock_contract(&mut tx, contract_id).await?;

        if contract.status == status::REJECTED {
            return Err(CoreError::Conflict(format!(
                "Contract {contract_id} was rejected and can no longer be confirmed"
            ))
            .into());
        }

        let me = find_in_tx(&mut tx, contract_id, user_id)
            .await?
            .ok_or_else(|| not_a_party(contract_id, user_id))?;

        if contract.status == status::ACTIVE {
            // Already activated; the only way we get here is a repeat confirm.
            let confirmed_at = me.confirmed_at.ok_or_else(|| {
                CoreError::Internal(format!(
                    "Contract {contract_id} is active but collaborator {user_id} is unconfirmed"
                ))
            })?;
            return Ok(ConfirmOutcome {
                confirmed_at,
                all_parties_confirmed: true,
                newly_activated: false,
            });
        }

        if contract.is_collaborative && contract.status == status::DRAFT {
            return Err(CoreError::Conflict(
                "A collaborative contract must be shared before it can be confirmed".to_string(),
            )
            .into());
        }

        let query = format!(
            "UPDATE collaborators
             SET confirmed_at = COALESCE(confirmed_at, NOW()), updated_at = NOW()
             WHERE contract_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Collaborator>(&query)
            .bind(contract_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let confirmed_at = row.confirmed_at.ok_or_else(|| {
            CoreError::Internal("confirmed_at missing after confirmation".to_string())
        })?;

        let (unconfirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM collaborators WHERE contract_id = $1 AND confirmed_at IS NULL",
        )
        .bind(contract_id)
        .fetch_one(&mut *tx)
        .await?;

        let (awaiting_invite,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM invitations
             WHERE contract_id = $1 AND status = 'pending' AND expires_at > NOW()",
        )
        .bind(contract_id)
        .fetch_one(&mut *tx)
        .await?;

        let all_confirmed = unconfirmed == 0 && awaiting_invite == 0;
        if all_confirmed {
            sqlx::query("UPDATE contracts SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(contract_id)
                .bind(status::ACTIVE)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(ConfirmOutcome {
            confirmed_at,
            all_parties_confirmed: all_confirmed,
            newly_activated: all_confirmed,
        })
    }
}

fn not_a_party(contract_id: DbId, user_id: DbId) -> DbError {
    CoreError::Forbidden(format!(
        "User {user_id} is not a party to contract {contract_id}"
    ))
    .into()
}
