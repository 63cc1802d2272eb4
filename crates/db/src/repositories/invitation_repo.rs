//! Repository for the `invitations` table.
//!
//! An invitation is single-use: acceptance is a conditional update guarded
//! by `status = 'pending'` under the row lock, so pending → accepted can
//! happen exactly once no matter how requests interleave. Expiry is lazy
//! (checked at acceptance) plus a periodic sweep.

use accord_core::contract::{collaborator_status, role};
use accord_core::error::CoreError;
use accord_core::types::DbId;
use chrono::Utc;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::collaborator::Collaborator;
use crate::models::invitation::{status, Invitation};
use crate::repositories::collaborator_repo;
use crate::repositories::contract_repo::{ensure_not_terminal, lock_contract};

/// Column list for `invitations` queries.
pub(crate) const COLUMNS: &str = "id, contract_id, sender_id, recipient_email, \
     recipient_user_id, code, status, expires_at, accepted_at, created_at, updated_at";

/// Provides invitation lookup, acceptance, and expiry.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Find an invitation by its single-use code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE code = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all invitations sent for a contract.
    pub async fn list_for_contract(
        pool: &PgPool,
        contract_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations WHERE contract_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(contract_id)
            .fetch_all(pool)
            .await
    }

    /// Accept an invitation, binding the acting user into the contract's
    /// collaborator registry as a recipient.
    ///
    /// Exactly-once: the invitation row is locked and the status flip is
    /// conditional on `pending`. Expired codes are marked `expired` and
    /// refused; an already-accepted or unknown code is a conflict. If the
    /// user is somehow already a collaborator, acceptance binds to that
    /// existing row rather than creating a second one.
    pub async fn accept(
        pool: &PgPool,
        code: &str,
        acting_user_id: DbId,
    ) -> Result<(Invitation, Collaborator), DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM invitations WHERE code = $1 FOR UPDATE");
        let invitation = sqlx::query_as::<_, Invitation>(&query)
            .bind(code)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::Conflict("Unknown invitation code".to_string()))?;

        match invitation.status.as_str() {
            status::ACCEPTED => {
                return Err(
                    CoreError::Conflict("Invitation has already been accepted".to_string()).into(),
                );
            }
            status::EXPIRED => {
                return Err(CoreError::Conflict("Invitation has expired".to_string()).into());
            }
            _ => {}
        }

        if invitation.expires_at <= Utc::now() {
            // Lazily record the expiry before refusing.
            sqlx::query(
                "UPDATE invitations SET status = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(invitation.id)
            .bind(status::EXPIRED)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            return Err(CoreError::Conflict("Invitation has expired".to_string()).into());
        }

        let contract = lock_contract(&mut tx, invitation.contract_id).await?;
        ensure_not_terminal(&contract)?;

        let query = format!(
            "UPDATE invitations
             SET status = $2, recipient_user_id = $3, accepted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        let invitation = sqlx::query_as::<_, Invitation>(&query)
            .bind(invitation.id)
            .bind(status::ACCEPTED)
            .bind(acting_user_id)
            .fetch_one(&mut *tx)
            .await?;

        let collaborator = collaborator_repo::insert_in_tx(
            &mut tx,
            invitation.contract_id,
            acting_user_id,
            role::RECIPIENT,
            collaborator_status::PENDING,
        )
        .await?;

        tx.commit().await?;
        Ok((invitation, collaborator))
    }

    /// Mark all overdue pending invitations as expired.
    /// Returns the number of invitations swept.
    pub async fn expire_stale(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET status = 'expired', updated_at = NOW()
             WHERE status = 'pending' AND expires_at < NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
