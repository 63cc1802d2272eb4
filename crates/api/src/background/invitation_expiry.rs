//! Periodic sweep of overdue pending invitations.
//!
//! Invitation expiry is primarily enforced lazily at accept time; this
//! sweep exists so stale codes show up as `expired` in listings even when
//! nobody ever tries to redeem them. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use accord_db::repositories::InvitationRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the invitation expiry sweep loop.
///
/// Marks every pending invitation whose `expires_at` has passed as
/// `expired`. Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Invitation expiry sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Invitation expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match InvitationRepo::expire_stale(&pool).await {
                    Ok(expired) => {
                        if expired > 0 {
                            tracing::info!(expired, "Invitation expiry: marked stale invitations");
                        } else {
                            tracing::debug!("Invitation expiry: nothing to sweep");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Invitation expiry: sweep failed");
                    }
                }
            }
        }
    }
}
