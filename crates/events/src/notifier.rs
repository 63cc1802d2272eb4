//! Background notifier: tells the other parties about lifecycle transitions.
//!
//! Subscribes to the [`EventBus`](crate::EventBus) and, for each event,
//! resolves the contract's collaborator registry (minus the acting user) to
//! email addresses and sends each one a short plain-text notification.
//! Strictly fire-and-forget: a failed lookup or send is logged and dropped;
//! the transition that caused the event has already committed.

use accord_db::repositories::{CollaboratorRepo, UserRepo};
use accord_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{kinds, DomainEvent};
use crate::delivery::email::EmailDelivery;

/// Routes domain events to the affected parties.
pub struct Notifier {
    pool: DbPool,
    email: Option<EmailDelivery>,
}

impl Notifier {
    /// Create a notifier. With `email = None` (SMTP unconfigured),
    /// notifications are only logged.
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    /// Consume events until the bus is closed.
    pub async fn run(self, mut rx: broadcast::Receiver<DomainEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Notifier lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn handle(&self, event: &DomainEvent) {
        let collaborators =
            match CollaboratorRepo::list_for_contract(&self.pool, event.contract_id).await {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!(
                        contract_id = event.contract_id,
                        error = %err,
                        "Skipping notification: could not load collaborators"
                    );
                    return;
                }
            };

        for collaborator in collaborators {
            // The actor already knows what they did.
            if collaborator.user_id == event.actor_user_id {
                continue;
            }
            let user = match UserRepo::find_by_id(&self.pool, collaborator.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(
                        user_id = collaborator.user_id,
                        error = %err,
                        "Skipping notification: could not resolve user"
                    );
                    continue;
                }
            };

            let subject = subject_for(event);
            let body = body_for(event);
            match &self.email {
                Some(delivery) => {
                    if let Err(err) = delivery.send(&user.email, &subject, &body).await {
                        tracing::warn!(
                            to = %user.email,
                            event_type = %event.event_type,
                            error = %err,
                            "Notification email failed"
                        );
                    }
                }
                None => {
                    tracing::info!(
                        to = %user.email,
                        event_type = %event.event_type,
                        contract_id = event.contract_id,
                        "Notification (email disabled)"
                    );
                }
            }
        }
    }
}

fn subject_for(event: &DomainEvent) -> String {
    let what = match event.event_type.as_str() {
        kinds::CONTRACT_SHARED => "A contract was shared with you",
        kinds::INVITATION_ACCEPTED => "Your invitation was accepted",
        kinds::COLLABORATOR_REVIEWING => "A party is reviewing your contract",
        kinds::COLLABORATOR_APPROVED => "A party approved your contract",
        kinds::CONTRACT_REJECTED => "Your contract was rejected",
        kinds::CONTRACT_AMENDED => "Your contract was amended, please re-confirm",
        kinds::COLLABORATOR_CONFIRMED => "A party confirmed your contract",
        kinds::CONTRACT_ACTIVATED => "All parties confirmed: your contract is active",
        other => other,
    };
    format!("[Accord] {what}")
}

fn body_for(event: &DomainEvent) -> String {
    format!(
        "Contract #{}\nEvent: {}\nTime: {}\n\nOpen the app for details.",
        event.contract_id, event.event_type, event.timestamp
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_names_the_transition() {
        let event = DomainEvent::new(kinds::CONTRACT_ACTIVATED, 1, 2);
        assert_eq!(
            subject_for(&event),
            "[Accord] All parties confirmed: your contract is active"
        );
    }

    #[test]
    fn unknown_event_type_falls_back_to_raw_name() {
        let event = DomainEvent::new("contract.archived", 1, 2);
        assert_eq!(subject_for(&event), "[Accord] contract.archived");
    }

    #[test]
    fn body_includes_contract_reference() {
        let event = DomainEvent::new(kinds::CONTRACT_AMENDED, 42, 2);
        assert!(body_for(&event).contains("Contract #42"));
    }
}
