//! Accord event bus and notification infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Handlers publish a [`DomainEvent`] after each
//!   committed lifecycle transition.
//! - [`Notifier`] -- background subscriber that informs the other parties of
//!   a contract about the transition, by email when SMTP is configured.
//!   Delivery is fire-and-forget: failures are logged, never retried by this
//!   crate, and never affect the transition that triggered them.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{kinds, DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use notifier::Notifier;
