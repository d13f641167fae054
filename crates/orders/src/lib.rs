//! Use-case layer for the storefront order lifecycle.
//!
//! This crate wires the domain aggregates to the persistence and event
//! ports: checkout (cart → sale), direct sale creation and update, and the
//! sale/item cancellation flows, each emitting the matching domain event
//! exactly once per committed change.

mod bus;
mod error;
mod outbox;
mod service;

pub use bus::{EventBus, InMemoryEventBus, PublishError};
pub use error::{ErrorKind, OrderFlowError};
pub use outbox::{OutboxEntry, OutboxEventBus};
pub use service::{OrderProcessor, SaleLine};
