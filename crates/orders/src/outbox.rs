//! Outbox-backed event publication.
//!
//! [`OutboxEventBus`] implements [`EventBus`] by appending events to a
//! local outbox instead of talking to the broker inline, so a use case
//! never blocks on (or fails with) broker availability. A relay drains the
//! outbox to the real transport afterwards; entries stay queued until the
//! transport accepts them, giving at-least-once delivery.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::SaleEvent;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::bus::{EventBus, PublishError};

/// An event waiting in the outbox for delivery.
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    /// Unique entry identifier.
    pub id: Uuid,

    /// The event to deliver.
    pub event: SaleEvent,

    /// When the event was appended.
    pub appended_at: DateTime<Utc>,

    /// Number of failed delivery attempts so far.
    pub attempts: u32,
}

#[derive(Debug, Default)]
struct OutboxState {
    pending: Vec<OutboxEntry>,
    delivered: usize,
}

/// Event bus that appends to an in-process outbox.
///
/// `publish` only appends, so it cannot fail on broker trouble; call
/// [`OutboxEventBus::relay`] (typically from a background task) to push
/// queued events to the actual transport.
#[derive(Debug, Clone, Default)]
pub struct OutboxEventBus {
    state: Arc<RwLock<OutboxState>>,
}

impl OutboxEventBus {
    /// Creates an empty outbox bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of events awaiting delivery.
    pub async fn pending_count(&self) -> usize {
        self.state.read().await.pending.len()
    }

    /// Returns a copy of the entries awaiting delivery, oldest first.
    pub async fn pending(&self) -> Vec<OutboxEntry> {
        self.state.read().await.pending.clone()
    }

    /// Returns the number of events delivered so far.
    pub async fn delivered_count(&self) -> usize {
        self.state.read().await.delivered
    }

    /// Drains pending events to the transport, oldest first, and returns
    /// how many were delivered.
    ///
    /// Delivery stops at the first transport failure so event order is
    /// preserved; the failed entry keeps its place with its attempt count
    /// bumped, and a later relay retries it.
    pub async fn relay<B: EventBus>(&self, transport: &B) -> usize {
        let mut delivered = 0;
        loop {
            let entry = {
                let state = self.state.read().await;
                match state.pending.first() {
                    Some(entry) => entry.clone(),
                    None => break,
                }
            };

            match transport.publish(entry.event.clone()).await {
                Ok(()) => {
                    let mut state = self.state.write().await;
                    state.pending.remove(0);
                    state.delivered += 1;
                    delivered += 1;
                    metrics::counter!("outbox_events_delivered_total").increment(1);
                }
                Err(err) => {
                    let mut state = self.state.write().await;
                    if let Some(first) = state.pending.first_mut() {
                        first.attempts += 1;
                    }
                    tracing::warn!(
                        event = entry.event.event_type(),
                        attempts = entry.attempts + 1,
                        error = %err,
                        "outbox relay failed, will retry"
                    );
                    metrics::counter!("outbox_relay_failures_total").increment(1);
                    break;
                }
            }
        }
        delivered
    }
}

#[async_trait]
impl EventBus for OutboxEventBus {
    async fn publish(&self, event: SaleEvent) -> Result<(), PublishError> {
        let mut state = self.state.write().await;
        state.pending.push(OutboxEntry {
            id: Uuid::new_v4(),
            event,
            appended_at: Utc::now(),
            attempts: 0,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryEventBus;
    use common::SaleId;
    use domain::{DiscountPolicy, Money, Sale, SaleItem};

    fn sample_sale() -> Sale {
        let sale_id = SaleId::new();
        let item = SaleItem::new(
            sale_id,
            "SKU-001",
            "Widget",
            1,
            Money::from_cents(500).unwrap(),
            &DiscountPolicy::default(),
        )
        .unwrap();
        Sale::new(
            sale_id,
            "S-20260805-0001",
            Uuid::new_v4(),
            "Grace Hopper",
            Utc::now(),
            "Downtown",
            vec![item],
        )
    }

    #[tokio::test]
    async fn publish_appends_instead_of_delivering() {
        let outbox = OutboxEventBus::new();
        let sale = sample_sale();

        outbox
            .publish(SaleEvent::sale_created(&sale))
            .await
            .unwrap();

        assert_eq!(outbox.pending_count().await, 1);
        assert_eq!(outbox.delivered_count().await, 0);
    }

    #[tokio::test]
    async fn relay_delivers_in_order() {
        let outbox = OutboxEventBus::new();
        let transport = InMemoryEventBus::new();
        let sale = sample_sale();

        outbox
            .publish(SaleEvent::sale_created(&sale))
            .await
            .unwrap();
        outbox
            .publish(SaleEvent::sale_modified(&sale))
            .await
            .unwrap();

        let delivered = outbox.relay(&transport).await;

        assert_eq!(delivered, 2);
        assert_eq!(outbox.pending_count().await, 0);
        assert_eq!(
            transport.event_types().await,
            vec!["SaleCreated", "SaleModified"]
        );
    }

    #[tokio::test]
    async fn failed_relay_keeps_entries_for_retry() {
        let outbox = OutboxEventBus::new();
        let transport = InMemoryEventBus::new();
        let sale = sample_sale();

        outbox
            .publish(SaleEvent::sale_created(&sale))
            .await
            .unwrap();
        outbox
            .publish(SaleEvent::sale_cancelled(&sale))
            .await
            .unwrap();

        transport.set_fail_on_publish(true).await;
        assert_eq!(outbox.relay(&transport).await, 0);
        assert_eq!(outbox.pending_count().await, 2);
        assert_eq!(outbox.pending().await[0].attempts, 1);

        // The broker comes back; nothing was lost and order held.
        transport.set_fail_on_publish(false).await;
        assert_eq!(outbox.relay(&transport).await, 2);
        assert_eq!(
            transport.event_types().await,
            vec!["SaleCreated", "SaleCancelled"]
        );
    }
}
