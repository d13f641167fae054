//! Event bus trait and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::SaleEvent;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when handing an event to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The transport rejected or never accepted the event.
    #[error("event transport error: {0}")]
    Transport(String),
}

/// Port onto the message transport.
///
/// The transport is assumed to deliver accepted events at least once; the
/// core does not retry publication itself. Events are owned snapshot
/// values, so nothing the caller does after `publish` returns can change
/// what subscribers see.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Hands an event to the transport.
    async fn publish(&self, event: SaleEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Default)]
struct InMemoryBusState {
    published: Vec<SaleEvent>,
    fail_on_publish: bool,
}

/// In-memory event bus for testing: records every published event.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventBus {
    state: Arc<RwLock<InMemoryBusState>>,
}

impl InMemoryEventBus {
    /// Creates a new in-memory bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bus to fail publish calls.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Returns a copy of every event published so far, in order.
    pub async fn published(&self) -> Vec<SaleEvent> {
        self.state.read().await.published.clone()
    }

    /// Returns the event type names published so far, in order.
    pub async fn event_types(&self) -> Vec<&'static str> {
        self.state
            .read()
            .await
            .published
            .iter()
            .map(SaleEvent::event_type)
            .collect()
    }

    /// Returns the number of events published so far.
    pub async fn published_count(&self) -> usize {
        self.state.read().await.published.len()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: SaleEvent) -> Result<(), PublishError> {
        let mut state = self.state.write().await;

        if state.fail_on_publish {
            return Err(PublishError::Transport("broker unreachable".to_string()));
        }

        state.published.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::SaleId;
    use domain::{DiscountPolicy, Money, Sale, SaleItem};
    use uuid::Uuid;

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
    async fn records_published_events_in_order() {
        let bus = InMemoryEventBus::new();
        let sale = sample_sale();

        bus.publish(SaleEvent::sale_created(&sale)).await.unwrap();
        bus.publish(SaleEvent::sale_modified(&sale)).await.unwrap();

        assert_eq!(bus.event_types().await, vec!["SaleCreated", "SaleModified"]);
        assert_eq!(bus.published_count().await, 2);
    }

    #[tokio::test]
    async fn fail_toggle_rejects_publication() {
        let bus = InMemoryEventBus::new();
        bus.set_fail_on_publish(true).await;

        let err = bus
            .publish(SaleEvent::sale_created(&sample_sale()))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Transport(_)));
        assert_eq!(bus.published_count().await, 0);
    }
}
