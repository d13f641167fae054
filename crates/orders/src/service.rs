//! Order lifecycle use cases.
//!
//! [`OrderProcessor`] drives every operation that turns carts into sales or
//! mutates a sale afterwards. Each use case loads the aggregate fresh,
//! applies the domain rules, persists through a version-checked write, and
//! then announces the committed change on the event bus. A publish failure
//! after a successful persist does not fail the use case; it is logged and
//! counted instead.

use chrono::{DateTime, Utc};
use common::{CartId, SaleId};
use domain::{Cart, CartError, DiscountPolicy, Money, ProductId, Sale, SaleEvent, SaleItem};
use store::{CartStore, ProductCatalog, SaleStore};
use uuid::Uuid;

use crate::bus::EventBus;
use crate::error::OrderFlowError;

/// A requested product line: which product and how many units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    /// The product to sell.
    pub product_id: ProductId,
    /// Units requested.
    pub quantity: u32,
}

impl SaleLine {
    /// Creates a line request.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Orchestrates the order lifecycle over the store and bus ports.
pub struct OrderProcessor<C, S, P, B>
where
    C: CartStore,
    S: SaleStore,
    P: ProductCatalog,
    B: EventBus,
{
    carts: C,
    sales: S,
    catalog: P,
    bus: B,
    policy: DiscountPolicy,
    branch: String,
}

impl<C, S, P, B> OrderProcessor<C, S, P, B>
where
    C: CartStore,
    S: SaleStore,
    P: ProductCatalog,
    B: EventBus,
{
    /// Creates a processor with the default discount policy. `branch`
    /// names the branch recorded on sales produced by checkout.
    pub fn new(carts: C, sales: S, catalog: P, bus: B, branch: impl Into<String>) -> Self {
        Self {
            carts,
            sales,
            catalog,
            bus,
            policy: DiscountPolicy::default(),
            branch: branch.into(),
        }
    }

    /// Replaces the discount policy.
    pub fn with_policy(mut self, policy: DiscountPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Converts a cart into a sale.
    ///
    /// Validates the cart against the discount policy, snapshots every line
    /// into a sale item, persists the sale, and retires the cart. If the
    /// cart cannot be deleted after the sale was persisted, the sale is
    /// voided again (compensating action) and the checkout fails; the store
    /// never keeps both a sale and its source cart.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, cart_id: CartId) -> Result<Sale, OrderFlowError> {
        metrics::counter!("checkouts_total").increment(1);

        let cart = self
            .carts
            .get(cart_id)
            .await?
            .ok_or(OrderFlowError::CartNotFound(cart_id))?;

        self.policy.validate_for_checkout(&cart.lines())?;

        let sale = self.build_sale_from_cart(&cart)?;
        let persisted = self.sales.create(sale).await?;

        match self.carts.delete(cart_id).await {
            Ok(true) => {}
            Ok(false) => {
                // The cart vanished between load and delete: another
                // checkout or deletion won the race.
                self.void_sale(persisted).await;
                return Err(OrderFlowError::CartConflict(cart_id));
            }
            Err(err) => {
                self.void_sale(persisted).await;
                return Err(err.into());
            }
        }

        tracing::info!(
            sale_id = %persisted.id(),
            sale_number = %persisted.sale_number(),
            total = %persisted.total_value(),
            items = persisted.items().len(),
            "checkout completed"
        );
        self.publish(SaleEvent::sale_created(&persisted)).await;
        Ok(persisted)
    }

    /// Creates a sale directly from catalog products, without a cart.
    #[tracing::instrument(skip(self))]
    pub async fn create_sale(
        &self,
        customer_id: Uuid,
        customer_name: &str,
        branch: &str,
        lines: &[SaleLine],
    ) -> Result<Sale, OrderFlowError> {
        let sale_id = SaleId::new();
        let sale_date = Utc::now();
        let items = self.price_lines(sale_id, lines).await?;

        let sale = Sale::new(
            sale_id,
            next_sale_number(sale_date),
            customer_id,
            customer_name,
            sale_date,
            branch,
            items,
        );

        let persisted = self.sales.create(sale).await?;
        tracing::info!(
            sale_id = %persisted.id(),
            total = %persisted.total_value(),
            "sale created"
        );
        self.publish(SaleEvent::sale_created(&persisted)).await;
        Ok(persisted)
    }

    /// Replaces the items of a pending sale.
    #[tracing::instrument(skip(self))]
    pub async fn update_sale(
        &self,
        sale_id: SaleId,
        lines: &[SaleLine],
    ) -> Result<Sale, OrderFlowError> {
        let mut sale = self
            .sales
            .get(sale_id)
            .await?
            .ok_or(OrderFlowError::SaleNotFound(sale_id))?;

        let items = self.price_lines(sale_id, lines).await?;
        sale.replace_items(items)?;

        let persisted = self.sales.update(sale).await?;
        tracing::info!(sale_id = %persisted.id(), total = %persisted.total_value(), "sale updated");
        self.publish(SaleEvent::sale_modified(&persisted)).await;
        Ok(persisted)
    }

    /// Cancels a whole sale, cascading cancellation to its items.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_sale(&self, sale_id: SaleId) -> Result<Sale, OrderFlowError> {
        let mut sale = self
            .sales
            .get(sale_id)
            .await?
            .ok_or(OrderFlowError::SaleNotFound(sale_id))?;

        sale.cancel()?;

        let persisted = self.sales.update(sale).await?;
        tracing::info!(sale_id = %persisted.id(), "sale cancelled");
        self.publish(SaleEvent::sale_cancelled(&persisted)).await;
        Ok(persisted)
    }

    /// Cancels a single item of a sale and recomputes the sale total.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_item(
        &self,
        sale_id: SaleId,
        product_id: &ProductId,
    ) -> Result<Sale, OrderFlowError> {
        let mut sale = self
            .sales
            .get(sale_id)
            .await?
            .ok_or(OrderFlowError::SaleNotFound(sale_id))?;

        let cancelled = sale.cancel_item(product_id)?;

        let persisted = self.sales.update(sale).await?;
        tracing::info!(
            sale_id = %persisted.id(),
            product_id = %product_id,
            total = %persisted.total_value(),
            "sale item cancelled"
        );
        self.publish(SaleEvent::item_cancelled(&persisted, cancelled))
            .await;
        self.publish(SaleEvent::sale_modified(&persisted)).await;
        Ok(persisted)
    }

    /// Deletes a cart through the cart path, honoring deletion
    /// eligibility.
    #[tracing::instrument(skip(self))]
    pub async fn delete_cart(&self, cart_id: CartId) -> Result<(), OrderFlowError> {
        let cart = self
            .carts
            .get(cart_id)
            .await?
            .ok_or(OrderFlowError::CartNotFound(cart_id))?;

        if !cart.can_be_deleted() {
            return Err(OrderFlowError::Cart(CartError::InvalidStateTransition {
                current_status: cart.status(),
                action: "delete",
            }));
        }

        self.carts.delete(cart_id).await?;
        tracing::info!(cart_id = %cart_id, "cart deleted");
        Ok(())
    }

    /// Loads a cart, hiding carts whose status makes them non-retrievable.
    pub async fn get_cart(&self, cart_id: CartId) -> Result<Option<Cart>, OrderFlowError> {
        Ok(self
            .carts
            .get(cart_id)
            .await?
            .filter(|cart| cart.status().can_be_retrieved()))
    }

    /// Loads a sale.
    pub async fn get_sale(&self, sale_id: SaleId) -> Result<Option<Sale>, OrderFlowError> {
        Ok(self.sales.get(sale_id).await?)
    }

    fn build_sale_from_cart(&self, cart: &Cart) -> Result<Sale, OrderFlowError> {
        let sale_id = SaleId::new();
        let sale_date = Utc::now();

        let mut items = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            items.push(SaleItem::new(
                sale_id,
                line.product_id.clone(),
                line.product_name.clone(),
                line.quantity,
                line.unit_price,
                &self.policy,
            )?);
        }

        Ok(Sale::new(
            sale_id,
            next_sale_number(sale_date),
            cart.customer_id(),
            cart.customer_name(),
            sale_date,
            self.branch.clone(),
            items,
        ))
    }

    async fn price_lines(
        &self,
        sale_id: SaleId,
        lines: &[SaleLine],
    ) -> Result<Vec<SaleItem>, OrderFlowError> {
        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id.clone()).collect();
        let products = self.catalog.get_by_ids(&ids).await?;

        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| OrderFlowError::ProductNotFound(line.product_id.clone()))?;
            resolved.push((line.quantity, product));
        }

        let priced: Vec<(u32, Money)> = resolved.iter().map(|(q, p)| (*q, p.price)).collect();
        self.policy.validate_for_checkout(&priced)?;

        let mut items = Vec::with_capacity(resolved.len());
        for (quantity, product) in resolved {
            items.push(SaleItem::new(
                sale_id,
                product.id.clone(),
                product.title.clone(),
                quantity,
                product.price,
                &self.policy,
            )?);
        }
        Ok(items)
    }

    async fn void_sale(&self, mut sale: Sale) {
        metrics::counter!("checkout_compensations_total").increment(1);
        if sale.cancel().is_ok()
            && let Err(err) = self.sales.update(sale).await
        {
            tracing::error!(error = %err, "failed to void sale after cart retirement failure");
            metrics::counter!("checkout_compensation_failures_total").increment(1);
        }
    }

    async fn publish(&self, event: SaleEvent) {
        let event_type = event.event_type();
        let sale_id = event.sale_id();
        match self.bus.publish(event).await {
            Ok(()) => {
                metrics::counter!("sale_events_published_total").increment(1);
            }
            Err(err) => {
                tracing::warn!(
                    event = event_type,
                    sale_id = %sale_id,
                    error = %err,
                    "failed to publish sale event"
                );
                metrics::counter!("sale_events_publish_failures_total").increment(1);
            }
        }
    }
}

fn next_sale_number(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "S-{}-{}",
        at.format("%Y%m%d"),
        suffix[..8].to_ascii_uppercase()
    )
}
