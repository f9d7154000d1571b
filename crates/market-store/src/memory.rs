use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use common::{DealId, OrderId, Pincode, RatingId, SupplierId, VendorId};

use crate::{
    Deal, NewDeal, NewRating, Order, OrderDraft, OrderFilter, OrderStatus, Rating, Result,
    StoreError,
    order::OrderLine,
    store::MarketStore,
};

#[derive(Default)]
struct Inner {
    deals: HashMap<DealId, Deal>,
    orders: HashMap<OrderId, Order>,
    ratings: HashMap<(OrderId, VendorId), Rating>,
}

/// In-memory market store implementation for testing.
///
/// All state lives behind one `RwLock`, so each operation is atomic en
/// bloc: the completion transition's status change and stock decrements
/// happen under a single write guard, which is what gives this adapter
/// the same all-or-nothing and serialized-decrement guarantees as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryMarketStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryMarketStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of deals stored.
    pub async fn deal_count(&self) -> usize {
        self.inner.read().await.deals.len()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all deals, orders, and ratings.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.deals.clear();
        inner.orders.clear();
        inner.ratings.clear();
    }
}

fn newest_first_deals(mut deals: Vec<Deal>) -> Vec<Deal> {
    deals.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(a.id.as_uuid().cmp(&b.id.as_uuid()))
    });
    deals
}

fn newest_first_orders(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(a.id.as_uuid().cmp(&b.id.as_uuid()))
    });
    orders
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn list_active_deals(&self, scope: &Pincode) -> Result<Vec<Deal>> {
        let inner = self.inner.read().await;
        let deals: Vec<_> = inner
            .deals
            .values()
            .filter(|deal| deal.is_active && deal.targets(scope))
            .cloned()
            .collect();
        Ok(newest_first_deals(deals))
    }

    async fn get_deal(&self, deal_id: DealId) -> Result<Option<Deal>> {
        let inner = self.inner.read().await;
        Ok(inner.deals.get(&deal_id).cloned())
    }

    async fn list_deals_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Deal>> {
        let inner = self.inner.read().await;
        let deals: Vec<_> = inner
            .deals
            .values()
            .filter(|deal| deal.supplier_id == supplier_id)
            .cloned()
            .collect();
        Ok(newest_first_deals(deals))
    }

    async fn create_deal(&self, draft: NewDeal) -> Result<Deal> {
        let deal = draft.into_deal(DealId::new(), Utc::now())?;
        let mut inner = self.inner.write().await;
        inner.deals.insert(deal.id, deal.clone());
        Ok(deal)
    }

    async fn update_deal(&self, deal_id: DealId, draft: NewDeal) -> Result<Deal> {
        draft.validate()?;

        let mut inner = self.inner.write().await;
        let deal = inner
            .deals
            .get_mut(&deal_id)
            .ok_or(StoreError::DealNotFound(deal_id))?;

        if draft.supplier_id != deal.supplier_id {
            return Err(StoreError::SupplierMismatch {
                deal_id,
                expected: draft.supplier_id,
                actual: deal.supplier_id,
            });
        }

        deal.item_name = draft.item_name;
        deal.item_description = draft.item_description;
        deal.price_per_unit = draft.price_per_unit;
        deal.unit = draft.unit;
        deal.min_order_quantity = draft.min_order_quantity;
        deal.stock_quantity = draft.stock_quantity;
        deal.target_pincodes = draft.target_pincodes;

        Ok(deal.clone())
    }

    async fn set_deal_active(&self, deal_id: DealId, active: bool) -> Result<Deal> {
        let mut inner = self.inner.write().await;
        let deal = inner
            .deals
            .get_mut(&deal_id)
            .ok_or(StoreError::DealNotFound(deal_id))?;
        deal.is_active = active;
        Ok(deal.clone())
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        if draft.is_empty() {
            return Err(StoreError::EmptyDraft);
        }

        let mut inner = self.inner.write().await;

        // Price every line before touching anything, so a rejected line
        // leaves no partial order behind.
        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            if line.quantity == 0 {
                return Err(StoreError::InvalidQuantity {
                    deal_id: line.deal_id,
                    quantity: line.quantity,
                });
            }

            let deal = inner
                .deals
                .get(&line.deal_id)
                .ok_or(StoreError::DealNotFound(line.deal_id))?;

            if deal.supplier_id != draft.supplier_id {
                return Err(StoreError::SupplierMismatch {
                    deal_id: line.deal_id,
                    expected: draft.supplier_id,
                    actual: deal.supplier_id,
                });
            }

            lines.push(OrderLine {
                deal_id: line.deal_id,
                item_name: deal.item_name.clone(),
                unit: deal.unit.clone(),
                quantity: line.quantity,
                unit_price: deal.price_per_unit,
                requested_by: line.requested_by,
            });
        }

        let total_value = lines.iter().map(OrderLine::line_total).sum();
        let order = Order {
            id: OrderId::new(),
            origin: draft.origin,
            supplier_id: draft.supplier_id,
            status: OrderStatus::Pending,
            total_value,
            created_at: Utc::now(),
            lines,
        };

        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&order_id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let orders: Vec<_> = inner
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();

        let mut orders = newest_first_orders(orders);
        if let Some(limit) = filter.limit {
            orders.truncate(limit);
        }
        Ok(orders)
    }

    async fn transition_order(&self, order_id: OrderId, new_status: OrderStatus) -> Result<Order> {
        let mut inner = self.inner.write().await;

        let (current, decrements) = {
            let order = inner
                .orders
                .get(&order_id)
                .ok_or(StoreError::OrderNotFound(order_id))?;
            let decrements: Vec<(DealId, u32)> = order
                .lines
                .iter()
                .map(|line| (line.deal_id, line.quantity))
                .collect();
            (order.status, decrements)
        };

        if !current.can_transition_to(new_status) {
            return Err(StoreError::IllegalTransition {
                order_id,
                from: current,
                to: new_status,
            });
        }

        if new_status == OrderStatus::Completed {
            // The status guard above means this runs at most once per
            // order. Decrements floor at zero; untracked stock stays
            // untracked.
            for (deal_id, quantity) in decrements {
                if let Some(deal) = inner.deals.get_mut(&deal_id)
                    && let Some(stock) = deal.stock_quantity
                {
                    deal.stock_quantity = Some(stock.saturating_sub(quantity));
                }
            }
        }

        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        order.status = new_status;
        Ok(order.clone())
    }

    async fn upsert_rating(&self, submission: NewRating) -> Result<Rating> {
        let mut inner = self.inner.write().await;

        let supplier_id = inner
            .orders
            .get(&submission.order_id)
            .ok_or(StoreError::OrderNotFound(submission.order_id))?
            .supplier_id;

        let now = Utc::now();
        let key = (submission.order_id, submission.vendor_id);
        let rating = match inner.ratings.get_mut(&key) {
            Some(existing) => {
                existing.score = submission.score;
                existing.review_text = submission.review_text;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let rating = Rating {
                    id: RatingId::new(),
                    order_id: submission.order_id,
                    supplier_id,
                    vendor_id: submission.vendor_id,
                    score: submission.score,
                    review_text: submission.review_text,
                    created_at: now,
                    updated_at: now,
                };
                inner.ratings.insert(key, rating.clone());
                rating
            }
        };

        Ok(rating)
    }

    async fn list_ratings_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Rating>> {
        let inner = self.inner.read().await;
        let mut ratings: Vec<_> = inner
            .ratings
            .values()
            .filter(|rating| rating.supplier_id == supplier_id)
            .cloned()
            .collect();
        ratings.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(a.id.as_uuid().cmp(&b.id.as_uuid()))
        });
        Ok(ratings)
    }
}
