use async_trait::async_trait;

use common::{DealId, OrderId, Pincode, SupplierId};

use crate::deal::{Deal, NewDeal};
use crate::error::{Result, StoreError};
use crate::filter::OrderFilter;
use crate::order::{Order, OrderDraft, OrderStatus};
use crate::rating::{NewRating, Rating};

/// Core trait for marketplace storage implementations.
///
/// The store is the authority for prices and totals: order drafts carry
/// quantities only, and every adapter prices them against its own deal
/// rows at commit time. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Lists active deals visible in a pincode scope, newest first.
    async fn list_active_deals(&self, scope: &Pincode) -> Result<Vec<Deal>>;

    /// Retrieves a single deal.
    ///
    /// Returns None if the deal doesn't exist. Inactive deals are
    /// returned; visibility filtering belongs to catalog reads.
    async fn get_deal(&self, deal_id: DealId) -> Result<Option<Deal>>;

    /// Lists all of a supplier's deals (active and inactive), newest first.
    async fn list_deals_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Deal>>;

    /// Validates a draft and persists it as a new active deal.
    async fn create_deal(&self, draft: NewDeal) -> Result<Deal>;

    /// Replaces a deal's editable fields from a validated draft.
    ///
    /// The draft's supplier must match the deal's owner; the active
    /// flag and creation timestamp are untouched.
    async fn update_deal(&self, deal_id: DealId, draft: NewDeal) -> Result<Deal>;

    /// Activates or deactivates a deal.
    async fn set_deal_active(&self, deal_id: DealId, active: bool) -> Result<Deal>;

    /// Commits an order draft atomically - the whole line set is priced
    /// and persisted, or nothing is.
    ///
    /// The adapter snapshots each deal's name, unit, and unit price into
    /// the lines and computes the total from those prices. Empty drafts,
    /// zero quantities, unknown deals, and deals owned by a supplier
    /// other than the draft's are rejected.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order>;

    /// Retrieves a single order with its lines.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists orders matching a filter, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Moves an order to a new status, enforcing the state machine.
    ///
    /// Transitioning to `completed` also decrements each line's deal
    /// stock by the line quantity, floored at zero, in the same atomic
    /// unit as the status change. Untracked stock is left alone. An
    /// illegal move (including completing an already-completed order)
    /// fails with [`StoreError::IllegalTransition`] and changes nothing.
    async fn transition_order(&self, order_id: OrderId, new_status: OrderStatus) -> Result<Order>;

    /// Inserts or replaces the rating keyed by (order, vendor).
    ///
    /// The supplier is derived from the order. Replacement keeps the
    /// original `created_at` and bumps `updated_at`.
    async fn upsert_rating(&self, submission: NewRating) -> Result<Rating>;

    /// Lists ratings received by a supplier, newest first.
    async fn list_ratings_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Rating>>;
}

/// Extension trait providing convenience methods for market stores.
#[async_trait]
pub trait MarketStoreExt: MarketStore {
    /// Retrieves a deal or fails with [`StoreError::DealNotFound`].
    async fn require_deal(&self, deal_id: DealId) -> Result<Deal> {
        self.get_deal(deal_id)
            .await?
            .ok_or(StoreError::DealNotFound(deal_id))
    }

    /// Retrieves an order or fails with [`StoreError::OrderNotFound`].
    async fn require_order(&self, order_id: OrderId) -> Result<Order> {
        self.get_order(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound(order_id))
    }
}

// Blanket implementation for all MarketStore implementations
impl<T: MarketStore + ?Sized> MarketStoreExt for T {}
