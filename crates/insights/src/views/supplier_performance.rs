//! Supplier performance view: revenue, volumes, and ratings.

use std::collections::BTreeMap;

use common::{DealId, Money, SupplierId};
use market_store::{MarketStore, Order, OrderFilter, OrderStatus, Rating, StoreError};
use serde::Serialize;

/// Number of top deals reported per supplier.
const TOP_DEALS: usize = 5;

/// Revenue attributed to one deal across completed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealRevenue {
    pub deal_id: DealId,
    /// Item name as snapshotted on the order lines.
    pub item_name: String,
    pub units_sold: u64,
    pub revenue: Money,
}

/// A supplier's trading record over completed orders.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierPerformance {
    pub supplier_id: SupplierId,
    pub completed_orders: u64,
    pub revenue: Money,
    pub average_order_value: Money,
    /// Mean received score, absent until the first rating lands.
    pub average_rating: Option<f64>,
    /// Best-earning deals, highest revenue first.
    pub top_deals: Vec<DealRevenue>,
}

impl SupplierPerformance {
    /// Builds the summary from the supplier's orders and ratings.
    ///
    /// Orders for other suppliers or in non-completed states are
    /// ignored, so callers may pass unfiltered slices.
    pub fn build(supplier_id: SupplierId, orders: &[Order], ratings: &[Rating]) -> Self {
        let completed: Vec<&Order> = orders
            .iter()
            .filter(|o| o.supplier_id == supplier_id && o.status == OrderStatus::Completed)
            .collect();

        let revenue: Money = completed.iter().map(|o| o.total_value).sum();
        let average_order_value = if completed.is_empty() {
            Money::zero()
        } else {
            Money::from_paise(revenue.paise() / completed.len() as i64)
        };

        // (units, revenue, snapshot name) per deal.
        let mut by_deal: BTreeMap<DealId, (u64, Money, String)> = BTreeMap::new();
        for order in &completed {
            for line in &order.lines {
                let entry = by_deal
                    .entry(line.deal_id)
                    .or_insert_with(|| (0, Money::zero(), line.item_name.clone()));
                entry.0 += u64::from(line.quantity);
                entry.1 += line.unit_price.multiply(line.quantity);
            }
        }
        let mut top_deals: Vec<DealRevenue> = by_deal
            .into_iter()
            .map(|(deal_id, (units_sold, revenue, item_name))| DealRevenue {
                deal_id,
                item_name,
                units_sold,
                revenue,
            })
            .collect();
        top_deals.sort_by(|a, b| b.revenue.paise().cmp(&a.revenue.paise()));
        top_deals.truncate(TOP_DEALS);

        let scores: Vec<u8> = ratings
            .iter()
            .filter(|r| r.supplier_id == supplier_id)
            .map(|r| r.score.value())
            .collect();
        let average_rating = if scores.is_empty() {
            None
        } else {
            let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
            Some(f64::from(sum) / scores.len() as f64)
        };

        Self {
            supplier_id,
            completed_orders: completed.len() as u64,
            revenue,
            average_order_value,
            average_rating,
            top_deals,
        }
    }

    /// Fetches the supplier's completed orders and ratings, then builds
    /// the summary.
    #[tracing::instrument(skip(store))]
    pub async fn load<S: MarketStore>(
        store: &S,
        supplier_id: SupplierId,
    ) -> Result<Self, StoreError> {
        let (orders, ratings) = tokio::try_join!(
            store.list_orders(
                OrderFilter::for_supplier(supplier_id).status(OrderStatus::Completed)
            ),
            store.list_ratings_for_supplier(supplier_id),
        )?;
        Ok(Self::build(supplier_id, &orders, &ratings))
    }
}
