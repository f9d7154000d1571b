//! Group spending view: what a buying group spent and saved.

use common::{GroupId, Money};
use market_store::{MarketStore, Order, OrderFilter, OrderStatus, StoreError};
use serde::Serialize;

/// Estimated saving from pooled buying, as a percentage of spend.
const SAVINGS_RATE_PERCENT: i64 = 10;

/// A buying group's completed spend and estimated savings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSpending {
    pub group_id: GroupId,
    pub completed_orders: u64,
    pub total_spent: Money,
    /// Flat-rate estimate against solo buying at list prices.
    pub estimated_savings: Money,
}

impl GroupSpending {
    /// Builds the summary from the group's completed orders.
    ///
    /// Orders from other groups, individual orders, and non-completed
    /// orders are ignored.
    pub fn build(group_id: GroupId, orders: &[Order]) -> Self {
        let completed: Vec<&Order> = orders
            .iter()
            .filter(|o| o.origin.group_id() == Some(group_id) && o.status == OrderStatus::Completed)
            .collect();

        let total_spent: Money = completed.iter().map(|o| o.total_value).sum();
        let estimated_savings = Money::from_paise(total_spent.paise() * SAVINGS_RATE_PERCENT / 100);

        Self {
            group_id,
            completed_orders: completed.len() as u64,
            total_spent,
            estimated_savings,
        }
    }

    /// Fetches the group's completed orders and builds the summary.
    #[tracing::instrument(skip(store))]
    pub async fn load<S: MarketStore>(store: &S, group_id: GroupId) -> Result<Self, StoreError> {
        let orders = store
            .list_orders(OrderFilter::for_group(group_id).status(OrderStatus::Completed))
            .await?;
        Ok(Self::build(group_id, &orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{DealId, OrderId, SupplierId, VendorId};
    use market_store::{OrderLine, OrderOrigin};

    fn order(origin: OrderOrigin, status: OrderStatus, total_paise: i64) -> Order {
        Order {
            id: OrderId::new(),
            origin,
            supplier_id: SupplierId::new(),
            status,
            total_value: Money::from_paise(total_paise),
            created_at: Utc::now(),
            lines: vec![OrderLine {
                deal_id: DealId::new(),
                item_name: "Onions".to_string(),
                unit: "kg".to_string(),
                quantity: 1,
                unit_price: Money::from_paise(total_paise),
                requested_by: VendorId::new(),
            }],
        }
    }

    #[test]
    fn spend_sums_completed_group_orders_only() {
        let group = GroupId::new();
        let orders = vec![
            order(OrderOrigin::group(group), OrderStatus::Completed, 40_000),
            order(OrderOrigin::group(group), OrderStatus::Completed, 10_000),
            order(OrderOrigin::group(group), OrderStatus::Pending, 99_000),
            order(OrderOrigin::group(GroupId::new()), OrderStatus::Completed, 7_000),
            order(
                OrderOrigin::individual(VendorId::new()),
                OrderStatus::Completed,
                5_000,
            ),
        ];

        let spending = GroupSpending::build(group, &orders);
        assert_eq!(spending.completed_orders, 2);
        assert_eq!(spending.total_spent, Money::from_paise(50_000));
        assert_eq!(spending.estimated_savings, Money::from_paise(5_000));
    }

    #[test]
    fn empty_group_reports_zero() {
        let spending = GroupSpending::build(GroupId::new(), &[]);
        assert_eq!(spending.completed_orders, 0);
        assert_eq!(spending.total_spent, Money::zero());
        assert_eq!(spending.estimated_savings, Money::zero());
    }
}
