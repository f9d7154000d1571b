//! Supplier-side order lifecycle transitions.

use common::{OrderId, SupplierId};
use market_store::{MarketStore, MarketStoreExt, Order, OrderStatus, StoreError};
use thiserror::Error;

/// Failures while driving an order through its lifecycle.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The acting supplier is not the one the order was placed with.
    #[error("supplier {supplier_id} does not fulfil order {order_id}")]
    NotFulfillingSupplier {
        order_id: OrderId,
        supplier_id: SupplierId,
    },

    #[error("market store error: {0}")]
    Store(#[from] StoreError),
}

/// Drives orders through `pending -> accepted -> completed` (or
/// `pending -> denied`) on behalf of the fulfilling supplier.
///
/// The legality of each move lives in [`OrderStatus`] and is enforced
/// by the store; this service adds the authorization check on top.
/// Completion's stock decrement happens inside the store's transition,
/// atomically with the status flip, and therefore at most once per
/// order no matter how often completion is attempted.
pub struct FulfillmentService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> FulfillmentService<S> {
    /// Creates a fulfilment service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Accepts a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn accept(
        &self,
        order_id: OrderId,
        supplier_id: SupplierId,
    ) -> Result<Order, FulfillmentError> {
        self.transition(order_id, supplier_id, OrderStatus::Accepted)
            .await
    }

    /// Denies a pending order. Denial is terminal and never touches stock.
    #[tracing::instrument(skip(self))]
    pub async fn deny(
        &self,
        order_id: OrderId,
        supplier_id: SupplierId,
    ) -> Result<Order, FulfillmentError> {
        self.transition(order_id, supplier_id, OrderStatus::Denied)
            .await
    }

    /// Completes an accepted order, decrementing tracked stock.
    #[tracing::instrument(skip(self))]
    pub async fn complete(
        &self,
        order_id: OrderId,
        supplier_id: SupplierId,
    ) -> Result<Order, FulfillmentError> {
        let order = self
            .transition(order_id, supplier_id, OrderStatus::Completed)
            .await?;

        for line in &order.lines {
            if let Some(deal) = self.store.get_deal(line.deal_id).await?
                && deal.is_low_stock()
            {
                tracing::warn!(
                    deal = %deal.id,
                    item = %deal.item_name,
                    stock = deal.stock_quantity.unwrap_or(0),
                    "deal stock is running low"
                );
            }
        }

        Ok(order)
    }

    async fn transition(
        &self,
        order_id: OrderId,
        supplier_id: SupplierId,
        new_status: OrderStatus,
    ) -> Result<Order, FulfillmentError> {
        let order = self.store.require_order(order_id).await?;
        if order.supplier_id != supplier_id {
            return Err(FulfillmentError::NotFulfillingSupplier {
                order_id,
                supplier_id,
            });
        }

        let order = self.store.transition_order(order_id, new_status).await?;
        metrics::counter!("order_transitions_total").increment(1);
        tracing::info!(%order_id, status = %order.status, "order transitioned");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{GroupId, Money, Pincode, VendorId};
    use market_store::{DraftLine, InMemoryMarketStore, NewDeal, OrderDraft, OrderOrigin};
    use std::collections::BTreeSet;

    async fn seed_order(
        store: &InMemoryMarketStore,
        supplier: SupplierId,
        stock: Option<u32>,
        quantity: u32,
    ) -> Order {
        let deal = store
            .create_deal(NewDeal {
                supplier_id: supplier,
                item_name: "Onions".to_string(),
                item_description: String::new(),
                price_per_unit: Money::from_paise(2500),
                unit: "kg".to_string(),
                min_order_quantity: 1,
                stock_quantity: stock,
                target_pincodes: BTreeSet::from([Pincode::new("110001")]),
            })
            .await
            .unwrap();

        store
            .create_order(OrderDraft {
                origin: OrderOrigin::group(GroupId::new()),
                supplier_id: supplier,
                lines: vec![DraftLine {
                    deal_id: deal.id,
                    quantity,
                    requested_by: VendorId::new(),
                }],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn supplier_accepts_then_completes() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let order = seed_order(&store, supplier, Some(20), 6).await;

        let service = FulfillmentService::new(store.clone());
        let accepted = service.accept(order.id, supplier).await.unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);

        let completed = service.complete(order.id, supplier).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let deal_id = order.lines[0].deal_id;
        let deal = store.get_deal(deal_id).await.unwrap().unwrap();
        assert_eq!(deal.stock_quantity, Some(14));
    }

    #[tokio::test]
    async fn foreign_supplier_is_rejected() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let order = seed_order(&store, supplier, None, 2).await;

        let service = FulfillmentService::new(store.clone());
        let err = service.accept(order.id, SupplierId::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::NotFulfillingSupplier { .. }
        ));

        // The order is untouched.
        let reloaded = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn denial_is_terminal() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let order = seed_order(&store, supplier, Some(10), 3).await;

        let service = FulfillmentService::new(store.clone());
        let denied = service.deny(order.id, supplier).await.unwrap();
        assert_eq!(denied.status, OrderStatus::Denied);

        let err = service.accept(order.id, supplier).await.unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Store(StoreError::IllegalTransition { .. })
        ));

        let deal = store.get_deal(order.lines[0].deal_id).await.unwrap().unwrap();
        assert_eq!(deal.stock_quantity, Some(10));
    }

    #[tokio::test]
    async fn completing_twice_fails_and_decrements_once() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let order = seed_order(&store, supplier, Some(10), 4).await;

        let service = FulfillmentService::new(store.clone());
        service.accept(order.id, supplier).await.unwrap();
        service.complete(order.id, supplier).await.unwrap();

        let err = service.complete(order.id, supplier).await.unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Store(StoreError::IllegalTransition {
                from: OrderStatus::Completed,
                ..
            })
        ));

        let deal = store.get_deal(order.lines[0].deal_id).await.unwrap().unwrap();
        assert_eq!(deal.stock_quantity, Some(6));
    }

    #[tokio::test]
    async fn unknown_order_is_reported() {
        let store = InMemoryMarketStore::new();
        let service = FulfillmentService::new(store);

        let err = service
            .accept(OrderId::new(), SupplierId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Store(StoreError::OrderNotFound(_))
        ));
    }
}
