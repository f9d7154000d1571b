//! Repeating a past order by merging its lines back into the cart.

use common::{OrderId, Pincode};
use market_store::{MarketStore, MarketStoreExt, Order, StoreError};

use crate::cart::Cart;
use crate::catalog::Catalog;

/// What happened when a past order was merged into the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatOutcome {
    /// At least one line was still orderable and was added.
    Added { added: usize, skipped: usize },
    /// No line of the order is orderable any more; the cart is untouched.
    NothingAvailable,
}

/// Merges an order's lines into the cart at their original quantities.
///
/// Lines whose deal is missing from the catalog are skipped. Quantities
/// add onto whatever the cart already holds for the same deal.
pub fn merge_order_into_cart(cart: &mut Cart, order: &Order, catalog: &Catalog) -> RepeatOutcome {
    let (available, skipped): (Vec<_>, Vec<_>) = order
        .lines
        .iter()
        .partition(|line| catalog.resolve(line.deal_id).is_some());

    if available.is_empty() {
        return RepeatOutcome::NothingAvailable;
    }

    for line in &available {
        cart.add_quantity(line.deal_id, line.quantity);
    }
    RepeatOutcome::Added {
        added: available.len(),
        skipped: skipped.len(),
    }
}

/// Rebuilds carts from past orders against the live catalog.
pub struct ReorderService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> ReorderService<S> {
    /// Creates a reorder service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Merges a past order into the cart, skipping lines no longer
    /// orderable in the given pincode scope.
    #[tracing::instrument(skip(self, cart), fields(scope = %scope))]
    pub async fn repeat_order(
        &self,
        cart: &mut Cart,
        order_id: OrderId,
        scope: &Pincode,
    ) -> Result<RepeatOutcome, StoreError> {
        let order = self.store.require_order(order_id).await?;
        let catalog = Catalog::load(&self.store, scope).await?;

        let outcome = merge_order_into_cart(cart, &order, &catalog);
        match outcome {
            RepeatOutcome::Added { added, skipped } => {
                tracing::info!(%order_id, added, skipped, "order repeated into cart");
            }
            RepeatOutcome::NothingAvailable => {
                tracing::info!(%order_id, "no line of the order is orderable any more");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{GroupId, Money, SupplierId, VendorId};
    use market_store::{DraftLine, InMemoryMarketStore, NewDeal, OrderDraft, OrderOrigin};
    use std::collections::BTreeSet;

    fn scope() -> Pincode {
        Pincode::new("110001")
    }

    async fn seed_deal(store: &InMemoryMarketStore, supplier: SupplierId, name: &str) -> common::DealId {
        store
            .create_deal(NewDeal {
                supplier_id: supplier,
                item_name: name.to_string(),
                item_description: String::new(),
                price_per_unit: Money::from_paise(1500),
                unit: "kg".to_string(),
                min_order_quantity: 1,
                stock_quantity: None,
                target_pincodes: BTreeSet::from([scope()]),
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_order(
        store: &InMemoryMarketStore,
        supplier: SupplierId,
        lines: Vec<(common::DealId, u32)>,
    ) -> Order {
        let vendor = VendorId::new();
        store
            .create_order(OrderDraft {
                origin: OrderOrigin::group(GroupId::new()),
                supplier_id: supplier,
                lines: lines
                    .into_iter()
                    .map(|(deal_id, quantity)| DraftLine {
                        deal_id,
                        quantity,
                        requested_by: vendor,
                    })
                    .collect(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn repeat_adds_original_quantities() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let onions = seed_deal(&store, supplier, "Onions").await;
        let okra = seed_deal(&store, supplier, "Okra").await;
        let order = seed_order(&store, supplier, vec![(onions, 5), (okra, 2)]).await;

        let service = ReorderService::new(store);
        let mut cart = Cart::new();
        cart.add_quantity(onions, 3);

        let outcome = service
            .repeat_order(&mut cart, order.id, &scope())
            .await
            .unwrap();
        assert_eq!(outcome, RepeatOutcome::Added { added: 2, skipped: 0 });
        assert_eq!(cart.quantity_of(onions), 8);
        assert_eq!(cart.quantity_of(okra), 2);
    }

    #[tokio::test]
    async fn repeating_twice_doubles_quantities() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let onions = seed_deal(&store, supplier, "Onions").await;
        let order = seed_order(&store, supplier, vec![(onions, 5)]).await;

        let service = ReorderService::new(store);
        let mut cart = Cart::new();
        service
            .repeat_order(&mut cart, order.id, &scope())
            .await
            .unwrap();
        service
            .repeat_order(&mut cart, order.id, &scope())
            .await
            .unwrap();

        assert_eq!(cart.quantity_of(onions), 10);
    }

    #[tokio::test]
    async fn retired_lines_are_skipped() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let onions = seed_deal(&store, supplier, "Onions").await;
        let okra = seed_deal(&store, supplier, "Okra").await;
        let order = seed_order(&store, supplier, vec![(onions, 5), (okra, 2)]).await;
        store.set_deal_active(okra, false).await.unwrap();

        let service = ReorderService::new(store);
        let mut cart = Cart::new();
        let outcome = service
            .repeat_order(&mut cart, order.id, &scope())
            .await
            .unwrap();

        assert_eq!(outcome, RepeatOutcome::Added { added: 1, skipped: 1 });
        assert_eq!(cart.quantity_of(onions), 5);
        assert_eq!(cart.quantity_of(okra), 0);
    }

    #[tokio::test]
    async fn fully_stale_order_leaves_cart_untouched() {
        let store = InMemoryMarketStore::new();
        let supplier = SupplierId::new();
        let onions = seed_deal(&store, supplier, "Onions").await;
        let order = seed_order(&store, supplier, vec![(onions, 5)]).await;
        store.set_deal_active(onions, false).await.unwrap();

        let service = ReorderService::new(store);
        let mut cart = Cart::new();
        cart.add_quantity(onions, 1);
        let before = cart.clone();

        let outcome = service
            .repeat_order(&mut cart, order.id, &scope())
            .await
            .unwrap();
        assert_eq!(outcome, RepeatOutcome::NothingAvailable);
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn unknown_order_is_reported() {
        let store = InMemoryMarketStore::new();
        let service = ReorderService::new(store);
        let mut cart = Cart::new();

        let err = service
            .repeat_order(&mut cart, OrderId::new(), &scope())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OrderNotFound(_)));
    }
}
