//! The vendor's landing view: live deals plus their own orders.

use common::{Pincode, VendorId};
use market_store::{Deal, MarketStore, Order, OrderFilter, StoreError};
use serde::Serialize;

use crate::catalog::Catalog;

/// Everything a vendor sees when they open the marketplace.
#[derive(Debug, Clone, Serialize)]
pub struct Storefront {
    /// Deals live in the vendor's pincode, newest first.
    pub deals: Vec<Deal>,
    /// Orders the vendor placed or contributed lines to, newest first.
    pub orders: Vec<Order>,
}

impl Storefront {
    /// Builds a catalog from the storefront's deals for cart resolution.
    pub fn catalog(&self) -> Catalog {
        Catalog::from_deals(self.deals.clone())
    }
}

/// Loads a vendor's storefront, fetching deals and orders concurrently.
#[tracing::instrument(skip(store), fields(scope = %scope))]
pub async fn load_storefront<S: MarketStore>(
    store: &S,
    scope: &Pincode,
    vendor_id: VendorId,
) -> Result<Storefront, StoreError> {
    let (deals, orders) = tokio::try_join!(
        store.list_active_deals(scope),
        store.list_orders(OrderFilter::for_vendor(vendor_id)),
    )?;
    Ok(Storefront { deals, orders })
}
