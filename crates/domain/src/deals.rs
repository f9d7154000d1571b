//! Supplier-side deal management.

use common::{DealId, SupplierId};
use market_store::{Deal, MarketStore, MarketStoreExt, NewDeal, StoreError};
use thiserror::Error;

/// Failures while managing a supplier's deals.
#[derive(Debug, Error)]
pub enum DealError {
    /// The acting supplier does not own the deal.
    #[error("supplier {supplier_id} does not own deal {deal_id}")]
    NotDealOwner {
        deal_id: DealId,
        supplier_id: SupplierId,
    },

    #[error("market store error: {0}")]
    Store(#[from] StoreError),
}

/// Lets suppliers publish, edit, and retire their deals.
///
/// Every mutation is owner-checked here before it reaches the store,
/// which checks again when it applies the change.
pub struct DealService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> DealService<S> {
    /// Creates a deal service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Publishes a new deal; it is live immediately.
    #[tracing::instrument(skip(self, draft), fields(supplier_id = %draft.supplier_id))]
    pub async fn publish(&self, draft: NewDeal) -> Result<Deal, DealError> {
        let deal = self.store.create_deal(draft).await?;
        tracing::info!(deal_id = %deal.id, item = %deal.item_name, "deal published");
        Ok(deal)
    }

    /// Replaces a deal's listing fields with a fresh draft.
    #[tracing::instrument(skip(self, draft))]
    pub async fn edit(
        &self,
        supplier_id: SupplierId,
        deal_id: DealId,
        draft: NewDeal,
    ) -> Result<Deal, DealError> {
        self.authorize(supplier_id, deal_id).await?;
        Ok(self.store.update_deal(deal_id, draft).await?)
    }

    /// Activates or deactivates a deal without touching its listing.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(
        &self,
        supplier_id: SupplierId,
        deal_id: DealId,
        active: bool,
    ) -> Result<Deal, DealError> {
        self.authorize(supplier_id, deal_id).await?;
        let deal = self.store.set_deal_active(deal_id, active).await?;
        tracing::info!(%deal_id, active, "deal visibility changed");
        Ok(deal)
    }

    /// Lists all of the supplier's deals, active and inactive.
    pub async fn my_deals(&self, supplier_id: SupplierId) -> Result<Vec<Deal>, DealError> {
        Ok(self.store.list_deals_for_supplier(supplier_id).await?)
    }

    /// Lists the supplier's deals whose tracked stock has run low.
    pub async fn low_stock_deals(&self, supplier_id: SupplierId) -> Result<Vec<Deal>, DealError> {
        let mut deals = self.store.list_deals_for_supplier(supplier_id).await?;
        deals.retain(Deal::is_low_stock);
        Ok(deals)
    }

    async fn authorize(&self, supplier_id: SupplierId, deal_id: DealId) -> Result<(), DealError> {
        let deal = self.store.require_deal(deal_id).await?;
        if deal.supplier_id != supplier_id {
            return Err(DealError::NotDealOwner {
                deal_id,
                supplier_id,
            });
        }
        Ok(())
    }
}
