//! Immutable snapshot of the active deals visible to a buyer.

use std::collections::BTreeMap;

use common::{DealId, Pincode};
use market_store::{Deal, MarketStore, StoreError};

/// The active deals a cart resolves against.
///
/// A catalog is a point-in-time read: building one never holds locks,
/// and resolution against it only ever yields active deals. Cart lines
/// that fail to resolve are stale and get dropped, never errored on.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    deals: BTreeMap<DealId, Deal>,
}

impl Catalog {
    /// Builds a catalog from a list of deals, keeping only active ones.
    pub fn from_deals(deals: Vec<Deal>) -> Self {
        let deals = deals
            .into_iter()
            .filter(|deal| deal.is_active)
            .map(|deal| (deal.id, deal))
            .collect();
        Self { deals }
    }

    /// Loads the catalog for a pincode scope from the store.
    pub async fn load<S: MarketStore>(store: &S, scope: &Pincode) -> Result<Self, StoreError> {
        let deals = store.list_active_deals(scope).await?;
        Ok(Self::from_deals(deals))
    }

    /// Resolves a deal id to its active deal, if still offered.
    pub fn resolve(&self, deal_id: DealId) -> Option<&Deal> {
        self.deals.get(&deal_id)
    }

    /// Returns the deals in the catalog, ordered by id.
    pub fn deals(&self) -> impl Iterator<Item = &Deal> {
        self.deals.values()
    }

    /// Returns the number of deals in the catalog.
    pub fn len(&self) -> usize {
        self.deals.len()
    }

    /// Returns true if the catalog has no deals.
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}
