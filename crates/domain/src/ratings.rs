//! Vendor ratings on completed orders.

use common::{OrderId, SupplierId, VendorId};
use market_store::{MarketStore, MarketStoreExt, NewRating, OrderStatus, Rating, StoreError};
use thiserror::Error;

/// Failures while submitting or reading ratings.
#[derive(Debug, Error)]
pub enum RatingError {
    /// Only completed orders can be rated.
    #[error("order {order_id} is {status}, only completed orders can be rated")]
    NotCompleted {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// The vendor neither placed the order nor requested any of its lines.
    #[error("vendor {vendor_id} did not take part in order {order_id}")]
    NotAParticipant {
        order_id: OrderId,
        vendor_id: VendorId,
    },

    #[error("market store error: {0}")]
    Store(#[from] StoreError),
}

/// Accepts ratings from vendors who took part in a completed order.
pub struct RatingService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> RatingService<S> {
    /// Creates a rating service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Records the vendor's rating of a completed order.
    ///
    /// Rating the same order again replaces the earlier score and text.
    #[tracing::instrument(skip(self, rating), fields(order_id = %rating.order_id))]
    pub async fn rate_order(&self, rating: NewRating) -> Result<Rating, RatingError> {
        let order = self.store.require_order(rating.order_id).await?;

        if !order.status.can_rate() {
            return Err(RatingError::NotCompleted {
                order_id: order.id,
                status: order.status,
            });
        }
        if !order.involves_vendor(rating.vendor_id) {
            return Err(RatingError::NotAParticipant {
                order_id: order.id,
                vendor_id: rating.vendor_id,
            });
        }

        let rating = self.store.upsert_rating(rating).await?;
        tracing::info!(rating_id = %rating.id, score = %rating.score, "rating recorded");
        Ok(rating)
    }

    /// Lists every rating a supplier has received, newest first.
    pub async fn supplier_ratings(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Vec<Rating>, RatingError> {
        Ok(self.store.list_ratings_for_supplier(supplier_id).await?)
    }
}
