//! Domain error types.

use market_store::StoreError;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::deals::DealError;
use crate::fulfillment::FulfillmentError;
use crate::ratings::RatingError;

/// Errors that can occur during domain operations.
///
/// Callers that compose several services can use `?` against this and
/// still match on the specific failure underneath.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred during checkout.
    #[error("checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// An error occurred while fulfilling an order.
    #[error("fulfilment error: {0}")]
    Fulfillment(#[from] FulfillmentError),

    /// An error occurred while handling a rating.
    #[error("rating error: {0}")]
    Rating(#[from] RatingError),

    /// An error occurred while managing deals.
    #[error("deal error: {0}")]
    Deal(#[from] DealError),

    /// An error occurred in the market store.
    #[error("market store error: {0}")]
    Store(#[from] StoreError),
}
