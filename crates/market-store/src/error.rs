use thiserror::Error;

use common::{DealId, OrderId, SupplierId};

use crate::deal::DealValidationError;
use crate::order::{OrderStatus, ParseOrderStatusError};
use crate::rating::ScoreOutOfRange;

/// Errors that can occur when interacting with the market store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced deal does not exist.
    #[error("Deal not found: {0}")]
    DealNotFound(DealId),

    /// The referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order draft was submitted with no lines.
    #[error("Order draft has no lines")]
    EmptyDraft,

    /// An order draft line requested a zero quantity.
    #[error("Invalid quantity {quantity} for deal {deal_id}")]
    InvalidQuantity { deal_id: DealId, quantity: u32 },

    /// A draft referenced a deal owned by a different supplier.
    /// Each order is atomic for exactly one supplier's lines.
    #[error("Deal {deal_id} belongs to supplier {actual}, not {expected}")]
    SupplierMismatch {
        deal_id: DealId,
        expected: SupplierId,
        actual: SupplierId,
    },

    /// A status change violated the order state machine. Covers double
    /// completion: the second attempt sees `from: completed`.
    #[error("Illegal transition for order {order_id}: {from} -> {to}")]
    IllegalTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A deal draft failed validation.
    #[error("Invalid deal: {0}")]
    InvalidDeal(#[from] DealValidationError),

    /// A stored status column held an unknown value.
    #[error("Invalid stored status: {0}")]
    InvalidStoredStatus(#[from] ParseOrderStatusError),

    /// A stored score column held an out-of-range value.
    #[error("Invalid stored score: {0}")]
    InvalidStoredScore(#[from] ScoreOutOfRange),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for market store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
