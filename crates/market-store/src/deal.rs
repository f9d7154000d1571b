//! Supplier offers ("deals") and their validated drafts.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{DealId, Money, Pincode, SupplierId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tracked stock at or below this level is flagged as low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A supplier's standing offer to sell a unit-priced item.
///
/// Deals are owned by their supplier: buyers only ever read them, and
/// the only buyer-visible set is the active deals targeting the buyer's
/// pincode. Stock is optional; `None` means the supplier does not track
/// it and completion never decrements it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub supplier_id: SupplierId,
    pub item_name: String,
    pub item_description: String,
    pub price_per_unit: Money,
    /// Unit label the price applies to, e.g. "kg" or "dozen".
    pub unit: String,
    pub min_order_quantity: u32,
    pub stock_quantity: Option<u32>,
    pub is_active: bool,
    pub target_pincodes: BTreeSet<Pincode>,
    pub created_at: DateTime<Utc>,
}

impl Deal {
    /// Returns true if this deal is visible in the given pincode scope.
    pub fn targets(&self, pincode: &Pincode) -> bool {
        self.target_pincodes.contains(pincode)
    }

    /// Returns the price for `quantity` units.
    pub fn subtotal(&self, quantity: u32) -> Money {
        self.price_per_unit.multiply(quantity)
    }

    /// Returns true if stock is tracked and at or below [`LOW_STOCK_THRESHOLD`].
    pub fn is_low_stock(&self) -> bool {
        matches!(self.stock_quantity, Some(stock) if stock <= LOW_STOCK_THRESHOLD)
    }
}

/// Validation failures for a deal draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealValidationError {
    #[error("item name must not be empty")]
    EmptyItemName,

    #[error("unit label must not be empty")]
    EmptyUnit,

    #[error("price per unit must not be negative: {price}")]
    NegativePrice { price: Money },

    #[error("minimum order quantity must be at least 1")]
    ZeroMinimumOrder,

    #[error("at least one target pincode is required")]
    NoTargetPincodes,

    #[error("target pincodes must not be blank")]
    BlankPincode,
}

/// A deal draft as submitted by a supplier, before the store assigns
/// an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeal {
    pub supplier_id: SupplierId,
    pub item_name: String,
    pub item_description: String,
    pub price_per_unit: Money,
    pub unit: String,
    pub min_order_quantity: u32,
    pub stock_quantity: Option<u32>,
    pub target_pincodes: BTreeSet<Pincode>,
}

impl NewDeal {
    /// Checks the draft against the construction invariants.
    pub fn validate(&self) -> Result<(), DealValidationError> {
        if self.item_name.trim().is_empty() {
            return Err(DealValidationError::EmptyItemName);
        }
        if self.unit.trim().is_empty() {
            return Err(DealValidationError::EmptyUnit);
        }
        if self.price_per_unit.is_negative() {
            return Err(DealValidationError::NegativePrice {
                price: self.price_per_unit,
            });
        }
        if self.min_order_quantity == 0 {
            return Err(DealValidationError::ZeroMinimumOrder);
        }
        if self.target_pincodes.is_empty() {
            return Err(DealValidationError::NoTargetPincodes);
        }
        if self.target_pincodes.iter().any(Pincode::is_blank) {
            return Err(DealValidationError::BlankPincode);
        }
        Ok(())
    }

    /// Validates the draft and turns it into a live deal.
    ///
    /// This is the only construction path for [`Deal`]; both store
    /// adapters go through it, so an invalid deal can never be
    /// persisted. New deals start active.
    pub fn into_deal(
        self,
        id: DealId,
        created_at: DateTime<Utc>,
    ) -> Result<Deal, DealValidationError> {
        self.validate()?;
        Ok(Deal {
            id,
            supplier_id: self.supplier_id,
            item_name: self.item_name,
            item_description: self.item_description,
            price_per_unit: self.price_per_unit,
            unit: self.unit,
            min_order_quantity: self.min_order_quantity,
            stock_quantity: self.stock_quantity,
            is_active: true,
            target_pincodes: self.target_pincodes,
            created_at,
        })
    }
}
