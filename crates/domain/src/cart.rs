//! The shopping cart and its per-supplier partitioning.

use std::collections::BTreeMap;

use common::{DealId, Money, SupplierId};
use market_store::Deal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// A buyer's working cart: one quantity per deal.
///
/// The cart is a plain owned value, held and passed by the caller. It
/// stores deal ids only; prices and names are resolved against a
/// [`Catalog`] at read time, so a deal edit or deactivation is picked
/// up on the next resolution rather than frozen into the cart.
///
/// A line is present only while its quantity is positive. Setting a
/// quantity of zero removes the line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<DealId, u32>,
}

/// A cart line resolved against the catalog, carrying its deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub deal: Deal,
    pub quantity: u32,
}

impl ResolvedLine {
    /// Returns the advisory subtotal for this line.
    pub fn line_total(&self) -> Money {
        self.deal.subtotal(self.quantity)
    }

    /// Returns true if the quantity satisfies the deal's minimum.
    pub fn meets_minimum(&self) -> bool {
        self.quantity >= self.deal.min_order_quantity
    }
}

/// The slice of a cart belonging to one supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierCart {
    pub supplier_id: SupplierId,
    pub lines: Vec<ResolvedLine>,
}

impl SupplierCart {
    /// Returns the advisory total over this supplier's lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(ResolvedLine::line_total).sum()
    }
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct deals in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the quantity for a deal, zero if absent.
    pub fn quantity_of(&self, deal_id: DealId) -> u32 {
        self.lines.get(&deal_id).copied().unwrap_or(0)
    }

    /// Sets the quantity for a deal. Zero removes the line.
    pub fn set_quantity(&mut self, deal_id: DealId, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(&deal_id);
        } else {
            self.lines.insert(deal_id, quantity);
        }
    }

    /// Sets a quantity from raw text input.
    ///
    /// Anything that does not parse as a non-negative whole number
    /// (negative values included) leaves the cart untouched. A parsed
    /// zero removes the line, like [`set_quantity`](Self::set_quantity).
    pub fn set_quantity_from_input(&mut self, deal_id: DealId, input: &str) {
        if let Ok(quantity) = input.trim().parse::<u32>() {
            self.set_quantity(deal_id, quantity);
        }
    }

    /// Adds to a deal's quantity, creating the line if absent.
    ///
    /// Saturates rather than overflowing. A zero delta changes nothing.
    pub fn add_quantity(&mut self, deal_id: DealId, delta: u32) {
        if delta == 0 {
            return;
        }
        let quantity = self.lines.entry(deal_id).or_insert(0);
        *quantity = quantity.saturating_add(delta);
    }

    /// Removes a deal's line entirely.
    pub fn remove(&mut self, deal_id: DealId) {
        self.lines.remove(&deal_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterates the cart's lines in deal-id order.
    pub fn lines(&self) -> impl Iterator<Item = (DealId, u32)> + '_ {
        self.lines.iter().map(|(&deal_id, &quantity)| (deal_id, quantity))
    }

    /// Groups the resolvable lines by supplier.
    ///
    /// Lines whose deal no longer resolves (deleted or deactivated) are
    /// dropped; stale cart entries never block a checkout. Partitions
    /// come back ordered by supplier id, lines within each partition by
    /// deal id, so the same cart always partitions the same way.
    pub fn partition_by_supplier(&self, catalog: &Catalog) -> Vec<SupplierCart> {
        let mut by_supplier: BTreeMap<SupplierId, Vec<ResolvedLine>> = BTreeMap::new();
        for (&deal_id, &quantity) in &self.lines {
            if let Some(deal) = catalog.resolve(deal_id) {
                by_supplier
                    .entry(deal.supplier_id)
                    .or_default()
                    .push(ResolvedLine {
                        deal: deal.clone(),
                        quantity,
                    });
            }
        }

        by_supplier
            .into_iter()
            .map(|(supplier_id, lines)| SupplierCart { supplier_id, lines })
            .collect()
    }

    /// Returns the advisory cart total over resolvable lines.
    ///
    /// The authoritative total is computed by the store at commit time;
    /// this one exists for display before checkout.
    pub fn total_value(&self, catalog: &Catalog) -> Money {
        self.lines
            .iter()
            .filter_map(|(&deal_id, &quantity)| {
                catalog.resolve(deal_id).map(|deal| deal.subtotal(quantity))
            })
            .sum()
    }
}
