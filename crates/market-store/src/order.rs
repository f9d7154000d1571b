//! Committed orders and the fulfilment state machine.

use chrono::{DateTime, Utc};
use common::{DealId, GroupId, Money, OrderId, SupplierId, VendorId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a committed order.
///
/// Transitions, driven by the fulfilling supplier only:
/// ```text
/// pending ──┬──► accepted ──► completed
///           │
///           └──► denied
/// ```
/// `completed` and `denied` are terminal. Completion carries the stock
/// decrement side effect, which is why re-completing is an illegal
/// transition rather than a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by a buyer, awaiting the supplier's decision.
    #[default]
    Pending,

    /// Supplier has agreed to fulfil the order.
    Accepted,

    /// Supplier turned the order down (terminal).
    Denied,

    /// Delivered; stock has been decremented (terminal).
    Completed,
}

impl OrderStatus {
    /// Returns true if the order can be accepted in this status.
    pub fn can_accept(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be denied in this status.
    pub fn can_deny(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Accepted)
    }

    /// Returns true if a rating may be attached in this status.
    pub fn can_rate(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Denied | OrderStatus::Completed)
    }

    /// Returns true if moving from this status to `next` is legal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Denied)
                | (OrderStatus::Accepted, OrderStatus::Completed)
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Denied => "denied",
            OrderStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "denied" => Ok(OrderStatus::Denied),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}

/// Who an order was placed for: a buying group pooling its members'
/// lines, or a single vendor ordering alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderOrigin {
    Group { group_id: GroupId },
    Individual { vendor_id: VendorId },
}

impl OrderOrigin {
    /// Origin for a group order.
    pub fn group(group_id: GroupId) -> Self {
        Self::Group { group_id }
    }

    /// Origin for an individual vendor order.
    pub fn individual(vendor_id: VendorId) -> Self {
        Self::Individual { vendor_id }
    }

    /// Returns the group id for group orders.
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            OrderOrigin::Group { group_id } => Some(*group_id),
            OrderOrigin::Individual { .. } => None,
        }
    }

    /// Returns the vendor id for individual orders.
    pub fn individual_vendor(&self) -> Option<VendorId> {
        match self {
            OrderOrigin::Group { .. } => None,
            OrderOrigin::Individual { vendor_id } => Some(*vendor_id),
        }
    }
}

/// One line of a committed order.
///
/// The line snapshots the deal's name, unit, and unit price at commit
/// time, so later deal edits never change what an order says it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub deal_id: DealId,
    pub item_name: String,
    pub unit: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// The vendor who asked for this line. For group orders this is the
    /// member who added it; for individual orders it equals the origin
    /// vendor.
    pub requested_by: VendorId,
}

impl OrderLine {
    /// Returns the subtotal for this line (quantity × unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A committed, supplier-scoped purchase.
///
/// Every order belongs to exactly one supplier; a cart spanning several
/// suppliers commits as several orders. The total is computed by the
/// store from its own unit prices at commit time and always equals the
/// sum of the line subtotals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub origin: OrderOrigin,
    pub supplier_id: SupplierId,
    pub status: OrderStatus,
    pub total_value: Money,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Returns the sum of the line subtotals.
    ///
    /// Always equal to `total_value` for orders produced by a store.
    pub fn computed_total(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Returns true if the vendor placed the order or requested one of
    /// its lines.
    pub fn involves_vendor(&self, vendor_id: VendorId) -> bool {
        self.origin.individual_vendor() == Some(vendor_id)
            || self.lines.iter().any(|line| line.requested_by == vendor_id)
    }
}

/// One requested line of an order draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub deal_id: DealId,
    pub quantity: u32,
    pub requested_by: VendorId,
}

/// An order as submitted for commit, before the store prices it.
///
/// Drafts carry no prices or totals. The store resolves each line
/// against its own deal rows, snapshots the authoritative unit price,
/// and computes the total; anything price-like a client computed is
/// advisory only and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub origin: OrderOrigin,
    pub supplier_id: SupplierId,
    pub lines: Vec<DraftLine>,
}

impl OrderDraft {
    /// Returns true if the draft has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
