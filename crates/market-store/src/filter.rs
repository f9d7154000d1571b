use common::{GroupId, SupplierId, VendorId};

use crate::order::{Order, OrderStatus};

/// Builder for order list queries.
///
/// Filters combine with AND. The vendor filter matches orders the
/// vendor placed individually as well as group orders carrying a line
/// they requested.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by fulfilling supplier.
    pub supplier_id: Option<SupplierId>,

    /// Filter by originating group.
    pub group_id: Option<GroupId>,

    /// Filter by involved vendor (origin or line requester).
    pub vendor_id: Option<VendorId>,

    /// Filter by status.
    pub status: Option<OrderStatus>,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,
}

impl OrderFilter {
    /// Creates an empty filter matching every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter for one supplier's orders.
    pub fn for_supplier(supplier_id: SupplierId) -> Self {
        Self {
            supplier_id: Some(supplier_id),
            ..Default::default()
        }
    }

    /// Creates a filter for one group's orders.
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    /// Creates a filter for orders involving one vendor.
    pub fn for_vendor(vendor_id: VendorId) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            ..Default::default()
        }
    }

    /// Filters by fulfilling supplier.
    pub fn supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    /// Filters by originating group.
    pub fn group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Filters by involved vendor.
    pub fn vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the order passes every set filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(supplier_id) = self.supplier_id
            && order.supplier_id != supplier_id
        {
            return false;
        }
        if let Some(group_id) = self.group_id
            && order.origin.group_id() != Some(group_id)
        {
            return false;
        }
        if let Some(vendor_id) = self.vendor_id
            && !order.involves_vendor(vendor_id)
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderLine, OrderOrigin};
    use chrono::Utc;
    use common::{DealId, Money, OrderId};

    fn group_order(supplier: SupplierId, group: GroupId, requested_by: VendorId) -> Order {
        Order {
            id: OrderId::new(),
            origin: OrderOrigin::group(group),
            supplier_id: supplier,
            status: OrderStatus::Pending,
            total_value: Money::from_paise(500),
            created_at: Utc::now(),
            lines: vec![OrderLine {
                deal_id: DealId::new(),
                item_name: "Potatoes".to_string(),
                unit: "kg".to_string(),
                quantity: 1,
                unit_price: Money::from_paise(500),
                requested_by,
            }],
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let order = group_order(SupplierId::new(), GroupId::new(), VendorId::new());
        assert!(OrderFilter::new().matches(&order));
    }

    #[test]
    fn filter_builder_chain() {
        let supplier = SupplierId::new();
        let filter = OrderFilter::new()
            .supplier(supplier)
            .status(OrderStatus::Completed)
            .limit(20);

        assert_eq!(filter.supplier_id, Some(supplier));
        assert_eq!(filter.status, Some(OrderStatus::Completed));
        assert_eq!(filter.limit, Some(20));
        assert!(filter.group_id.is_none());
    }

    #[test]
    fn supplier_and_group_filters_apply() {
        let supplier = SupplierId::new();
        let group = GroupId::new();
        let order = group_order(supplier, group, VendorId::new());

        assert!(OrderFilter::for_supplier(supplier).matches(&order));
        assert!(!OrderFilter::for_supplier(SupplierId::new()).matches(&order));
        assert!(OrderFilter::for_group(group).matches(&order));
        assert!(!OrderFilter::for_group(GroupId::new()).matches(&order));
    }

    #[test]
    fn vendor_filter_sees_line_requesters() {
        let vendor = VendorId::new();
        let order = group_order(SupplierId::new(), GroupId::new(), vendor);

        assert!(OrderFilter::for_vendor(vendor).matches(&order));
        assert!(!OrderFilter::for_vendor(VendorId::new()).matches(&order));
    }

    #[test]
    fn status_filter_applies() {
        let order = group_order(SupplierId::new(), GroupId::new(), VendorId::new());

        assert!(OrderFilter::new().status(OrderStatus::Pending).matches(&order));
        assert!(
            !OrderFilter::new()
                .status(OrderStatus::Completed)
                .matches(&order)
        );
    }
}
