//! Vendor activity view: one vendor's buying history.

use std::collections::BTreeMap;

use common::{Money, SupplierId, VendorId};
use market_store::{MarketStore, Order, OrderFilter, OrderStatus, StoreError};
use serde::Serialize;

/// Number of top items and suppliers reported per vendor.
const TOP_ENTRIES: usize = 5;

/// Units of one item a vendor bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemVolume {
    pub item_name: String,
    pub units: u64,
}

/// Spend routed to one supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierSpend {
    pub supplier_id: SupplierId,
    pub spent: Money,
}

/// What a vendor bought across completed orders.
///
/// Spend counts only lines the vendor requested, so a group order's
/// total is split across the vendors who asked for its lines.
#[derive(Debug, Clone, Serialize)]
pub struct VendorActivity {
    pub vendor_id: VendorId,
    pub completed_orders: u64,
    pub total_spent: Money,
    /// Most-bought items by unit count.
    pub top_items: Vec<ItemVolume>,
    /// Most-used suppliers by spend.
    pub top_suppliers: Vec<SupplierSpend>,
}

impl VendorActivity {
    /// Builds the summary from orders the vendor took part in.
    pub fn build(vendor_id: VendorId, orders: &[Order]) -> Self {
        let completed: Vec<&Order> = orders
            .iter()
            .filter(|o| o.involves_vendor(vendor_id) && o.status == OrderStatus::Completed)
            .collect();

        let mut total_spent = Money::zero();
        let mut by_item: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_supplier: BTreeMap<SupplierId, Money> = BTreeMap::new();
        for order in &completed {
            for line in order.lines.iter().filter(|l| l.requested_by == vendor_id) {
                let line_total = line.unit_price.multiply(line.quantity);
                total_spent += line_total;
                *by_item.entry(line.item_name.clone()).or_insert(0) += u64::from(line.quantity);
                *by_supplier.entry(order.supplier_id).or_insert(Money::zero()) += line_total;
            }
        }

        let mut top_items: Vec<ItemVolume> = by_item
            .into_iter()
            .map(|(item_name, units)| ItemVolume { item_name, units })
            .collect();
        top_items.sort_by(|a, b| b.units.cmp(&a.units));
        top_items.truncate(TOP_ENTRIES);

        let mut top_suppliers: Vec<SupplierSpend> = by_supplier
            .into_iter()
            .map(|(supplier_id, spent)| SupplierSpend { supplier_id, spent })
            .collect();
        top_suppliers.sort_by(|a, b| b.spent.paise().cmp(&a.spent.paise()));
        top_suppliers.truncate(TOP_ENTRIES);

        Self {
            vendor_id,
            completed_orders: completed.len() as u64,
            total_spent,
            top_items,
            top_suppliers,
        }
    }

    /// Fetches the vendor's completed orders and builds the summary.
    #[tracing::instrument(skip(store))]
    pub async fn load<S: MarketStore>(store: &S, vendor_id: VendorId) -> Result<Self, StoreError> {
        let orders = store
            .list_orders(OrderFilter::for_vendor(vendor_id).status(OrderStatus::Completed))
            .await?;
        Ok(Self::build(vendor_id, &orders))
    }
}
