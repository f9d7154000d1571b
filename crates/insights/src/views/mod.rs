//! Read views over marketplace orders and ratings.

pub mod group_spending;
pub mod supplier_performance;
pub mod vendor_activity;

pub use group_spending::GroupSpending;
pub use supplier_performance::{DealRevenue, SupplierPerformance};
pub use vendor_activity::{ItemVolume, SupplierSpend, VendorActivity};
