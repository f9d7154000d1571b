//! Aggregated read views over the mandi marketplace.
//!
//! This crate provides the reporting side of the marketplace:
//! - [`SupplierPerformance`] for a supplier's revenue, volumes, and ratings
//! - [`GroupSpending`] for a buying group's pooled spend and savings
//! - [`VendorActivity`] for an individual vendor's buying history
//!
//! Each view is a pure computation over order and rating slices, paired
//! with a `load` constructor that fetches its inputs from a
//! [`market_store::MarketStore`].

pub mod views;

pub use views::{
    DealRevenue, GroupSpending, ItemVolume, SupplierPerformance, SupplierSpend, VendorActivity,
};
