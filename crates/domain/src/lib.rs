//! Domain layer for the mandi marketplace.
//!
//! This crate provides the buying and selling workflows on top of a
//! [`market_store::MarketStore`]:
//! - Cart building and per-supplier partitioning
//! - Checkout with all-or-nothing validation and per-supplier commits
//! - Supplier order fulfilment with exactly-once stock decrement
//! - Deal management, ratings, reorders, and the storefront view

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod deals;
pub mod error;
pub mod fulfillment;
pub mod ratings;
pub mod reorder;
pub mod storefront;

pub use cart::{Cart, ResolvedLine, SupplierCart};
pub use catalog::Catalog;
pub use checkout::{CheckoutError, CheckoutReceipt, CheckoutService, CommitFailure};
pub use config::CheckoutConfig;
pub use deals::{DealError, DealService};
pub use error::DomainError;
pub use fulfillment::{FulfillmentError, FulfillmentService};
pub use ratings::{RatingError, RatingService};
pub use reorder::{ReorderService, RepeatOutcome, merge_order_into_cart};
pub use storefront::{Storefront, load_storefront};
