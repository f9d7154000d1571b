//! Shared types for the mandi group-buying marketplace.
//!
//! Every participant and record in the system is addressed by a
//! strongly-typed UUID wrapper from [`types`], catalog visibility is
//! scoped by [`Pincode`], and all amounts are integer-paise [`Money`].

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{DealId, GroupId, OrderId, Pincode, RatingId, SupplierId, VendorId};
