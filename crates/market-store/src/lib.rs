pub mod deal;
pub mod error;
pub mod filter;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod rating;
pub mod store;

pub use deal::{Deal, DealValidationError, LOW_STOCK_THRESHOLD, NewDeal};
pub use error::{Result, StoreError};
pub use filter::OrderFilter;
pub use memory::InMemoryMarketStore;
pub use order::{DraftLine, Order, OrderDraft, OrderLine, OrderOrigin, OrderStatus};
pub use postgres::PostgresMarketStore;
pub use rating::{NewRating, Rating, Score, ScoreOutOfRange};
pub use store::{MarketStore, MarketStoreExt};
