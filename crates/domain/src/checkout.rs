//! The order placement engine: cart in, one committed order per supplier out.

use std::time::Duration;

use common::{DealId, Money, OrderId, Pincode, SupplierId, VendorId};
use market_store::{
    DraftLine, MarketStore, Order, OrderDraft, OrderOrigin, StoreError,
};
use serde::Serialize;
use thiserror::Error;

use crate::cart::{Cart, SupplierCart};
use crate::catalog::Catalog;
use crate::config::CheckoutConfig;

/// Where a checkout attempt currently stands.
///
/// ```text
/// idle ──► validating ──► placing ──► succeeded
///               │            │
///               └────────────┴──► failed
/// ```
/// Validation runs to completion before the first commit, so a failure
/// in `Validating` leaves zero orders behind. The phase is surfaced in
/// the engine's tracing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    PlacingPerSupplier,
    Succeeded,
    Failed,
}

impl CheckoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::PlacingPerSupplier => "placing",
            CheckoutPhase::Succeeded => "succeeded",
            CheckoutPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a single per-supplier commit did not land.
#[derive(Debug, Error)]
pub enum CommitFailure {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("commit did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Failures the placement engine can surface.
///
/// `EmptyCart` and `MinimumOrderNotMet` are raised before any commit,
/// so they always leave zero orders behind. `CommitFailed` is raised
/// mid-placement: `placed` lists the orders this attempt had already
/// committed, which stay committed (partial success is documented
/// behaviour, there is no cross-supplier rollback).
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart has no orderable lines")]
    EmptyCart,

    #[error("Minimum order for {item_name} is {minimum} {unit}, requested {requested}")]
    MinimumOrderNotMet {
        deal_id: DealId,
        item_name: String,
        minimum: u32,
        unit: String,
        requested: u32,
    },

    #[error("order commit for supplier {supplier_id} failed: {source}")]
    CommitFailed {
        supplier_id: SupplierId,
        /// Orders already committed by this attempt, in placement order.
        placed: Vec<OrderId>,
        #[source]
        source: CommitFailure,
    },

    #[error("market store error: {0}")]
    Store(#[from] StoreError),
}

/// What a fully successful checkout hands back.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    /// One committed order per supplier, in placement order.
    pub orders: Vec<Order>,
    /// Combined store-computed total across the orders.
    pub total: Money,
}

impl CheckoutReceipt {
    /// Returns the ids of the committed orders.
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|order| order.id).collect()
    }
}

/// Turns a cart into one committed order per supplier.
///
/// The engine never computes persisted prices: drafts carry deal ids
/// and quantities only, and each order's total comes back from the
/// store. Commits run sequentially so that the first failure can stop
/// the attempt before further orders are issued.
pub struct CheckoutService<S: MarketStore> {
    store: S,
    config: CheckoutConfig,
}

impl<S: MarketStore> CheckoutService<S> {
    /// Creates a checkout service with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CheckoutConfig::default())
    }

    /// Creates a checkout service with an explicit configuration.
    pub fn with_config(store: S, config: CheckoutConfig) -> Self {
        Self { store, config }
    }

    /// Validates the whole cart, then commits one order per supplier.
    ///
    /// On full success the cart is cleared and a receipt returned. On
    /// `CommitFailed` the cart is left as it was so the buyer can retry;
    /// already-placed orders are reported in the error.
    #[tracing::instrument(skip(self, cart), fields(scope = %scope))]
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        origin: OrderOrigin,
        placed_by: VendorId,
        scope: &Pincode,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let checkout_start = std::time::Instant::now();

        tracing::info!(
            phase = %CheckoutPhase::Validating,
            lines = cart.line_count(),
            "checkout started"
        );

        let catalog = Catalog::load(&self.store, scope).await?;
        let partitions = cart.partition_by_supplier(&catalog);
        if partitions.is_empty() {
            metrics::counter!("checkout_failed").increment(1);
            tracing::warn!(phase = %CheckoutPhase::Failed, "cart resolved to no lines");
            return Err(CheckoutError::EmptyCart);
        }

        // The validation pass runs over every partition before the
        // first commit; a violation anywhere aborts with zero orders.
        for partition in &partitions {
            for line in &partition.lines {
                if !line.meets_minimum() {
                    metrics::counter!("checkout_failed").increment(1);
                    tracing::warn!(
                        phase = %CheckoutPhase::Failed,
                        deal = %line.deal.id,
                        minimum = line.deal.min_order_quantity,
                        requested = line.quantity,
                        "minimum order quantity not met"
                    );
                    return Err(CheckoutError::MinimumOrderNotMet {
                        deal_id: line.deal.id,
                        item_name: line.deal.item_name.clone(),
                        minimum: line.deal.min_order_quantity,
                        unit: line.deal.unit.clone(),
                        requested: line.quantity,
                    });
                }
            }
        }

        tracing::info!(
            phase = %CheckoutPhase::PlacingPerSupplier,
            suppliers = partitions.len(),
            "placing orders"
        );

        let mut placed: Vec<Order> = Vec::with_capacity(partitions.len());
        for partition in partitions {
            match self.commit_partition(&partition, origin, placed_by).await {
                Ok(order) => placed.push(order),
                Err(source) => {
                    // Fail fast: no further suppliers are committed.
                    metrics::counter!("checkout_failed").increment(1);
                    tracing::warn!(
                        phase = %CheckoutPhase::Failed,
                        supplier = %partition.supplier_id,
                        placed = placed.len(),
                        error = %source,
                        "order commit failed, halting checkout"
                    );
                    return Err(CheckoutError::CommitFailed {
                        supplier_id: partition.supplier_id,
                        placed: placed.iter().map(|order| order.id).collect(),
                        source,
                    });
                }
            }
        }

        cart.clear();
        let total: Money = placed.iter().map(|order| order.total_value).sum();
        let duration = checkout_start.elapsed().as_secs_f64();
        metrics::counter!("checkout_completed").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(duration);
        tracing::info!(
            phase = %CheckoutPhase::Succeeded,
            orders = placed.len(),
            %total,
            duration,
            "checkout completed"
        );

        Ok(CheckoutReceipt {
            orders: placed,
            total,
        })
    }

    /// Commits one supplier partition under the configured timeout.
    async fn commit_partition(
        &self,
        partition: &SupplierCart,
        origin: OrderOrigin,
        placed_by: VendorId,
    ) -> Result<Order, CommitFailure> {
        let draft = OrderDraft {
            origin,
            supplier_id: partition.supplier_id,
            lines: partition
                .lines
                .iter()
                .map(|line| DraftLine {
                    deal_id: line.deal.id,
                    quantity: line.quantity,
                    requested_by: placed_by,
                })
                .collect(),
        };

        match tokio::time::timeout(self.config.commit_timeout, self.store.create_order(draft))
            .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(CommitFailure::TimedOut(self.config.commit_timeout)),
        }
    }
}
