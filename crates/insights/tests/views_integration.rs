//! Tests the view loaders against a live in-memory store.

use std::collections::BTreeSet;

use common::{GroupId, Money, Pincode, SupplierId, VendorId};
use insights::{GroupSpending, SupplierPerformance, VendorActivity};
use market_store::{
    DraftLine, InMemoryMarketStore, MarketStore, NewDeal, NewRating, OrderDraft, OrderOrigin,
    OrderStatus, Score,
};

struct Market {
    store: InMemoryMarketStore,
    farm: SupplierId,
    dairy: SupplierId,
    vendor: VendorId,
    group: GroupId,
}

/// Seeds two suppliers, one completed group order each, and one rating.
/// A further pending order must stay out of every view.
async fn seed_market() -> Market {
    let store = InMemoryMarketStore::new();
    let farm = SupplierId::new();
    let dairy = SupplierId::new();
    let vendor = VendorId::new();
    let group = GroupId::new();

    let mut deal_ids = Vec::new();
    for (supplier, name, price) in [
        (farm, "Onions", 2500),
        (farm, "Tomatoes", 1800),
        (dairy, "Paneer", 32000),
    ] {
        let deal = store
            .create_deal(NewDeal {
                supplier_id: supplier,
                item_name: name.to_string(),
                item_description: String::new(),
                price_per_unit: Money::from_paise(price),
                unit: "kg".to_string(),
                min_order_quantity: 1,
                stock_quantity: None,
                target_pincodes: BTreeSet::from([Pincode::new("110001")]),
            })
            .await
            .unwrap();
        deal_ids.push(deal.id);
    }

    // Farm order: onions 4 + tomatoes 2 = 13600. Dairy order: paneer 1.
    for (supplier, lines) in [
        (farm, vec![(deal_ids[0], 4u32), (deal_ids[1], 2)]),
        (dairy, vec![(deal_ids[2], 1)]),
    ] {
        let order = store
            .create_order(OrderDraft {
                origin: OrderOrigin::group(group),
                supplier_id: supplier,
                lines: lines
                    .into_iter()
                    .map(|(deal_id, quantity)| DraftLine {
                        deal_id,
                        quantity,
                        requested_by: vendor,
                    })
                    .collect(),
            })
            .await
            .unwrap();
        store
            .transition_order(order.id, OrderStatus::Accepted)
            .await
            .unwrap();
        let completed = store
            .transition_order(order.id, OrderStatus::Completed)
            .await
            .unwrap();

        if supplier == farm {
            store
                .upsert_rating(NewRating {
                    order_id: completed.id,
                    vendor_id: vendor,
                    score: Score::new(4).unwrap(),
                    review_text: None,
                })
                .await
                .unwrap();
        }
    }

    store
        .create_order(OrderDraft {
            origin: OrderOrigin::group(group),
            supplier_id: farm,
            lines: vec![DraftLine {
                deal_id: deal_ids[0],
                quantity: 50,
                requested_by: vendor,
            }],
        })
        .await
        .unwrap();

    Market {
        store,
        farm,
        dairy,
        vendor,
        group,
    }
}

#[tokio::test]
async fn supplier_performance_loads_from_store() {
    let market = seed_market().await;

    let perf = SupplierPerformance::load(&market.store, market.farm)
        .await
        .unwrap();
    assert_eq!(perf.completed_orders, 1);
    assert_eq!(perf.revenue, Money::from_paise(13_600));
    assert_eq!(perf.average_rating, Some(4.0));
    assert_eq!(perf.top_deals[0].item_name, "Onions");

    let perf = SupplierPerformance::load(&market.store, market.dairy)
        .await
        .unwrap();
    assert_eq!(perf.revenue, Money::from_paise(32_000));
    assert_eq!(perf.average_rating, None);
}

#[tokio::test]
async fn group_spending_loads_from_store() {
    let market = seed_market().await;

    let spending = GroupSpending::load(&market.store, market.group)
        .await
        .unwrap();
    assert_eq!(spending.completed_orders, 2);
    assert_eq!(spending.total_spent, Money::from_paise(45_600));
    assert_eq!(spending.estimated_savings, Money::from_paise(4_560));
}

#[tokio::test]
async fn vendor_activity_loads_from_store() {
    let market = seed_market().await;

    let activity = VendorActivity::load(&market.store, market.vendor)
        .await
        .unwrap();
    assert_eq!(activity.completed_orders, 2);
    assert_eq!(activity.total_spent, Money::from_paise(45_600));
    assert_eq!(activity.top_items[0].item_name, "Onions");
    assert_eq!(activity.top_suppliers[0].supplier_id, market.dairy);
}
