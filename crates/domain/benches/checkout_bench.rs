use std::collections::BTreeSet;

use common::{DealId, GroupId, Money, Pincode, SupplierId, VendorId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cart, Catalog, CheckoutService};
use market_store::{InMemoryMarketStore, MarketStore, NewDeal, OrderOrigin};

fn scope() -> Pincode {
    Pincode::new("110001")
}

fn seed_deals(
    rt: &tokio::runtime::Runtime,
    store: &InMemoryMarketStore,
    suppliers: usize,
    deals_each: usize,
) -> Vec<DealId> {
    rt.block_on(async {
        let mut ids = Vec::new();
        for s in 0..suppliers {
            let supplier = SupplierId::new();
            for d in 0..deals_each {
                let deal = store
                    .create_deal(NewDeal {
                        supplier_id: supplier,
                        item_name: format!("Item {s}-{d}"),
                        item_description: String::new(),
                        price_per_unit: Money::from_paise(1500),
                        unit: "kg".to_string(),
                        min_order_quantity: 1,
                        stock_quantity: None,
                        target_pincodes: BTreeSet::from([scope()]),
                    })
                    .await
                    .unwrap();
                ids.push(deal.id);
            }
        }
        ids
    })
}

fn full_cart(deal_ids: &[DealId]) -> Cart {
    let mut cart = Cart::new();
    for (i, id) in deal_ids.iter().enumerate() {
        cart.add_quantity(*id, (i % 7 + 1) as u32);
    }
    cart
}

fn bench_partition_cart(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryMarketStore::new();
    let ids = seed_deals(&rt, &store, 10, 5);
    let catalog = rt.block_on(async { Catalog::load(&store, &scope()).await.unwrap() });
    let cart = full_cart(&ids);

    c.bench_function("checkout/partition_50_lines", |b| {
        b.iter(|| {
            let partitions = cart.partition_by_supplier(&catalog);
            assert_eq!(partitions.len(), 10);
        });
    });
}

fn bench_cart_total(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryMarketStore::new();
    let ids = seed_deals(&rt, &store, 10, 5);
    let catalog = rt.block_on(async { Catalog::load(&store, &scope()).await.unwrap() });
    let cart = full_cart(&ids);

    c.bench_function("checkout/advisory_total_50_lines", |b| {
        b.iter(|| {
            std::hint::black_box(cart.total_value(&catalog));
        });
    });
}

fn bench_checkout_single_supplier(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryMarketStore::new();
    let ids = seed_deals(&rt, &store, 1, 5);
    let service = CheckoutService::new(store);
    let vendor = VendorId::new();

    c.bench_function("checkout/single_supplier", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut cart = full_cart(&ids);
                service
                    .checkout(
                        &mut cart,
                        OrderOrigin::individual(vendor),
                        vendor,
                        &scope(),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_checkout_five_suppliers(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryMarketStore::new();
    let ids = seed_deals(&rt, &store, 5, 4);
    let service = CheckoutService::new(store);
    let vendor = VendorId::new();

    c.bench_function("checkout/five_suppliers", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut cart = full_cart(&ids);
                service
                    .checkout(
                        &mut cart,
                        OrderOrigin::group(GroupId::new()),
                        vendor,
                        &scope(),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_partition_cart,
    bench_cart_total,
    bench_checkout_single_supplier,
    bench_checkout_five_suppliers,
);
criterion_main!(benches);
