use chrono::Utc;
use common::{CartId, SaleId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cart, DiscountPolicy, Money, Sale, SaleItem};
use uuid::Uuid;

fn money(cents: i64) -> Money {
    Money::from_cents(cents).unwrap()
}

fn bench_discount_policy(c: &mut Criterion) {
    let policy = DiscountPolicy::default();
    let lines: Vec<(u32, Money)> = (1..=20).map(|q| (q, money(9_999))).collect();

    c.bench_function("domain/order_total_20_lines", |b| {
        b.iter(|| policy.order_total(&lines).unwrap());
    });
}

fn bench_cart_add_items(c: &mut Criterion) {
    let policy = DiscountPolicy::default();

    c.bench_function("domain/cart_add_20_items", |b| {
        b.iter(|| {
            let mut cart = Cart::new(CartId::new(), Uuid::new_v4(), "Bench Customer");
            for i in 0..20i64 {
                cart.add_item(
                    format!("SKU-{i:03}"),
                    "Benchmark Widget",
                    money(1_000 + i),
                    3,
                    &policy,
                )
                .unwrap();
            }
            cart
        });
    });
}

fn bench_sale_cancel_item(c: &mut Criterion) {
    let policy = DiscountPolicy::default();
    let sale_id = SaleId::new();
    let items: Vec<SaleItem> = (0..20)
        .map(|i| {
            SaleItem::new(
                sale_id,
                format!("SKU-{i:03}"),
                "Benchmark Widget",
                5,
                money(2_500),
                &policy,
            )
            .unwrap()
        })
        .collect();
    let sale = Sale::new(
        sale_id,
        "S-BENCH-0001",
        Uuid::new_v4(),
        "Bench Customer",
        Utc::now(),
        "Downtown",
        items,
    );

    c.bench_function("domain/sale_cancel_item_of_20", |b| {
        b.iter(|| {
            let mut sale = sale.clone();
            sale.cancel_item(&"SKU-010".into()).unwrap();
            sale
        });
    });
}

criterion_group!(
    benches,
    bench_discount_policy,
    bench_cart_add_items,
    bench_sale_cancel_item
);
criterion_main!(benches);
