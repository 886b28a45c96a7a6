//! Database round-trip tests for the cart, checkout, and order lifecycle.
//!
//! These tests require a running Postgres instance reachable through the
//! `DATABASE_URL` environment variable. Pending migrations are applied on
//! connect. Each test seeds its own product and cleans nothing up, so point
//! this at a throwaway database:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/atelier_test \
//!     cargo test -p atelier-integration-tests --test shop_flows -- --ignored
//! ```

use atelier_core::{CancelReason, Color, ProductId, Size};
use atelier_shop::db::{
    BulkOp, CartOwner, CartRepository, InventoryFilter, InventoryRepository, ProductRepository,
    create_pool,
};
use atelier_shop::models::BuyerInfo;
use atelier_shop::services::{CheckoutService, OrderLifecycleService};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

// ============================================================================
// Helpers
// ============================================================================

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("failed to connect to the test database");
    sqlx::migrate!("../shop/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

/// Insert a product that allows S/M in black and white. The slug is
/// randomized so repeated runs never collide.
async fn seed_product(pool: &PgPool, name: &str, price: &str) -> ProductId {
    let slug = format!("{name}-{}", Uuid::new_v4());
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO shop.products (name, slug, price, allowed_sizes, allowed_colors)
         VALUES ($1, $2, $3::numeric, '{s,m}', '{black,white}')
         RETURNING id",
    )
    .bind(name)
    .bind(slug)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("failed to seed product");
    ProductId::new(id)
}

fn buyer() -> BuyerInfo {
    BuyerInfo::parse(
        "Linh Tran",
        "linh@example.com",
        "0901234567",
        "12 Hang Gai, Hanoi",
        None,
    )
    .expect("valid buyer info")
}

async fn materialized_stock(pool: &PgPool, product_id: ProductId) -> i32 {
    let products = ProductRepository::new(pool);
    products
        .get(product_id)
        .await
        .expect("product query failed")
        .expect("seeded product missing")
        .stock
}

async fn ledger_sum(pool: &PgPool, product_id: ProductId) -> i32 {
    let inventory = InventoryRepository::new(pool);
    let filter = InventoryFilter {
        product_id: Some(product_id),
        ..InventoryFilter::default()
    };
    inventory
        .list(filter)
        .await
        .expect("inventory listing failed")
        .iter()
        .map(|r| r.quantity)
        .sum()
}

// ============================================================================
// Checkout and cancellation
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running Postgres database"]
async fn checkout_debits_ledger_and_empties_cart() {
    let pool = test_pool().await;
    let product_id = seed_product(&pool, "flow-shirt", "19.90").await;

    let inventory = InventoryRepository::new(&pool);
    inventory
        .create(product_id, Size::M, Color::Black, 5)
        .await
        .expect("failed to stock variant");

    let carts = CartRepository::new(&pool);
    let owner = CartOwner::Session(Uuid::new_v4().to_string());
    let cart = carts.get_or_create(&owner).await.expect("cart creation failed");
    carts
        .add_line(cart.id, product_id, Size::M, Color::Black, 2)
        .await
        .expect("failed to add cart line");

    let checkout = CheckoutService::new(&pool);
    checkout
        .checkout(cart.id, None, &buyer())
        .await
        .expect("checkout failed");

    let quantity = inventory
        .get_quantity(product_id, Size::M, Color::Black)
        .await
        .expect("quantity lookup failed");
    assert_eq!(quantity, 3);
    assert_eq!(materialized_stock(&pool, product_id).await, 3);

    let summary = carts.summary(cart.id).await.expect("summary failed");
    assert!(summary.is_empty(), "checkout must clear the cart's lines");
}

#[tokio::test]
#[ignore = "Requires a running Postgres database"]
async fn cancel_restores_precheckout_quantities() {
    let pool = test_pool().await;
    let product_id = seed_product(&pool, "flow-dress", "49.00").await;

    let inventory = InventoryRepository::new(&pool);
    inventory
        .create(product_id, Size::S, Color::White, 4)
        .await
        .expect("failed to stock variant");
    inventory
        .create(product_id, Size::M, Color::Black, 6)
        .await
        .expect("failed to stock variant");

    let carts = CartRepository::new(&pool);
    let owner = CartOwner::Session(Uuid::new_v4().to_string());
    let cart = carts.get_or_create(&owner).await.expect("cart creation failed");
    carts
        .add_line(cart.id, product_id, Size::S, Color::White, 3)
        .await
        .expect("failed to add cart line");
    carts
        .add_line(cart.id, product_id, Size::M, Color::Black, 1)
        .await
        .expect("failed to add cart line");

    let checkout = CheckoutService::new(&pool);
    let order = checkout
        .checkout(cart.id, None, &buyer())
        .await
        .expect("checkout failed");

    let lifecycle = OrderLifecycleService::new(&pool);
    lifecycle
        .cancel(order.public_id, CancelReason::ChangedMind, None)
        .await
        .expect("cancel failed");

    let white_s = inventory
        .get_quantity(product_id, Size::S, Color::White)
        .await
        .expect("quantity lookup failed");
    let black_m = inventory
        .get_quantity(product_id, Size::M, Color::Black)
        .await
        .expect("quantity lookup failed");
    assert_eq!(white_s, 4, "cancellation must restore the debited quantity");
    assert_eq!(black_m, 6, "cancellation must restore the debited quantity");
    assert_eq!(materialized_stock(&pool, product_id).await, 10);
}

// ============================================================================
// Stock materialization
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running Postgres database"]
async fn stock_tracks_ledger_sum_across_writes() {
    let pool = test_pool().await;
    let product_id = seed_product(&pool, "flow-coat", "120.00").await;

    let inventory = InventoryRepository::new(&pool);
    let report = inventory
        .bulk_adjust(
            product_id,
            &[Size::S, Size::M],
            &[Color::Black, Color::White],
            BulkOp::Set,
            7,
        )
        .await
        .expect("bulk adjust failed");
    assert_eq!(report.created, 4);
    assert_eq!(materialized_stock(&pool, product_id).await, 28);
    assert_eq!(ledger_sum(&pool, product_id).await, 28);

    let record = inventory
        .find_variant(product_id, Size::S, Color::Black)
        .await
        .expect("variant lookup failed")
        .expect("variant missing after bulk create");
    inventory
        .adjust(record.id, BulkOp::Subtract, 5)
        .await
        .expect("adjust failed");

    let stock = materialized_stock(&pool, product_id).await;
    assert_eq!(stock, 23);
    assert_eq!(stock, ledger_sum(&pool, product_id).await);
}

// ============================================================================
// Conflict preview
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running Postgres database"]
async fn conflict_preview_splits_existing_from_planned() {
    let pool = test_pool().await;
    let product_id = seed_product(&pool, "flow-scarf", "9.50").await;

    let inventory = InventoryRepository::new(&pool);
    inventory
        .create(product_id, Size::S, Color::Black, 2)
        .await
        .expect("failed to stock variant");

    let preview = inventory
        .check_conflicts(
            product_id,
            &[Size::S, Size::M],
            &[Color::Black, Color::White],
        )
        .await
        .expect("conflict preview failed");

    assert_eq!(preview.existing.len(), 1);
    assert_eq!(preview.existing[0].size, Size::S);
    assert_eq!(preview.existing[0].color, Color::Black);
    assert_eq!(preview.to_create.len(), 3);

    // Every planned SKU is distinct and none collides with the live one.
    let mut skus: Vec<&str> = preview
        .to_create
        .iter()
        .map(|c| c.preview_sku.as_str())
        .collect();
    skus.push(preview.existing[0].sku.as_str());
    let before = skus.len();
    skus.sort_unstable();
    skus.dedup();
    assert_eq!(skus.len(), before);
}
