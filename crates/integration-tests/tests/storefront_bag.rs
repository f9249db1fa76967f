//! Storefront integration tests: catalog, bag and checkout.
//!
//! Every test starts its own stub backend and storefront, so state never
//! leaks between tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use maison_integration_tests::{TOTE_ID, TestContext};
use reqwest::StatusCode;
use serde_json::{Value, json};

// =============================================================================
// Helpers
// =============================================================================

async fn get_json(ctx: &TestContext, path: &str) -> Value {
    let response = ctx.shopper.get(ctx.storefront(path)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {path}");
    response.json().await.unwrap()
}

async fn add_to_bag(ctx: &TestContext, product_id: i64, quantity: u32) -> reqwest::Response {
    ctx.shopper
        .post(ctx.storefront("/bag/items"))
        .json(&json!({ "productId": product_id, "size": "M", "quantity": quantity }))
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_listing_then_instant_search() {
    let ctx = TestContext::start().await;

    let listing = get_json(&ctx, "/products").await;
    assert_eq!(listing["total"], 3);
    assert_eq!(listing["products"][0]["price"], "$100.00");
    assert_eq!(listing["showingAll"], false);

    let instant = get_json(&ctx, "/products/instant?search=TOTE").await;
    assert_eq!(instant["provisional"], true);
    let names: Vec<&str> = instant["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sac Tote", "Mini Tote"]);
}

#[tokio::test]
async fn test_instant_search_before_any_listing_is_empty() {
    let ctx = TestContext::start().await;
    let instant = get_json(&ctx, "/products/instant?search=tote").await;
    assert_eq!(instant["products"], json!([]));
}

#[tokio::test]
async fn test_product_page_includes_related() {
    let ctx = TestContext::start().await;
    let page = get_json(&ctx, &format!("/products/{TOTE_ID}")).await;
    assert_eq!(page["product"]["name"], "Sac Tote");
    assert_eq!(page["product"]["sizes"], json!(["S", "M", "L"]));
    assert_eq!(page["related"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Bag
// =============================================================================

#[tokio::test]
async fn test_bag_add_merge_and_remove() {
    let ctx = TestContext::start().await;

    let bag = get_json(&ctx, "/bag").await;
    assert_eq!(bag["itemCount"], 0);

    let response = add_to_bag(&ctx, TOTE_ID, 1).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bag: Value = response.json().await.unwrap();
    assert_eq!(bag["itemCount"], 1);
    assert_eq!(bag["subtotal"], "$100.00");
    assert_eq!(bag["toast"]["kind"], "success");

    // Same product and size merges into one line
    let bag: Value = add_to_bag(&ctx, TOTE_ID, 2).await.json().await.unwrap();
    assert_eq!(bag["lines"].as_array().unwrap().len(), 1);
    assert_eq!(bag["lines"][0]["quantity"], 3);
    assert_eq!(bag["itemCount"], 3);
    assert_eq!(bag["subtotal"], "$300.00");

    let count = get_json(&ctx, "/bag/count").await;
    assert_eq!(count["count"], 3);

    // Zero removes the line
    let bag: Value = ctx
        .shopper
        .patch(ctx.storefront("/bag/items"))
        .json(&json!({ "productId": TOTE_ID, "size": "M", "quantity": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bag["lines"], json!([]));
    assert_eq!(bag["itemCount"], 0);
}

#[tokio::test]
async fn test_bag_is_per_visitor() {
    let ctx = TestContext::start().await;
    add_to_bag(&ctx, TOTE_ID, 1).await;

    let stranger = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let bag: Value = stranger
        .get(ctx.storefront("/bag"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bag["itemCount"], 0);
}

#[tokio::test]
async fn test_adding_unknown_product_is_not_found() {
    let ctx = TestContext::start().await;
    let response = add_to_bag(&ctx, 999, 1).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["toast"]["kind"], "error");

    assert_eq!(get_json(&ctx, "/bag").await["itemCount"], 0);
}

#[tokio::test]
async fn test_adding_zero_quantity_is_rejected() {
    let ctx = TestContext::start().await;
    let response = add_to_bag(&ctx, TOTE_ID, 0).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["toast"]["kind"], "error");

    assert_eq!(get_json(&ctx, "/bag").await["itemCount"], 0);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_guest_checkout_hands_off_and_clears_bag() {
    let ctx = TestContext::start().await;
    add_to_bag(&ctx, TOTE_ID, 2).await;

    let response = ctx
        .shopper
        .post(ctx.storefront("/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "https://pay.maison.test/session/1");

    let checkouts = ctx.backend.checkouts();
    assert_eq!(checkouts.len(), 1);
    assert_eq!(checkouts[0]["lines"][0]["productId"], TOTE_ID);
    assert_eq!(checkouts[0]["lines"][0]["quantity"], 2);

    assert_eq!(get_json(&ctx, "/bag").await["itemCount"], 0);
}

#[tokio::test]
async fn test_checkout_with_empty_bag_is_rejected() {
    let ctx = TestContext::start().await;
    let response = ctx
        .shopper
        .post(ctx.storefront("/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.backend.checkouts().is_empty());
}
