//! Listing review and seller payouts over HTTP.

#![allow(clippy::panic)]

mod common;

use common::{TestApp, i64_at, spawn_app, str_at};
use serde_json::json;

async fn register_seller(app: &TestApp, seller_id: &str) {
    let (status, _) = app
        .post(
            "/api/v1/sellers",
            &json!({ "seller_id": seller_id, "name": "Maison", "email": "m@example.com" }),
        )
        .await;
    assert_eq!(status, 201, "seller {seller_id} not created");
}

#[tokio::test]
async fn listings_are_reviewed_and_filtered() {
    let app = spawn_app().await;
    register_seller(&app, "seller_1").await;

    let (status, body) = app
        .post(
            "/api/v1/sellers/seller_1/listings",
            &json!({ "title": "Submariner", "brand": "Rolex", "price": 9500, "category": "Watches" }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(str_at(&body, "/status"), "pending");
    let watch = str_at(&body, "/id").to_string();

    let (status, _) = app
        .post(
            "/api/v1/sellers/seller_1/listings",
            &json!({ "title": "Speedy", "brand": "Louis Vuitton", "price": 800, "category": "Bags" }),
        )
        .await;
    assert_eq!(status, 201);

    let (status, body) = app
        .put(
            &format!("/api/v1/listings/{watch}/status"),
            &json!({ "status": "live" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/previous_status"), "pending");
    assert_eq!(body.pointer("/changed"), Some(&json!(true)));

    let (status, body) = app.get("/api/v1/listings?status=live").await;
    assert_eq!(status, 200);
    assert_eq!(i64_at(&body, "/pagination/total"), Some(1));
    assert_eq!(str_at(&body, "/data/0/brand"), "Rolex");

    let (_, body) = app.get("/api/v1/listings?seller_id=seller_1").await;
    assert_eq!(i64_at(&body, "/pagination/total"), Some(2));
    assert_eq!(str_at(&body, "/data/0/title"), "Speedy");

    let (_, body) = app.get("/api/v1/listings?category=watches").await;
    assert_eq!(i64_at(&body, "/pagination/total"), Some(0));

    let (status, body) = app.get(&format!("/api/v1/listings/{watch}")).await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/status"), "live");
}

#[tokio::test]
async fn listing_errors_map_to_status_codes() {
    let app = spawn_app().await;
    register_seller(&app, "seller_1").await;

    let (status, body) = app
        .post(
            "/api/v1/sellers/ghost/listings",
            &json!({ "title": "Ring", "price": 100 }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(str_at(&body, "/error/message"), "seller not found: ghost");

    let (status, _) = app
        .post(
            "/api/v1/sellers/seller_1/listings",
            &json!({ "title": "Ring", "price": 0 }),
        )
        .await;
    assert_eq!(status, 400);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = app.get(&format!("/api/v1/listings/{missing}")).await;
    assert_eq!(status, 404);
    assert_eq!(i64_at(&body, "/error/code"), Some(2006));
}

#[tokio::test]
async fn payouts_follow_settlement_lifecycle() {
    let app = spawn_app().await;
    register_seller(&app, "seller_1").await;

    let (status, body) = app
        .post(
            "/api/v1/sellers/seller_1/payouts",
            &json!({ "order_id": "ORD-100", "item": "Submariner", "buyer": "J. Doe", "amount": 9000 }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(str_at(&body, "/status"), "pending");
    let payout = str_at(&body, "/id").to_string();

    let (status, body) = app
        .put(
            &format!("/api/v1/payouts/{payout}/status"),
            &json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(i64_at(&body, "/error/code"), Some(2104));

    for step in ["processing", "paid"] {
        let (status, body) = app
            .put(
                &format!("/api/v1/payouts/{payout}/status"),
                &json!({ "status": step }),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(str_at(&body, "/status"), step);
    }

    let (status, _) = app
        .post(
            "/api/v1/sellers/seller_1/payouts",
            &json!({ "order_id": "ORD-101", "amount": 400 }),
        )
        .await;
    assert_eq!(status, 201);

    let (status, body) = app.get("/api/v1/sellers/seller_1/payouts").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/payouts/0/order_id"), "ORD-101");
    assert_eq!(i64_at(&body, "/summary/paid"), Some(9_000));
    assert_eq!(i64_at(&body, "/summary/outstanding"), Some(400));
    assert_eq!(i64_at(&body, "/summary/count"), Some(2));

    let (status, body) = app.get("/api/v1/sellers/ghost/payouts").await;
    assert_eq!(status, 404);
    assert_eq!(i64_at(&body, "/error/code"), Some(2005));
}

#[tokio::test]
async fn sales_accumulate_monthly_revenue() {
    let app = spawn_app().await;
    register_seller(&app, "seller_1").await;

    for amount in [1_000, 2_500] {
        let (status, _) = app
            .post(
                "/api/v1/sellers/seller_1/sales",
                &json!({ "amount": amount }),
            )
            .await;
        assert_eq!(status, 200);
    }
    let (status, body) = app.get("/api/v1/sellers/seller_1").await;
    assert_eq!(status, 200);
    assert_eq!(i64_at(&body, "/total_revenue"), Some(3_500));
    assert!(i64_at(&body, "/current_month_sales").is_some_and(|v| v > 0));
    assert_eq!(str_at(&body, "/sales_month").len(), 7);
}
