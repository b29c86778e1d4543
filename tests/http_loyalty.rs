//! End-to-end loyalty, moderation and seller flows over HTTP.

#![allow(clippy::panic)]

mod common;

use common::{i64_at, spawn_app, str_at};
use serde_json::json;

#[tokio::test]
async fn health_and_tier_tables() {
    let app = spawn_app().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/status"), "healthy");

    let (status, body) = app.get("/config/tiers").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/loyalty_tiers/1/tier"), "Silver");
    assert_eq!(i64_at(&body, "/loyalty_tiers/1/min_lifetime_points"), Some(2_000));
    assert_eq!(i64_at(&body, "/seller_badges/2/min_lifetime_revenue"), Some(500_000));
}

#[tokio::test]
async fn earn_redeem_and_approve() {
    let app = spawn_app().await;
    app.open_account("user_1", "eve@example.com", "Eve").await;

    let (status, body) = app
        .post(
            "/api/v1/accounts/user_1/points",
            &json!({ "points": 2400, "description": "Welcome bonus" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/transaction/type"), "earned");
    assert_eq!(str_at(&body, "/tier_changed_to"), "Silver");

    let (status, body) = app
        .post(
            "/api/v1/accounts/user_1/redemptions",
            &json!({ "reward_id": "reward_1" }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(i64_at(&body, "/account/total_points"), Some(2_150));
    assert_eq!(i64_at(&body, "/account/lifetime_points"), Some(2_400));
    assert_eq!(str_at(&body, "/claim/status"), "pending");
    assert_eq!(i64_at(&body, "/transaction/points"), Some(-250));
    assert_eq!(body.pointer("/notification_sent"), Some(&json!(true)));
    let claim_id = str_at(&body, "/claim/id").to_string();
    assert_eq!(app.mailer.sent_count().await, 1);

    let (status, body) = app.get("/api/v1/admin/claims?status=pending").await;
    assert_eq!(status, 200);
    assert_eq!(i64_at(&body, "/pagination/total"), Some(1));
    assert_eq!(str_at(&body, "/data/0/reward_name"), "€5 Voucher");

    let (status, body) = app
        .put(
            &format!("/api/v1/admin/claims/{claim_id}/status"),
            &json!({ "status": "approved", "admin_id": "admin_1", "notes": "ok" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/claim/status"), "approved");
    assert_eq!(str_at(&body, "/action/type"), "approve_reward");
    assert_eq!(str_at(&body, "/action/performed_by"), "admin_1");

    let (status, body) = app
        .put(
            &format!("/api/v1/admin/claims/{claim_id}/status"),
            &json!({ "status": "pending", "admin_id": "admin_1" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(i64_at(&body, "/error/code"), Some(2104));

    let (_, actions) = app.get("/api/v1/admin/actions").await;
    assert_eq!(actions.as_array().map(Vec::len), Some(1));

    let (status, body) = app.get("/api/v1/accounts/user_1").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/tier"), "Silver");
    assert_eq!(i64_at(&body, "/progress/points_to_next"), Some(2_600));

    let (_, history) = app.get("/api/v1/accounts/user_1/transactions").await;
    assert_eq!(str_at(&history, "/data/0/type"), "redeemed");
    assert_eq!(i64_at(&history, "/pagination/total"), Some(2));
}

#[tokio::test]
async fn redemption_failures_map_to_error_codes() {
    let app = spawn_app().await;
    app.open_account("user_2", "bob@example.com", "Bob").await;

    let (status, body) = app
        .post(
            "/api/v1/accounts/user_2/redemptions",
            &json!({ "reward_id": "reward_3" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(i64_at(&body, "/error/code"), Some(4002));

    let (status, body) = app
        .post(
            "/api/v1/accounts/user_2/redemptions",
            &json!({ "reward_id": "reward_99" }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(i64_at(&body, "/error/code"), Some(2002));

    let (status, body) = app.get("/api/v1/accounts/nobody").await;
    assert_eq!(status, 404);
    assert_eq!(i64_at(&body, "/error/code"), Some(2001));

    let (status, _) = app
        .post(
            "/api/v1/accounts",
            &json!({ "user_id": "user_2", "email": "bob@example.com" }),
        )
        .await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn banned_user_cannot_redeem() {
    let app = spawn_app().await;
    app.open_account("user_3", "mal@example.com", "Mal").await;
    let (status, _) = app
        .post(
            "/api/v1/admin/points-adjustments",
            &json!({ "user_id": "user_3", "points": 1000, "reason": "goodwill", "admin_id": "admin_1" }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = app
        .post(
            "/api/v1/admin/users/user_3/ban",
            &json!({ "email": "mal@example.com", "reason": "fraud", "admin_id": "admin_1" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/type"), "ban_user");

    let (status, body) = app
        .post(
            "/api/v1/accounts/user_3/redemptions",
            &json!({ "reward_id": "reward_2" }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(i64_at(&body, "/error/code"), Some(4003));

    let (status, _) = app
        .post(
            "/api/v1/admin/users/user_3/unban",
            &json!({ "admin_id": "admin_1" }),
        )
        .await;
    assert_eq!(status, 200);
    let (status, _) = app
        .post(
            "/api/v1/accounts/user_3/redemptions",
            &json!({ "reward_id": "reward_2" }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, stats) = app.get("/api/v1/admin/stats").await;
    assert_eq!(i64_at(&stats, "/loyalty/total_claimed"), Some(1));
    assert_eq!(i64_at(&stats, "/loyalty/total_points_redeemed"), Some(100));
    assert_eq!(i64_at(&stats, "/banned_users"), Some(0));
}

#[tokio::test]
async fn seller_sales_upgrade_badge() {
    let app = spawn_app().await;
    let (status, body) = app
        .post(
            "/api/v1/sellers",
            &json!({ "seller_id": "seller_1", "name": "Atelier", "email": "shop@example.com" }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(str_at(&body, "/badge"), "Verified");

    let (status, body) = app
        .post("/api/v1/sellers/seller_1/sales", &json!({ "amount": 150_000 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/upgraded_to"), "Pro");
    assert_eq!(str_at(&body, "/seller/badge"), "Pro");

    let (status, body) = app
        .post("/api/v1/sellers/seller_1/sales", &json!({ "amount": 0 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(i64_at(&body, "/error/code"), Some(1001));

    let (status, _) = app.get("/api/v1/sellers/ghost").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn mail_forwarders_validate_required_fields() {
    let app = spawn_app().await;
    let (status, body) = app
        .post(
            "/api/v1/notifications/redemption",
            &json!({ "username": "Eve", "reward_name": "€5 Voucher" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(i64_at(&body, "/error/code"), Some(1002));

    let (status, body) = app
        .post(
            "/api/v1/notifications/referral",
            &json!({ "invite_email": "friend@example.com", "referral_code": "EVE1234" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.pointer("/success"), Some(&json!(true)));
    assert_eq!(app.mailer.sent_count().await, 1);
}
