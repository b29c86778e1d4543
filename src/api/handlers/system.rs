//! System endpoints: health check and tier tables.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::tier::{BADGE_THRESHOLDS, LOYALTY_THRESHOLDS};
use crate::domain::{LoyaltyTier, SellerBadge};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One loyalty tier rung.
#[derive(Debug, Serialize, ToSchema)]
struct TierInfo {
    tier: LoyaltyTier,
    min_lifetime_points: i64,
}

/// One seller badge rung.
#[derive(Debug, Serialize, ToSchema)]
struct BadgeInfo {
    badge: SellerBadge,
    min_lifetime_revenue: i64,
}

/// Both threshold ladders.
#[derive(Debug, Serialize, ToSchema)]
struct TierTables {
    loyalty_tiers: Vec<TierInfo>,
    seller_badges: Vec<BadgeInfo>,
}

/// `GET /config/tiers` — Tier and badge threshold tables.
#[utoipa::path(
    get,
    path = "/config/tiers",
    tag = "System",
    summary = "List tier thresholds",
    description = "Returns the loyalty tier ladder (lifetime points) and the seller badge ladder (lifetime revenue), lowest rung first.",
    responses(
        (status = 200, description = "Threshold tables", body = TierTables),
    )
)]
pub async fn tiers_handler() -> impl IntoResponse {
    let tables = TierTables {
        loyalty_tiers: LOYALTY_THRESHOLDS
            .iter()
            .map(|&(tier, min_lifetime_points)| TierInfo {
                tier,
                min_lifetime_points,
            })
            .collect(),
        seller_badges: BADGE_THRESHOLDS
            .iter()
            .map(|&(badge, min_lifetime_revenue)| BadgeInfo {
                badge,
                min_lifetime_revenue,
            })
            .collect(),
    };
    (StatusCode::OK, Json(tables))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/tiers", get(tiers_handler))
}
