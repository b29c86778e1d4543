//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`, except the system routes and
//! the `/ws` feed which live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Trendies Rewards",
        description = "Loyalty ledger, reward redemption, referral, seller badge and marketplace service."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::tiers_handler,
        handlers::loyalty::register_account,
        handlers::loyalty::get_account,
        handlers::loyalty::add_points,
        handlers::loyalty::points_history,
        handlers::loyalty::user_claims,
        handlers::loyalty::list_rewards,
        handlers::loyalty::redeem,
        handlers::referral::generate_code,
        handlers::referral::send_invite,
        handlers::referral::verify_invite,
        handlers::referral::convert_invite,
        handlers::referral::signup,
        handlers::referral::user_referrals,
        handlers::admin::list_claims,
        handlers::admin::set_claim_status,
        handlers::admin::bulk_approve,
        handlers::admin::adjust_points,
        handlers::admin::block_invite,
        handlers::admin::unblock_invite,
        handlers::admin::expire_invites,
        handlers::admin::ban_user,
        handlers::admin::unban_user,
        handlers::admin::banned_users,
        handlers::admin::actions,
        handlers::admin::stats,
        handlers::admin::export_transactions,
        handlers::admin::export_invites,
        handlers::admin::export_codes,
        handlers::seller::register_seller,
        handlers::seller::list_sellers,
        handlers::seller::get_seller,
        handlers::seller::record_sale,
        handlers::marketplace::create_listing,
        handlers::marketplace::list_listings,
        handlers::marketplace::get_listing,
        handlers::marketplace::set_listing_status,
        handlers::marketplace::record_payout,
        handlers::marketplace::seller_payouts,
        handlers::marketplace::set_payout_status,
        handlers::notification::send_redemption,
        handlers::notification::send_referral,
    ),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Loyalty", description = "Accounts, points and redemptions"),
        (name = "Referrals", description = "Codes, invites and conversions"),
        (name = "Admin", description = "Moderation, adjustments and exports"),
        (name = "Sellers", description = "Seller revenue badges"),
        (name = "Marketplace", description = "Listings and seller payouts"),
        (name = "Notifications", description = "Mail forwarders"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

/// Builds the full application: REST, `/ws`, tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
