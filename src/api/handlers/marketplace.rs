//! Marketplace handlers: listings and seller payouts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    ListingQuery, ListingStatusRequest, ListingStatusResponse, Page, PayoutListResponse,
    PayoutStatusRequest,
};
use crate::app_state::AppState;
use crate::domain::{Listing, ListingId, NewListing, NewPayout, Payout, PayoutId, SellerId};
use crate::error::{ErrorResponse, RewardsError};

/// `POST /sellers/{seller_id}/listings` — Submit a listing.
///
/// # Errors
///
/// Returns [`RewardsError`] for an unknown seller, a blank title or a
/// non-positive price.
#[utoipa::path(
    post,
    path = "/api/v1/sellers/{seller_id}/listings",
    tag = "Marketplace",
    summary = "Submit a listing",
    description = "Adds a listing in the pending review state.",
    params(("seller_id" = String, Path, description = "Seller identifier")),
    request_body = NewListing,
    responses(
        (status = 201, description = "Listing created", body = Listing),
        (status = 400, description = "Blank title or non-positive price", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Json(req): Json<NewListing>,
) -> Result<impl IntoResponse, RewardsError> {
    let listing = state
        .marketplace
        .add_listing(&SellerId::new(seller_id), req)
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// `GET /listings` — Filtered, paginated listings.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Marketplace",
    summary = "List listings",
    description = "Returns listings newest first. Seller, status, category and brand are exact matches.",
    params(ListingQuery),
    responses(
        (status = 200, description = "Listing page", body = Page<Listing>),
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let listings = state.marketplace.listings(&query.filter()).await;
    Json(query.pagination().paginate(listings))
}

/// `GET /listings/{listing_id}` — One listing.
///
/// # Errors
///
/// Returns [`RewardsError::ListingNotFound`] for unknown listings.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{listing_id}",
    tag = "Marketplace",
    summary = "Get a listing",
    params(("listing_id" = Uuid, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing found", body = Listing),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, RewardsError> {
    let listing = state
        .marketplace
        .listing(ListingId::from_uuid(listing_id))
        .await?;
    Ok(Json(listing))
}

/// `PUT /listings/{listing_id}/status` — Review a listing.
///
/// # Errors
///
/// Returns [`RewardsError::ListingNotFound`] for unknown listings.
#[utoipa::path(
    put,
    path = "/api/v1/listings/{listing_id}/status",
    tag = "Marketplace",
    summary = "Set listing status",
    description = "Moves a listing to live, pending or rejected. Setting the current status is a no-op.",
    params(("listing_id" = Uuid, Path, description = "Listing identifier")),
    request_body = ListingStatusRequest,
    responses(
        (status = 200, description = "Listing reviewed", body = ListingStatusResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn set_listing_status(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<ListingStatusRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let change = state
        .marketplace
        .set_listing_status(ListingId::from_uuid(listing_id), req.status)
        .await?;
    Ok(Json(ListingStatusResponse::from(change)))
}

/// `POST /sellers/{seller_id}/payouts` — Queue a payout.
///
/// # Errors
///
/// Returns [`RewardsError`] for an unknown seller, a blank order id or a
/// non-positive amount.
#[utoipa::path(
    post,
    path = "/api/v1/sellers/{seller_id}/payouts",
    tag = "Marketplace",
    summary = "Record a payout",
    description = "Queues a payout in the pending state.",
    params(("seller_id" = String, Path, description = "Seller identifier")),
    request_body = NewPayout,
    responses(
        (status = 201, description = "Payout recorded", body = Payout),
        (status = 400, description = "Blank order id or non-positive amount", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse),
    )
)]
pub async fn record_payout(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Json(req): Json<NewPayout>,
) -> Result<impl IntoResponse, RewardsError> {
    let payout = state
        .marketplace
        .record_payout(&SellerId::new(seller_id), req)
        .await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

/// `GET /sellers/{seller_id}/payouts` — A seller's payouts.
///
/// # Errors
///
/// Returns [`RewardsError::SellerNotFound`] for unknown sellers.
#[utoipa::path(
    get,
    path = "/api/v1/sellers/{seller_id}/payouts",
    tag = "Marketplace",
    summary = "List a seller's payouts",
    description = "Returns payouts newest first with paid, outstanding and failed totals.",
    params(("seller_id" = String, Path, description = "Seller identifier")),
    responses(
        (status = 200, description = "Payouts", body = PayoutListResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse),
    )
)]
pub async fn seller_payouts(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> Result<impl IntoResponse, RewardsError> {
    let (payouts, summary) = state
        .marketplace
        .payouts(&SellerId::new(seller_id))
        .await?;
    Ok(Json(PayoutListResponse { payouts, summary }))
}

/// `PUT /payouts/{payout_id}/status` — Advance a payout.
///
/// # Errors
///
/// Returns [`RewardsError`] for unknown payouts or moves outside the
/// settlement lifecycle.
#[utoipa::path(
    put,
    path = "/api/v1/payouts/{payout_id}/status",
    tag = "Marketplace",
    summary = "Set payout status",
    description = "Moves a payout pending→processing→paid. Pending and processing may fail; failed may return to pending.",
    params(("payout_id" = Uuid, Path, description = "Payout identifier")),
    request_body = PayoutStatusRequest,
    responses(
        (status = 200, description = "Payout updated", body = Payout),
        (status = 404, description = "Payout not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse),
    )
)]
pub async fn set_payout_status(
    State(state): State<AppState>,
    Path(payout_id): Path<Uuid>,
    Json(req): Json<PayoutStatusRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let transition = state
        .marketplace
        .set_payout_status(PayoutId::from_uuid(payout_id), req.status)
        .await?;
    Ok(Json(transition.payout))
}

/// Marketplace routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sellers/{seller_id}/listings", post(create_listing))
        .route(
            "/sellers/{seller_id}/payouts",
            post(record_payout).get(seller_payouts),
        )
        .route("/listings", get(list_listings))
        .route("/listings/{listing_id}", get(get_listing))
        .route("/listings/{listing_id}/status", put(set_listing_status))
        .route("/payouts/{payout_id}/status", put(set_payout_status))
}
