//! Seller handlers: registration, sales and badges.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{RecordSaleRequest, RegisterSellerRequest, SaleResponse};
use crate::app_state::AppState;
use crate::domain::{SellerId, SellerProfile};
use crate::error::{ErrorResponse, RewardsError};

/// `POST /sellers` — Register a seller.
///
/// # Errors
///
/// Returns [`RewardsError`] on a missing field or duplicate seller.
#[utoipa::path(
    post,
    path = "/api/v1/sellers",
    tag = "Sellers",
    summary = "Register a seller",
    description = "Creates a seller at the Verified badge with zero revenue.",
    request_body = RegisterSellerRequest,
    responses(
        (status = 201, description = "Seller registered", body = SellerProfile),
        (status = 400, description = "Missing seller id or email", body = ErrorResponse),
        (status = 409, description = "Seller already exists", body = ErrorResponse),
    )
)]
pub async fn register_seller(
    State(state): State<AppState>,
    Json(req): Json<RegisterSellerRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let seller = state
        .sellers
        .register_seller(req.seller_id, req.name, req.email)
        .await?;
    Ok((StatusCode::CREATED, Json(seller)))
}

/// `GET /sellers` — All sellers.
#[utoipa::path(
    get,
    path = "/api/v1/sellers",
    tag = "Sellers",
    summary = "List sellers",
    description = "Returns every seller ordered by id.",
    responses(
        (status = 200, description = "Sellers", body = Vec<SellerProfile>),
    )
)]
pub async fn list_sellers(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sellers.list().await)
}

/// `GET /sellers/{seller_id}` — One seller.
///
/// # Errors
///
/// Returns [`RewardsError::SellerNotFound`] for unknown sellers.
#[utoipa::path(
    get,
    path = "/api/v1/sellers/{seller_id}",
    tag = "Sellers",
    summary = "Get a seller",
    params(("seller_id" = String, Path, description = "Seller identifier")),
    responses(
        (status = 200, description = "Seller found", body = SellerProfile),
        (status = 404, description = "Seller not found", body = ErrorResponse),
    )
)]
pub async fn get_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> Result<impl IntoResponse, RewardsError> {
    let seller = state.sellers.seller(&SellerId::new(seller_id)).await?;
    Ok(Json(seller))
}

/// `POST /sellers/{seller_id}/sales` — Record a sale.
///
/// # Errors
///
/// Returns [`RewardsError`] for a non-positive amount or unknown seller.
#[utoipa::path(
    post,
    path = "/api/v1/sellers/{seller_id}/sales",
    tag = "Sellers",
    summary = "Record a sale",
    description = "Adds the sale to lifetime revenue and reclassifies the badge. Badges never downgrade.",
    params(("seller_id" = String, Path, description = "Seller identifier")),
    request_body = RecordSaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = SaleResponse),
        (status = 400, description = "Non-positive amount", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse),
    )
)]
pub async fn record_sale(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Json(req): Json<RecordSaleRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let receipt = state
        .sellers
        .record_sale(&SellerId::new(seller_id), req.amount)
        .await?;
    Ok(Json(SaleResponse::from(receipt)))
}

/// Seller routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sellers", post(register_seller).get(list_sellers))
        .route("/sellers/{seller_id}", get(get_seller))
        .route("/sellers/{seller_id}/sales", post(record_sale))
}
