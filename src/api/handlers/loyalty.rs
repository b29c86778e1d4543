//! Loyalty handlers: accounts, points, catalog and redemptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AccountResponse, AddPointsRequest, Page, PaginationParams, PostingResponse, RedeemRequest,
    RedemptionResponse, RegisterAccountRequest,
};
use crate::app_state::AppState;
use crate::domain::{ClaimedReward, LoyaltyReward, PointsTransaction, UserId};
use crate::error::{ErrorResponse, RewardsError};

/// `POST /accounts` — Open a loyalty account.
///
/// # Errors
///
/// Returns [`RewardsError`] on a missing field or duplicate user.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "Loyalty",
    summary = "Open a loyalty account",
    description = "Creates an account at Bronze with a zero balance.",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Missing user id or email", body = ErrorResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
    )
)]
pub async fn register_account(
    State(state): State<AppState>,
    Json(req): Json<RegisterAccountRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let account = state
        .loyalty
        .register_account(req.user_id, req.email, req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// `GET /accounts/{user_id}` — Account with tier progress.
///
/// # Errors
///
/// Returns [`RewardsError::UserNotFound`] for unknown users.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}",
    tag = "Loyalty",
    summary = "Get an account",
    description = "Returns balance, lifetime points, derived tier and progress to the next tier.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, RewardsError> {
    let account = state.loyalty.account(&UserId::new(user_id)).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// `POST /accounts/{user_id}/points` — Post a credit or debit.
///
/// # Errors
///
/// Returns [`RewardsError`] for a zero delta or unknown user.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{user_id}/points",
    tag = "Loyalty",
    summary = "Add points",
    description = "Appends an earned (positive) or spent (negative) ledger entry. Debits past zero clamp the balance at zero.",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = AddPointsRequest,
    responses(
        (status = 200, description = "Points posted", body = PostingResponse),
        (status = 400, description = "Zero delta", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn add_points(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<AddPointsRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let outcome = state
        .loyalty
        .add_points(
            &UserId::new(user_id),
            req.points,
            req.description,
            req.reference_id,
        )
        .await?;
    Ok(Json(PostingResponse::from(outcome)))
}

/// `GET /accounts/{user_id}/transactions` — Points history.
///
/// # Errors
///
/// Returns [`RewardsError::UserNotFound`] for unknown users.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}/transactions",
    tag = "Loyalty",
    summary = "Points history",
    description = "Returns the user's ledger entries, newest first, paginated.",
    params(("user_id" = String, Path, description = "User identifier"), PaginationParams),
    responses(
        (status = 200, description = "Ledger page", body = Page<PointsTransaction>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn points_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, RewardsError> {
    let history = state.loyalty.points_history(&UserId::new(user_id)).await?;
    Ok(Json(params.paginate(history)))
}

/// `GET /accounts/{user_id}/claims` — The user's claims.
///
/// # Errors
///
/// Returns [`RewardsError::UserNotFound`] for unknown users.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}/claims",
    tag = "Loyalty",
    summary = "List a user's claims",
    description = "Returns every claim the user has made, newest first.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Claims", body = Vec<ClaimedReward>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn user_claims(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, RewardsError> {
    let claims = state.loyalty.claims_for(&UserId::new(user_id)).await?;
    Ok(Json(claims))
}

/// `GET /rewards` — Active catalog.
#[utoipa::path(
    get,
    path = "/api/v1/rewards",
    tag = "Loyalty",
    summary = "List available rewards",
    description = "Returns the active catalog entries in catalog order.",
    responses(
        (status = 200, description = "Active rewards", body = Vec<LoyaltyReward>),
    )
)]
pub async fn list_rewards(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.loyalty.list_available().await)
}

/// `POST /accounts/{user_id}/redemptions` — Redeem a reward.
///
/// # Errors
///
/// Returns [`RewardsError`] for unknown users or rewards, inactive rewards,
/// insufficient balance, or a banned user.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{user_id}/redemptions",
    tag = "Loyalty",
    summary = "Redeem a reward",
    description = "Debits the reward cost and opens a pending claim. A receipt mail is sent; its failure does not undo the redemption.",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = RedeemRequest,
    responses(
        (status = 201, description = "Reward redeemed", body = RedemptionResponse),
        (status = 403, description = "User banned", body = ErrorResponse),
        (status = 404, description = "User or reward not found", body = ErrorResponse),
        (status = 422, description = "Reward inactive or insufficient balance", body = ErrorResponse),
    )
)]
pub async fn redeem(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let receipt = state
        .loyalty
        .redeem(&UserId::new(user_id), &req.reward_id)
        .await?;
    Ok((StatusCode::CREATED, Json(RedemptionResponse::from(receipt))))
}

/// Loyalty routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(register_account))
        .route("/accounts/{user_id}", get(get_account))
        .route("/accounts/{user_id}/points", post(add_points))
        .route("/accounts/{user_id}/transactions", get(points_history))
        .route("/accounts/{user_id}/claims", get(user_claims))
        .route("/accounts/{user_id}/redemptions", post(redeem))
        .route("/rewards", get(list_rewards))
}
