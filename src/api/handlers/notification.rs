//! Mail forwarders.
//!
//! These endpoints let other parts of the platform send the standard
//! redemption and referral mails without going through a state change.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RedemptionNoticeRequest, ReferralNoticeRequest, required};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RewardsError};
use crate::notify::{DispatchReceipt, messages};

/// `POST /notifications/redemption` — Send a redemption receipt.
///
/// # Errors
///
/// Returns [`RewardsError::MissingField`] for a missing address or reward
/// name, or the dispatcher's error.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/redemption",
    tag = "Notifications",
    summary = "Send a redemption mail",
    request_body = RedemptionNoticeRequest,
    responses(
        (status = 200, description = "Mail accepted", body = DispatchReceipt),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 500, description = "Dispatch failed", body = ErrorResponse),
    )
)]
pub async fn send_redemption(
    State(state): State<AppState>,
    Json(req): Json<RedemptionNoticeRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let to = required(req.to_email.as_deref(), "to_email")?;
    let reward_name = required(req.reward_name.as_deref(), "reward_name")?;
    let message = messages::loyalty_redemption(
        to,
        &req.username,
        reward_name,
        req.points_cost,
        req.remaining_points,
    );
    let receipt = state.mailer.dispatch(message).await?;
    tracing::info!(%to, message_id = %receipt.message_id, "redemption mail forwarded");
    Ok(Json(receipt))
}

/// `POST /notifications/referral` — Send a referral invitation.
///
/// # Errors
///
/// Returns [`RewardsError::MissingField`] for a missing address or code, or
/// the dispatcher's error.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/referral",
    tag = "Notifications",
    summary = "Send a referral mail",
    request_body = ReferralNoticeRequest,
    responses(
        (status = 200, description = "Mail accepted", body = DispatchReceipt),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 500, description = "Dispatch failed", body = ErrorResponse),
    )
)]
pub async fn send_referral(
    State(state): State<AppState>,
    Json(req): Json<ReferralNoticeRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let to = required(req.invite_email.as_deref(), "invite_email")?;
    let code = required(req.referral_code.as_deref(), "referral_code")?;
    let message = messages::referral_invite(&req.inviter_name, to, code, &req.token);
    let receipt = state.mailer.dispatch(message).await?;
    tracing::info!(%to, message_id = %receipt.message_id, "referral mail forwarded");
    Ok(Json(receipt))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/redemption", post(send_redemption))
        .route("/notifications/referral", post(send_referral))
}
