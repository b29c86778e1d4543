//! Referral handlers: codes, invites, verification, conversion and signup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    ConversionResponse, GenerateCodeRequest, InviteResponse, SendInviteRequest, SignupRequest,
    SignupResponse, UserReferralResponse, VerifyInviteRequest,
};
use crate::app_state::AppState;
use crate::domain::{InviteId, ReferralCode, ReferralInvite, UserId};
use crate::error::{ErrorResponse, RewardsError};

/// `POST /referrals/codes` — Generate a referral code.
///
/// # Errors
///
/// Returns [`RewardsError::UserNotFound`] if the user has no loyalty account.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/codes",
    tag = "Referrals",
    summary = "Generate a referral code",
    description = "Creates a new active code for the user and deactivates their previous one.",
    request_body = GenerateCodeRequest,
    responses(
        (status = 201, description = "Code generated", body = ReferralCode),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn generate_code(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let code = state.referrals.generate_code(&req.user_id).await?;
    Ok((StatusCode::CREATED, Json(code)))
}

/// `POST /referrals/invites` — Invite an address.
///
/// # Errors
///
/// Returns [`RewardsError`] for a bad address, a referrer without a code,
/// a banned referrer or a repeated invite.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/invites",
    tag = "Referrals",
    summary = "Send an invite",
    description = "Creates a pending invite and mails the invitation. At most one invite per (referrer, address) pair.",
    request_body = SendInviteRequest,
    responses(
        (status = 201, description = "Invite sent", body = InviteResponse),
        (status = 400, description = "Missing or malformed address", body = ErrorResponse),
        (status = 403, description = "Referrer banned", body = ErrorResponse),
        (status = 404, description = "Referrer has no code", body = ErrorResponse),
        (status = 409, description = "Address already invited", body = ErrorResponse),
    )
)]
pub async fn send_invite(
    State(state): State<AppState>,
    Json(req): Json<SendInviteRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let receipt = state
        .referrals
        .send_invite(&req.inviter_id, &req.invitee_email)
        .await?;
    Ok((StatusCode::CREATED, Json(InviteResponse::from(receipt))))
}

/// `POST /referrals/verify` — Verify an invite.
///
/// # Errors
///
/// Returns [`RewardsError`] when no invite matches or it is not pending.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/verify",
    tag = "Referrals",
    summary = "Verify an invite",
    description = "Moves the pending invite matching (code, email, token) to verified.",
    request_body = VerifyInviteRequest,
    responses(
        (status = 200, description = "Invite verified", body = ReferralInvite),
        (status = 404, description = "No matching invite", body = ErrorResponse),
        (status = 409, description = "Invite already processed", body = ErrorResponse),
    )
)]
pub async fn verify_invite(
    State(state): State<AppState>,
    Json(req): Json<VerifyInviteRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let invite = state
        .referrals
        .verify(&req.referral_code, &req.email, &req.token)
        .await?;
    Ok(Json(invite))
}

/// `POST /referrals/invites/{invite_id}/convert` — Convert an invite.
///
/// # Errors
///
/// Returns [`RewardsError`] for unknown invites or blocked/expired ones.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/invites/{invite_id}/convert",
    tag = "Referrals",
    summary = "Convert an invite",
    description = "Marks the invite converted and credits the bounty to the referrer exactly once. Converting an already converted invite is a no-op.",
    params(("invite_id" = Uuid, Path, description = "Invite identifier")),
    responses(
        (status = 200, description = "Invite converted", body = ConversionResponse),
        (status = 404, description = "Invite not found", body = ErrorResponse),
        (status = 409, description = "Invite blocked or expired", body = ErrorResponse),
    )
)]
pub async fn convert_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<Uuid>,
) -> Result<impl IntoResponse, RewardsError> {
    let receipt = state
        .referrals
        .convert(InviteId::from_uuid(invite_id))
        .await?;
    Ok(Json(ConversionResponse::from(receipt)))
}

/// `POST /signup` — Complete a signup, converting a matching invite.
///
/// # Errors
///
/// Returns [`RewardsError::MissingField`] for a missing email or password.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    tag = "Referrals",
    summary = "Complete signup",
    description = "Registers a signup; if a referral code is given and an open invite matches (code, email), the invite is converted.",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Signup recorded", body = SignupResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(RewardsError::MissingField("email"));
    }
    if req.password.as_deref().is_none_or(str::is_empty) {
        return Err(RewardsError::MissingField("password"));
    }
    let outcome = state
        .referrals
        .complete_signup(&email, req.referral_code.as_deref())
        .await?;
    Ok(Json(SignupResponse::new(email, outcome)))
}

/// `GET /referrals/users/{user_id}` — A user's referral overview.
#[utoipa::path(
    get,
    path = "/api/v1/referrals/users/{user_id}",
    tag = "Referrals",
    summary = "Referral overview",
    description = "Returns per-user referral stats, the referrer profile if any, and the user's invites.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Referral overview", body = UserReferralResponse),
    )
)]
pub async fn user_referrals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let user_id = UserId::new(user_id);
    Json(UserReferralResponse {
        stats: state.referrals.user_stats(&user_id).await,
        profile: state.referrals.profile(&user_id).await.ok(),
        invites: state.referrals.invites_for(&user_id).await,
    })
}

/// Referral routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/referrals/codes", post(generate_code))
        .route("/referrals/invites", post(send_invite))
        .route("/referrals/verify", post(verify_invite))
        .route("/referrals/invites/{invite_id}/convert", post(convert_invite))
        .route("/referrals/users/{user_id}", get(user_referrals))
        .route("/signup", post(signup))
}
