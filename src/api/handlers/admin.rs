//! Admin handlers: claim moderation, point adjustments, invite moderation,
//! bans, stats and exports.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::api::dto::{
    AdjustPointsRequest, AdminActorRequest, AdminStatsResponse, BanUserRequest,
    BlockInviteRequest, BulkApproveRequest, BulkApproveResponse, ClaimDecisionResponse,
    ClaimListQuery, ClaimStatusRequest, ExpireInvitesResponse, InviteDecisionResponse, Page,
    PostingResponse,
};
use crate::app_state::AppState;
use crate::domain::{
    AdminAction, BannedUser, ClaimId, ClaimedReward, InviteId, PointsTransaction, ReferralCode,
    ReferralInvite, UserId,
};
use crate::error::{ErrorResponse, RewardsError};

/// `GET /admin/claims` — Filtered, paginated claim list.
#[utoipa::path(
    get,
    path = "/api/v1/admin/claims",
    tag = "Admin",
    summary = "List claims",
    description = "Returns claims newest first, filtered by status, search text and date window.",
    params(ClaimListQuery),
    responses(
        (status = 200, description = "Claim page", body = Page<ClaimedReward>),
    )
)]
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ClaimListQuery>,
) -> impl IntoResponse {
    let claims = state.moderation.claims(&query.filter()).await;
    Json(query.pagination().paginate(claims))
}

/// `PUT /admin/claims/{claim_id}/status` — Moderate a claim.
///
/// # Errors
///
/// Returns [`RewardsError`] for unknown claims or moves outside the
/// transition table.
#[utoipa::path(
    put,
    path = "/api/v1/admin/claims/{claim_id}/status",
    tag = "Admin",
    summary = "Set claim status",
    description = "Moves a claim pending→approved, pending→cancelled or approved→delivered and appends an audit action.",
    params(("claim_id" = Uuid, Path, description = "Claim identifier")),
    request_body = ClaimStatusRequest,
    responses(
        (status = 200, description = "Claim updated", body = ClaimDecisionResponse),
        (status = 404, description = "Claim not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse),
    )
)]
pub async fn set_claim_status(
    State(state): State<AppState>,
    Path(claim_id): Path<Uuid>,
    Json(req): Json<ClaimStatusRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let decision = state
        .moderation
        .set_claim_status(
            ClaimId::from_uuid(claim_id),
            req.status,
            &req.admin_id,
            req.notes,
        )
        .await?;
    Ok(Json(ClaimDecisionResponse::from(decision)))
}

/// `POST /admin/claims/bulk-approve` — Approve every pending claim in a view.
#[utoipa::path(
    post,
    path = "/api/v1/admin/claims/bulk-approve",
    tag = "Admin",
    summary = "Bulk approve claims",
    description = "Approves every pending claim in the filtered view. Non-pending claims are skipped.",
    request_body = BulkApproveRequest,
    responses(
        (status = 200, description = "Claims approved", body = BulkApproveResponse),
    )
)]
pub async fn bulk_approve(
    State(state): State<AppState>,
    Json(req): Json<BulkApproveRequest>,
) -> impl IntoResponse {
    let decisions: Vec<ClaimDecisionResponse> = state
        .moderation
        .bulk_approve(&req.filter, &req.admin_id)
        .await
        .into_iter()
        .map(ClaimDecisionResponse::from)
        .collect();
    Json(BulkApproveResponse {
        approved: decisions.len(),
        decisions,
    })
}

/// `POST /admin/points-adjustments` — Bonus or penalty.
///
/// # Errors
///
/// Returns [`RewardsError`] for a zero delta, an empty reason or an unknown
/// user.
#[utoipa::path(
    post,
    path = "/api/v1/admin/points-adjustments",
    tag = "Admin",
    summary = "Adjust points",
    description = "Posts an admin bonus (positive) or penalty (negative) ledger entry with a mandatory reason.",
    request_body = AdjustPointsRequest,
    responses(
        (status = 200, description = "Adjustment posted", body = PostingResponse),
        (status = 400, description = "Zero delta or missing reason", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn adjust_points(
    State(state): State<AppState>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let outcome = state
        .loyalty
        .adjust_points(&req.user_id, req.points, req.reason, &req.admin_id)
        .await?;
    Ok(Json(PostingResponse::from(outcome)))
}

/// `POST /admin/invites/{invite_id}/block` — Block an invite.
///
/// # Errors
///
/// Returns [`RewardsError`] for an empty reason, an unknown invite or a
/// converted one.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invites/{invite_id}/block",
    tag = "Admin",
    summary = "Block an invite",
    description = "Blocks an open invite with a mandatory reason. Blocking a blocked invite is a no-op.",
    params(("invite_id" = Uuid, Path, description = "Invite identifier")),
    request_body = BlockInviteRequest,
    responses(
        (status = 200, description = "Invite blocked", body = InviteDecisionResponse),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 404, description = "Invite not found", body = ErrorResponse),
        (status = 409, description = "Invite already converted", body = ErrorResponse),
    )
)]
pub async fn block_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<Uuid>,
    Json(req): Json<BlockInviteRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let decision = state
        .moderation
        .block_invite(InviteId::from_uuid(invite_id), &req.reason, &req.admin_id)
        .await?;
    Ok(Json(InviteDecisionResponse::from(decision)))
}

/// `POST /admin/invites/{invite_id}/unblock` — Unblock an invite.
///
/// # Errors
///
/// Returns [`RewardsError::InviteNotFound`] for unknown invites.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invites/{invite_id}/unblock",
    tag = "Admin",
    summary = "Unblock an invite",
    description = "Returns a blocked invite to pending. Unblocking an unblocked invite is a no-op.",
    params(("invite_id" = Uuid, Path, description = "Invite identifier")),
    request_body = AdminActorRequest,
    responses(
        (status = 200, description = "Invite unblocked", body = InviteDecisionResponse),
        (status = 404, description = "Invite not found", body = ErrorResponse),
    )
)]
pub async fn unblock_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<Uuid>,
    Json(req): Json<AdminActorRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let decision = state
        .moderation
        .unblock_invite(InviteId::from_uuid(invite_id), &req.admin_id)
        .await?;
    Ok(Json(InviteDecisionResponse::from(decision)))
}

/// `POST /admin/invites/expire` — Run the expiry sweep now.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invites/expire",
    tag = "Admin",
    summary = "Expire stale invites",
    description = "Moves pending and verified invites older than the configured TTL to expired.",
    responses(
        (status = 200, description = "Sweep finished", body = ExpireInvitesResponse),
    )
)]
pub async fn expire_invites(State(state): State<AppState>) -> impl IntoResponse {
    let expired = state.referrals.expire_stale(Utc::now()).await;
    Json(ExpireInvitesResponse { expired })
}

/// `POST /admin/users/{user_id}/ban` — Ban a user.
///
/// # Errors
///
/// Returns [`RewardsError`] for an empty reason or a user already banned.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{user_id}/ban",
    tag = "Admin",
    summary = "Ban a user",
    description = "Bans a user from redeeming and inviting, and records a ban_user audit action.",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = BanUserRequest,
    responses(
        (status = 200, description = "User banned", body = AdminAction),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 409, description = "Already banned", body = ErrorResponse),
    )
)]
pub async fn ban_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<BanUserRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let action = state
        .moderation
        .ban_user(&UserId::new(user_id), &req.email, &req.reason, &req.admin_id)
        .await?;
    Ok(Json(action))
}

/// `POST /admin/users/{user_id}/unban` — Lift a ban.
///
/// # Errors
///
/// Returns [`RewardsError::UserNotFound`] if the user is not banned.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{user_id}/unban",
    tag = "Admin",
    summary = "Unban a user",
    description = "Lifts a ban and records an unban_user audit action.",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = AdminActorRequest,
    responses(
        (status = 200, description = "User unbanned", body = AdminAction),
        (status = 404, description = "User not banned", body = ErrorResponse),
    )
)]
pub async fn unban_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<AdminActorRequest>,
) -> Result<impl IntoResponse, RewardsError> {
    let action = state
        .moderation
        .unban_user(&UserId::new(user_id), &req.admin_id)
        .await?;
    Ok(Json(action))
}

/// `GET /admin/users/banned` — Current bans.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/banned",
    tag = "Admin",
    summary = "List banned users",
    responses(
        (status = 200, description = "Banned users", body = Vec<BannedUser>),
    )
)]
pub async fn banned_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.moderation.banned_users().await)
}

/// `GET /admin/actions` — Audit log.
#[utoipa::path(
    get,
    path = "/api/v1/admin/actions",
    tag = "Admin",
    summary = "Audit log",
    description = "Returns every admin action, oldest first.",
    responses(
        (status = 200, description = "Audit log", body = Vec<AdminAction>),
    )
)]
pub async fn actions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.moderation.actions().await)
}

/// `GET /admin/stats` — Loyalty and referral aggregates.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "Admin",
    summary = "Program statistics",
    responses(
        (status = 200, description = "Aggregates", body = AdminStatsResponse),
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(AdminStatsResponse {
        loyalty: state.loyalty.stats().await,
        referrals: state.referrals.admin_stats().await,
        banned_users: state.moderation.banned_users().await.len(),
    })
}

/// `GET /admin/export/transactions` — Whole ledger.
#[utoipa::path(
    get,
    path = "/api/v1/admin/export/transactions",
    tag = "Admin",
    summary = "Export the ledger",
    description = "Returns every ledger entry in append order.",
    responses(
        (status = 200, description = "Ledger", body = Vec<PointsTransaction>),
    )
)]
pub async fn export_transactions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.loyalty.transactions().await)
}

/// `GET /admin/export/invites` — Every invite.
#[utoipa::path(
    get,
    path = "/api/v1/admin/export/invites",
    tag = "Admin",
    summary = "Export invites",
    responses(
        (status = 200, description = "Invites", body = Vec<ReferralInvite>),
    )
)]
pub async fn export_invites(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.referrals.invites().await)
}

/// `GET /admin/export/codes` — Every referral code ever issued.
#[utoipa::path(
    get,
    path = "/api/v1/admin/export/codes",
    tag = "Admin",
    summary = "Export referral codes",
    responses(
        (status = 200, description = "Codes", body = Vec<ReferralCode>),
    )
)]
pub async fn export_codes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.referrals.codes().await)
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/claims", get(list_claims))
        .route("/admin/claims/bulk-approve", post(bulk_approve))
        .route("/admin/claims/{claim_id}/status", put(set_claim_status))
        .route("/admin/points-adjustments", post(adjust_points))
        .route("/admin/invites/expire", post(expire_invites))
        .route("/admin/invites/{invite_id}/block", post(block_invite))
        .route("/admin/invites/{invite_id}/unblock", post(unblock_invite))
        .route("/admin/users/banned", get(banned_users))
        .route("/admin/users/{user_id}/ban", post(ban_user))
        .route("/admin/users/{user_id}/unban", post(unban_user))
        .route("/admin/actions", get(actions))
        .route("/admin/stats", get(stats))
        .route("/admin/export/transactions", get(export_transactions))
        .route("/admin/export/invites", get(export_invites))
        .route("/admin/export/codes", get(export_codes))
}
