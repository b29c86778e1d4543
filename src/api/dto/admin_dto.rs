//! Admin DTOs: claim moderation, adjustments, invite moderation and bans.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::PaginationParams;
use crate::domain::{
    AdminAction, AdminReferralStats, ClaimFilter, ClaimStatus, ClaimedReward, DateWindow,
    LoyaltyStats, ReferralInvite, UserId,
};
use crate::service::{ClaimDecision, InviteDecision};

/// Query parameters for `GET /admin/claims`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClaimListQuery {
    /// Keep only claims in this state.
    pub status: Option<ClaimStatus>,
    /// Case-insensitive substring of reward name or user id.
    pub search: Option<String>,
    /// Age window; `all` when omitted.
    #[serde(default)]
    pub window: DateWindow,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub per_page: Option<u32>,
}

impl ClaimListQuery {
    /// The claim filter part of the query.
    #[must_use]
    pub fn filter(&self) -> ClaimFilter {
        ClaimFilter {
            status: self.status,
            search: self.search.clone(),
            window: self.window,
        }
    }

    /// The pagination part of the query, with defaults filled in.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for `PUT /admin/claims/{claim_id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimStatusRequest {
    /// Target state.
    pub status: ClaimStatus,
    /// Acting admin.
    pub admin_id: String,
    /// Optional notes stored on the claim.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A moderated claim with its audit entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimDecisionResponse {
    /// Claim after the decision.
    pub claim: ClaimedReward,
    /// Audit entry.
    pub action: AdminAction,
}

impl From<ClaimDecision> for ClaimDecisionResponse {
    fn from(decision: ClaimDecision) -> Self {
        Self {
            claim: decision.claim,
            action: decision.action,
        }
    }
}

/// Request body for `POST /admin/claims/bulk-approve`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkApproveRequest {
    /// Acting admin.
    pub admin_id: String,
    /// Filtered view to approve; pending claims only are touched.
    #[serde(default)]
    pub filter: ClaimFilter,
}

/// Response body for `POST /admin/claims/bulk-approve`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkApproveResponse {
    /// Number of claims approved.
    pub approved: usize,
    /// Each approval with its audit entry.
    pub decisions: Vec<ClaimDecisionResponse>,
}

/// Request body for `POST /admin/points-adjustments`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Account to adjust.
    pub user_id: UserId,
    /// Signed, non-zero delta.
    pub points: i64,
    /// Mandatory reason.
    pub reason: String,
    /// Acting admin.
    pub admin_id: String,
}

/// Request body for `POST /admin/invites/{invite_id}/block`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockInviteRequest {
    /// Mandatory reason.
    #[serde(default)]
    pub reason: String,
    /// Acting admin.
    pub admin_id: String,
}

/// Request body carrying only the acting admin.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminActorRequest {
    /// Acting admin.
    pub admin_id: String,
}

/// An invite decision; `action` is `null` for no-ops.
#[derive(Debug, Serialize, ToSchema)]
pub struct InviteDecisionResponse {
    /// Invite after the decision.
    pub invite: ReferralInvite,
    /// Audit entry, if the invite changed.
    pub action: Option<AdminAction>,
}

impl From<InviteDecision> for InviteDecisionResponse {
    fn from(decision: InviteDecision) -> Self {
        Self {
            invite: decision.invite,
            action: decision.action,
        }
    }
}

/// Request body for `POST /admin/users/{user_id}/ban`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BanUserRequest {
    /// Address recorded with the ban.
    #[serde(default)]
    pub email: String,
    /// Mandatory reason.
    #[serde(default)]
    pub reason: String,
    /// Acting admin.
    pub admin_id: String,
}

/// Response body for `POST /admin/invites/expire`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpireInvitesResponse {
    /// Invites moved to `expired` by this sweep.
    pub expired: Vec<ReferralInvite>,
}

/// Response body for `GET /admin/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatsResponse {
    /// Loyalty aggregates.
    pub loyalty: LoyaltyStats,
    /// Referral aggregates.
    pub referrals: AdminReferralStats,
    /// Number of banned users.
    pub banned_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_query_splits_into_filter_and_pagination() {
        let query = ClaimListQuery {
            status: Some(ClaimStatus::Pending),
            search: Some("voucher".into()),
            window: DateWindow::Week,
            page: Some(3),
            per_page: None,
        };
        let filter = query.filter();
        assert_eq!(filter.status, Some(ClaimStatus::Pending));
        assert_eq!(filter.search.as_deref(), Some("voucher"));
        assert_eq!(filter.window, DateWindow::Week);

        let pagination = query.pagination();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.per_page, 20);
    }
}
