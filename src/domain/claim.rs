//! Claimed rewards and their moderation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ClaimId, RewardId, UserId};

/// Moderation state of a claim.
///
/// ```text
/// pending ──► approved ──► delivered
///    │
///    └──────► cancelled
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Awaiting admin review.
    Pending,
    /// Accepted, awaiting fulfilment.
    Approved,
    /// Fulfilled.
    Delivered,
    /// Rejected by an admin.
    Cancelled,
}

impl ClaimStatus {
    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Delivered)
        )
    }

    /// Returns `true` for states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A user's redemption of a catalog reward.
///
/// `reward_name` and `points_cost` are copied from the catalog at claim time
/// so later catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimedReward {
    /// Claim identifier.
    pub id: ClaimId,
    /// Weak reference to the catalog entry.
    pub reward_id: RewardId,
    /// Reward name at claim time.
    pub reward_name: String,
    /// Points debited for this claim.
    pub points_cost: i64,
    /// Claimant.
    pub user_id: UserId,
    /// Claimant display name at claim time.
    pub username: String,
    /// Claim timestamp.
    pub claimed_at: DateTime<Utc>,
    /// Moderation state.
    pub status: ClaimStatus,
    /// Notes left by the last moderating admin.
    pub admin_notes: Option<String>,
}

/// Relative date window for admin claim views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    /// No date restriction.
    #[default]
    All,
    /// Claimed less than a day ago.
    Today,
    /// Claimed at most 7 whole days ago.
    Week,
    /// Claimed at most 30 whole days ago.
    Month,
}

impl DateWindow {
    fn max_age_days(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Today => Some(0),
            Self::Week => Some(7),
            Self::Month => Some(30),
        }
    }
}

/// Filter applied to the admin claim list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClaimFilter {
    /// Keep only claims in this state.
    #[serde(default)]
    pub status: Option<ClaimStatus>,
    /// Case-insensitive substring of the reward name or user id.
    #[serde(default)]
    pub search: Option<String>,
    /// Keep only claims inside this age window.
    #[serde(default)]
    pub window: DateWindow,
}

impl ClaimFilter {
    /// Returns `true` if `claim` passes every criterion, evaluated at `now`.
    #[must_use]
    pub fn matches(&self, claim: &ClaimedReward, now: DateTime<Utc>) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !claim.reward_name.to_lowercase().contains(&needle)
                && !claim.user_id.as_str().to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(status) = self.status
            && claim.status != status
        {
            return false;
        }
        if let Some(max_days) = self.window.max_age_days() {
            let age_days = (now - claim.claimed_at).num_days();
            if age_days > max_days {
                return false;
            }
        }
        true
    }
}
