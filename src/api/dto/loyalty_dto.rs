//! Loyalty DTOs: accounts, postings and redemptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ClaimedReward, LoyaltyAccount, LoyaltyTier, PointsTransaction, PostingOutcome, RewardId,
    TierProgress, UserId,
};
use crate::service::RedemptionReceipt;

/// Request body for `POST /accounts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterAccountRequest {
    /// Caller-chosen user key.
    pub user_id: UserId,
    /// Contact address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// An account with its derived tier and progress.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Account owner.
    pub user_id: UserId,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Spendable balance.
    pub total_points: i64,
    /// Lifetime earned.
    pub lifetime_points: i64,
    /// Tier derived from `lifetime_points`.
    pub tier: LoyaltyTier,
    /// Progress towards the next tier.
    pub progress: TierProgress,
    /// Opening timestamp.
    pub joined_at: DateTime<Utc>,
}

impl From<LoyaltyAccount> for AccountResponse {
    fn from(account: LoyaltyAccount) -> Self {
        Self {
            tier: account.tier(),
            progress: account.tier_progress(),
            user_id: account.user_id,
            email: account.email,
            name: account.name,
            total_points: account.total_points,
            lifetime_points: account.lifetime_points,
            joined_at: account.joined_at,
        }
    }
}

/// Request body for `POST /accounts/{user_id}/points`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPointsRequest {
    /// Signed, non-zero delta.
    pub points: i64,
    /// Ledger description.
    pub description: String,
    /// Optional link to a reward, sale or invite.
    #[serde(default)]
    pub reference_id: Option<String>,
}

/// Result of a ledger posting.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostingResponse {
    /// The appended entry.
    pub transaction: PointsTransaction,
    /// Account after the posting.
    pub account: AccountResponse,
    /// New tier, when the posting changed it.
    pub tier_changed_to: Option<LoyaltyTier>,
}

impl From<PostingOutcome> for PostingResponse {
    fn from(outcome: PostingOutcome) -> Self {
        Self {
            tier_changed_to: outcome.tier_change(),
            transaction: outcome.transaction,
            account: outcome.account.into(),
        }
    }
}

/// Request body for `POST /accounts/{user_id}/redemptions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    /// Catalog entry to redeem.
    pub reward_id: RewardId,
}

/// Response body for a successful redemption (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionResponse {
    /// New claim in `pending`.
    pub claim: ClaimedReward,
    /// Debit entry.
    pub transaction: PointsTransaction,
    /// Account after the debit.
    pub account: AccountResponse,
    /// Whether the receipt mail went out.
    pub notification_sent: bool,
}

impl From<RedemptionReceipt> for RedemptionResponse {
    fn from(receipt: RedemptionReceipt) -> Self {
        Self {
            claim: receipt.claim,
            transaction: receipt.transaction,
            account: receipt.account.into(),
            notification_sent: receipt.notification_sent,
        }
    }
}
