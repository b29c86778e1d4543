//! Seller payouts and their settlement lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PayoutId, SellerId};

/// Settlement state of a payout.
///
/// ```text
/// pending -> processing -> paid
///    |           |
///    v           v
///  failed <------+
///    |
///    +-> pending   (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Queued, not yet sent.
    Pending,
    /// Handed to the payment provider.
    Processing,
    /// Settled.
    Paid,
    /// Rejected by the provider.
    Failed,
}

impl PayoutStatus {
    /// Returns `true` if `self -> next` is a legal move.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Paid)
                | (Self::Processing, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Returns `true` for states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

/// Money owed to a seller for one sold item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Payout {
    /// Payout identifier.
    pub id: PayoutId,
    /// Recipient.
    pub seller_id: SellerId,
    /// Marketplace order the payout settles.
    pub order_id: String,
    /// Sold item description.
    pub item: String,
    /// Buyer display name.
    pub buyer: String,
    /// Amount in whole currency units.
    pub amount: i64,
    /// Settlement state.
    pub status: PayoutStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a new payout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewPayout {
    /// Marketplace order id; required.
    pub order_id: String,
    /// Sold item description.
    #[serde(default)]
    pub item: String,
    /// Buyer display name.
    #[serde(default)]
    pub buyer: String,
    /// Amount; must be positive.
    pub amount: i64,
}

/// Per-status totals of a seller's payouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PayoutSummary {
    /// Settled amount.
    pub paid: i64,
    /// Queued or in-flight amount.
    pub outstanding: i64,
    /// Amount currently failed.
    pub failed: i64,
    /// Number of payouts.
    pub count: u64,
}

impl PayoutSummary {
    /// Folds one payout into the totals.
    pub fn add(&mut self, payout: &Payout) {
        let bucket = match payout.status {
            PayoutStatus::Paid => &mut self.paid,
            PayoutStatus::Pending | PayoutStatus::Processing => &mut self.outstanding,
            PayoutStatus::Failed => &mut self.failed,
        };
        *bucket = bucket.saturating_add(payout.amount);
        self.count = self.count.saturating_add(1);
    }
}
