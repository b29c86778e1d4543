//! Loyalty view of a platform user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::tier::{LoyaltyTier, TierProgress};

/// A loyalty member's balance sheet.
///
/// `total_points` is the spendable balance and never drops below zero.
/// `lifetime_points` only ever grows. The tier is not stored; it is always
/// recomputed from `lifetime_points`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    /// Account owner.
    pub user_id: UserId,
    /// Contact address used for notifications.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Spendable balance.
    pub total_points: i64,
    /// Sum of every credit ever applied.
    pub lifetime_points: i64,
    /// Registration timestamp.
    pub joined_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    /// Opens an empty account.
    #[must_use]
    pub fn new(user_id: UserId, email: String, name: String) -> Self {
        Self {
            user_id,
            email,
            name,
            total_points: 0,
            lifetime_points: 0,
            joined_at: Utc::now(),
        }
    }

    /// Applies a signed delta.
    ///
    /// The balance is clamped at zero instead of rejecting an overdraft;
    /// callers check affordability before debiting. Only credits count
    /// towards the lifetime total.
    pub fn apply_delta(&mut self, delta: i64) {
        self.total_points = self.total_points.saturating_add(delta).max(0);
        if delta > 0 {
            self.lifetime_points = self.lifetime_points.saturating_add(delta);
        }
    }

    /// Current loyalty tier.
    #[must_use]
    pub fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::classify(self.lifetime_points)
    }

    /// Progress towards the next tier.
    #[must_use]
    pub fn tier_progress(&self) -> TierProgress {
        TierProgress::for_lifetime(self.lifetime_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> LoyaltyAccount {
        LoyaltyAccount::new(
            UserId::new("user_1"),
            "stephen@trendies.com".to_string(),
            "Stephen Neary".to_string(),
        )
    }

    #[test]
    fn new_account_is_empty_bronze() {
        let acct = account();
        assert_eq!(acct.total_points, 0);
        assert_eq!(acct.lifetime_points, 0);
        assert_eq!(acct.tier(), LoyaltyTier::Bronze);
    }

    #[test]
    fn credit_moves_both_totals() {
        let mut acct = account();
        acct.apply_delta(2_400);
        assert_eq!(acct.total_points, 2_400);
        assert_eq!(acct.lifetime_points, 2_400);
        assert_eq!(acct.tier(), LoyaltyTier::Silver);
    }

    #[test]
    fn debit_leaves_lifetime_untouched() {
        let mut acct = account();
        acct.apply_delta(1_000);
        acct.apply_delta(-250);
        assert_eq!(acct.total_points, 750);
        assert_eq!(acct.lifetime_points, 1_000);
    }

    #[test]
    fn overdraft_is_clamped_to_zero() {
        let mut acct = account();
        acct.apply_delta(100);
        acct.apply_delta(-500);
        assert_eq!(acct.total_points, 0);
        assert_eq!(acct.lifetime_points, 100);
    }
}
