//! Threshold-table classifiers.
//!
//! Two independent ladders exist and must not be conflated:
//!
//! - [`LoyaltyTier`] classifies **lifetime earned points**
//!   (Bronze 0, Silver 2 000, Gold 5 000, Platinum 10 000).
//! - [`SellerBadge`] classifies **lifetime seller revenue** in currency units
//!   (Verified 0, Pro 150 000, Elite 500 000).
//!
//! A value exactly on a threshold belongs to the higher rung (`>=`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Loyalty tier derived from lifetime earned points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum LoyaltyTier {
    /// Entry tier.
    Bronze,
    /// 2 000 lifetime points.
    Silver,
    /// 5 000 lifetime points.
    Gold,
    /// 10 000 lifetime points.
    Platinum,
}

/// Ordered loyalty threshold table, lowest rung first.
pub const LOYALTY_THRESHOLDS: [(LoyaltyTier, i64); 4] = [
    (LoyaltyTier::Bronze, 0),
    (LoyaltyTier::Silver, 2_000),
    (LoyaltyTier::Gold, 5_000),
    (LoyaltyTier::Platinum, 10_000),
];

impl LoyaltyTier {
    /// Classifies a lifetime points total.
    #[must_use]
    pub fn classify(lifetime_points: i64) -> Self {
        classify_ladder(&LOYALTY_THRESHOLDS, lifetime_points).unwrap_or(Self::Bronze)
    }

    /// Minimum lifetime points required for this tier.
    #[must_use]
    pub const fn threshold(self) -> i64 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 2_000,
            Self::Gold => 5_000,
            Self::Platinum => 10_000,
        }
    }

    /// The next tier up, or `None` at the top of the ladder.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

/// Seller badge derived from lifetime revenue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum SellerBadge {
    /// Default badge for every registered seller.
    Verified,
    /// 150 000 in lifetime revenue.
    Pro,
    /// 500 000 in lifetime revenue.
    Elite,
}

/// Ordered seller badge threshold table, lowest rung first.
pub const BADGE_THRESHOLDS: [(SellerBadge, i64); 3] = [
    (SellerBadge::Verified, 0),
    (SellerBadge::Pro, 150_000),
    (SellerBadge::Elite, 500_000),
];

impl SellerBadge {
    /// Classifies a lifetime revenue total.
    #[must_use]
    pub fn classify(lifetime_revenue: i64) -> Self {
        classify_ladder(&BADGE_THRESHOLDS, lifetime_revenue).unwrap_or(Self::Verified)
    }

    /// Minimum lifetime revenue required for this badge.
    #[must_use]
    pub const fn threshold(self) -> i64 {
        match self {
            Self::Verified => 0,
            Self::Pro => 150_000,
            Self::Elite => 500_000,
        }
    }

    /// The next badge up, or `None` at the top of the ladder.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Verified => Some(Self::Pro),
            Self::Pro => Some(Self::Elite),
            Self::Elite => None,
        }
    }
}

/// Picks the highest rung whose threshold is `<= value`.
fn classify_ladder<T: Copy>(ladder: &[(T, i64)], value: i64) -> Option<T> {
    ladder
        .iter()
        .rev()
        .find(|(_, threshold)| value >= *threshold)
        .map(|(rung, _)| *rung)
}

/// Progress from the current loyalty tier towards the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TierProgress {
    /// Tier the lifetime total currently classifies as.
    pub current: LoyaltyTier,
    /// Next tier, `None` at Platinum.
    pub next: Option<LoyaltyTier>,
    /// Lifetime points still needed for the next tier (0 at Platinum).
    pub points_to_next: i64,
    /// Whole-percent progress through the current band, 0..=100.
    pub percent: u8,
}

impl TierProgress {
    /// Computes progress for a lifetime points total.
    #[must_use]
    pub fn for_lifetime(lifetime_points: i64) -> Self {
        let current = LoyaltyTier::classify(lifetime_points);
        let Some(next) = current.next() else {
            return Self {
                current,
                next: None,
                points_to_next: 0,
                percent: 100,
            };
        };
        let band = next.threshold() - current.threshold();
        let into_band = (lifetime_points - current.threshold()).clamp(0, band);
        let percent = u8::try_from(into_band * 100 / band).unwrap_or(100);
        Self {
            current,
            next: Some(next),
            points_to_next: next.threshold() - lifetime_points.max(current.threshold()),
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loyalty_thresholds_are_inclusive() {
        assert_eq!(LoyaltyTier::classify(0), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::classify(1_999), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::classify(2_000), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::classify(4_999), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::classify(5_000), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::classify(9_999), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::classify(10_000), LoyaltyTier::Platinum);
        assert_eq!(LoyaltyTier::classify(1_000_000), LoyaltyTier::Platinum);
    }

    #[test]
    fn negative_lifetime_is_bronze() {
        assert_eq!(LoyaltyTier::classify(-50), LoyaltyTier::Bronze);
    }

    #[test]
    fn loyalty_classification_is_monotonic() {
        let mut previous = LoyaltyTier::classify(0);
        for points in (0..12_000).step_by(37) {
            let tier = LoyaltyTier::classify(points);
            assert!(tier >= previous, "tier dropped at {points}");
            assert_eq!(tier, LoyaltyTier::classify(points));
            previous = tier;
        }
    }

    #[test]
    fn badge_thresholds_are_inclusive() {
        assert_eq!(SellerBadge::classify(0), SellerBadge::Verified);
        assert_eq!(SellerBadge::classify(149_999), SellerBadge::Verified);
        assert_eq!(SellerBadge::classify(150_000), SellerBadge::Pro);
        assert_eq!(SellerBadge::classify(342_330), SellerBadge::Pro);
        assert_eq!(SellerBadge::classify(500_000), SellerBadge::Elite);
    }

    #[test]
    fn ladders_are_independent() {
        // 5 000 is Gold on the points ladder but still Verified as revenue.
        assert_eq!(LoyaltyTier::classify(5_000), LoyaltyTier::Gold);
        assert_eq!(SellerBadge::classify(5_000), SellerBadge::Verified);
    }

    #[test]
    fn threshold_accessors_match_tables() {
        for (tier, threshold) in LOYALTY_THRESHOLDS {
            assert_eq!(tier.threshold(), threshold);
        }
        for (badge, threshold) in BADGE_THRESHOLDS {
            assert_eq!(badge.threshold(), threshold);
        }
    }

    #[test]
    fn progress_within_silver_band() {
        let progress = TierProgress::for_lifetime(3_200);
        assert_eq!(progress.current, LoyaltyTier::Silver);
        assert_eq!(progress.next, Some(LoyaltyTier::Gold));
        assert_eq!(progress.points_to_next, 1_800);
        assert_eq!(progress.percent, 40);
    }

    #[test]
    fn progress_at_platinum_is_complete() {
        let progress = TierProgress::for_lifetime(12_000);
        assert_eq!(progress.next, None);
        assert_eq!(progress.points_to_next, 0);
        assert_eq!(progress.percent, 100);
    }
}
