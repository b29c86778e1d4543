//! Reward catalog: static reference data of redeemable items.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RewardId;

/// Reward family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RewardCategory {
    /// Discount voucher.
    Voucher,
    /// Marketplace service (returns, delivery, authentication).
    Service,
    /// Time-limited membership perk.
    Membership,
    /// Marketplace gift card.
    GiftCard,
}

/// A redeemable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyReward {
    /// Catalog key.
    pub id: RewardId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Price in points, always positive.
    pub points_cost: i64,
    /// Reward family.
    pub category: RewardCategory,
    /// Only active entries can be redeemed.
    pub is_active: bool,
    /// Optional terms and conditions.
    pub terms: Option<String>,
}

/// Catalog in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardCatalog {
    rewards: Vec<LoyaltyReward>,
}

impl RewardCatalog {
    /// Builds a catalog from the given entries, keeping their order.
    #[must_use]
    pub fn new(rewards: Vec<LoyaltyReward>) -> Self {
        Self { rewards }
    }

    /// The Trendies marketplace launch catalog.
    #[must_use]
    pub fn standard() -> Self {
        let entry = |id: &str,
                     name: &str,
                     description: &str,
                     points_cost: i64,
                     category: RewardCategory,
                     terms: &str| LoyaltyReward {
            id: RewardId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            points_cost,
            category,
            is_active: true,
            terms: Some(terms.to_string()),
        };
        Self::new(vec![
            entry(
                "reward_1",
                "€5 Voucher",
                "€5 discount on your next purchase",
                250,
                RewardCategory::Voucher,
                "Valid for 30 days. Cannot be combined with other offers.",
            ),
            entry(
                "reward_2",
                "Free 2h Return",
                "Free 2-hour return service for any item",
                100,
                RewardCategory::Service,
                "Valid within 30 days of purchase.",
            ),
            entry(
                "reward_3",
                "Premium Delivery",
                "Free premium delivery on your next order",
                750,
                RewardCategory::Service,
                "Valid for orders over €50.",
            ),
            entry(
                "reward_4",
                "Free Authentication",
                "Free authentication service for luxury items",
                1_000,
                RewardCategory::Service,
                "Valid for items up to €5,000 value.",
            ),
            entry(
                "reward_5",
                "VIP Silver (1 month)",
                "1 month of VIP Silver membership benefits",
                3_000,
                RewardCategory::Membership,
                "Includes priority support and exclusive access.",
            ),
            entry(
                "reward_6",
                "€20 Gift Card",
                "€20 gift card for Trendies marketplace",
                5_000,
                RewardCategory::GiftCard,
                "Valid for 6 months. Cannot be exchanged for cash.",
            ),
        ])
    }

    /// Active entries in catalog order.
    #[must_use]
    pub fn list_available(&self) -> Vec<LoyaltyReward> {
        self.rewards.iter().filter(|r| r.is_active).cloned().collect()
    }

    /// Looks up an entry regardless of its active flag.
    #[must_use]
    pub fn get(&self, reward_id: &RewardId) -> Option<&LoyaltyReward> {
        self.rewards.iter().find(|r| &r.id == reward_id)
    }

    /// Every entry, active or not.
    #[must_use]
    pub fn all(&self) -> &[LoyaltyReward] {
        &self.rewards
    }

    /// Number of entries, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_active_and_ordered() {
        let catalog = RewardCatalog::standard();
        let available = catalog.list_available();
        assert_eq!(available.len(), 6);
        let ids: Vec<&str> = available.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            ["reward_1", "reward_2", "reward_3", "reward_4", "reward_5", "reward_6"]
        );
        assert!(available.iter().all(|r| r.points_cost > 0));
    }

    #[test]
    fn inactive_entries_are_hidden_but_addressable() {
        let mut rewards = RewardCatalog::standard().all().to_vec();
        if let Some(first) = rewards.first_mut() {
            first.is_active = false;
        }
        let catalog = RewardCatalog::new(rewards);

        assert_eq!(catalog.list_available().len(), 5);
        let hidden = catalog.get(&RewardId::new("reward_1"));
        assert!(hidden.is_some_and(|r| !r.is_active));
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn unknown_reward_is_none() {
        assert!(RewardCatalog::standard().get(&RewardId::new("nope")).is_none());
    }
}
