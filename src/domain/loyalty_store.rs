//! Loyalty store: accounts, points ledger, claims and the reward catalog.
//!
//! [`LoyaltyState`] holds the plain data and implements every rule
//! synchronously. [`LoyaltyStore`] wraps it in a single
//! [`tokio::sync::RwLock`], which serializes all writers: two redemptions for
//! the same account can never both observe the pre-debit balance, and a
//! redemption's claim and debit become visible together.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::account::LoyaltyAccount;
use super::catalog::{LoyaltyReward, RewardCatalog};
use super::claim::{ClaimFilter, ClaimStatus, ClaimedReward};
use super::ledger::{Ledger, PointsTransaction, TransactionType};
use super::tier::LoyaltyTier;
use super::{ClaimId, RewardId, TransactionId, UserId};
use crate::error::RewardsError;

/// Result of posting points to an account.
#[derive(Debug, Clone)]
pub struct PostingOutcome {
    /// The appended ledger entry.
    pub transaction: PointsTransaction,
    /// Account state after the posting.
    pub account: LoyaltyAccount,
    /// Tier before the posting.
    pub previous_tier: LoyaltyTier,
}

impl PostingOutcome {
    /// Returns the new tier if the posting moved the account up a tier.
    #[must_use]
    pub fn tier_change(&self) -> Option<LoyaltyTier> {
        let tier = self.account.tier();
        (tier != self.previous_tier).then_some(tier)
    }
}

/// Result of a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// Newly created claim in `pending`.
    pub claim: ClaimedReward,
    /// Debit entry referencing the reward.
    pub transaction: PointsTransaction,
    /// Account state after the debit.
    pub account: LoyaltyAccount,
}

/// A claim status change.
#[derive(Debug, Clone)]
pub struct ClaimTransition {
    /// Status before the change.
    pub from: ClaimStatus,
    /// Claim after the change.
    pub claim: ClaimedReward,
}

/// Aggregate loyalty counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct LoyaltyStats {
    /// Catalog entries, active or not.
    pub total_rewards: usize,
    /// Claims ever created.
    pub total_claimed: usize,
    /// Claims awaiting review.
    pub pending_approval: usize,
    /// Sum of claim costs.
    pub total_points_redeemed: i64,
    /// Sum of `earned` ledger entries.
    pub total_points_earned: i64,
}

/// Plain loyalty data and its rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoyaltyState {
    accounts: HashMap<UserId, LoyaltyAccount>,
    ledger: Ledger,
    claims: Vec<ClaimedReward>,
    catalog: RewardCatalog,
}

impl LoyaltyState {
    /// Creates an empty state with the given catalog.
    #[must_use]
    pub fn with_catalog(catalog: RewardCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::AlreadyExists`] if the user already has one.
    pub fn register(
        &mut self,
        user_id: UserId,
        email: String,
        name: String,
    ) -> Result<LoyaltyAccount, RewardsError> {
        if self.accounts.contains_key(&user_id) {
            return Err(RewardsError::AlreadyExists(format!("account {user_id}")));
        }
        let account = LoyaltyAccount::new(user_id.clone(), email, name);
        self.accounts.insert(user_id, account.clone());
        Ok(account)
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users.
    pub fn account(&self, user_id: &UserId) -> Result<&LoyaltyAccount, RewardsError> {
        self.accounts
            .get(user_id)
            .ok_or_else(|| RewardsError::UserNotFound(user_id.clone()))
    }

    /// Posts a delta with a sign-derived type (`earned` / `redeemed`).
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users. Nothing
    /// else can fail: overdrafts are clamped at zero.
    pub fn add_points(
        &mut self,
        user_id: &UserId,
        delta: i64,
        description: String,
        reference_id: Option<String>,
    ) -> Result<PostingOutcome, RewardsError> {
        self.post(
            user_id,
            TransactionType::from_delta(delta),
            delta,
            description,
            reference_id,
        )
    }

    /// Posts an admin adjustment (`bonus` / `penalty`).
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users.
    pub fn adjust_points(
        &mut self,
        user_id: &UserId,
        delta: i64,
        description: String,
    ) -> Result<PostingOutcome, RewardsError> {
        self.post(
            user_id,
            TransactionType::adjustment(delta),
            delta,
            description,
            None,
        )
    }

    fn post(
        &mut self,
        user_id: &UserId,
        kind: TransactionType,
        delta: i64,
        description: String,
        reference_id: Option<String>,
    ) -> Result<PostingOutcome, RewardsError> {
        let account = self
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| RewardsError::UserNotFound(user_id.clone()))?;
        let previous_tier = account.tier();
        account.apply_delta(delta);
        let account = account.clone();

        let transaction = PointsTransaction {
            id: TransactionId::new(),
            user_id: user_id.clone(),
            kind,
            points: delta,
            description,
            reference_id,
            created_at: Utc::now(),
        };
        self.ledger.append(transaction.clone());

        Ok(PostingOutcome {
            transaction,
            account,
            previous_tier,
        })
    }

    /// Redeems a catalog reward for a user.
    ///
    /// Validation happens before any write; once it passes, the claim is
    /// recorded and the balance debited with no failure point in between.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::UserNotFound`] for unknown users.
    /// - [`RewardsError::RewardNotFound`] if the reward is not in the catalog.
    /// - [`RewardsError::RewardInactive`] if the reward is disabled.
    /// - [`RewardsError::InsufficientBalance`] if the balance is below cost.
    pub fn redeem(
        &mut self,
        user_id: &UserId,
        reward_id: &RewardId,
    ) -> Result<Redemption, RewardsError> {
        let account = self.account(user_id)?;
        let reward = self
            .catalog
            .get(reward_id)
            .ok_or_else(|| RewardsError::RewardNotFound(reward_id.clone()))?;
        if !reward.is_active {
            return Err(RewardsError::RewardInactive(reward_id.clone()));
        }
        if account.total_points < reward.points_cost {
            return Err(RewardsError::InsufficientBalance {
                available: account.total_points,
                required: reward.points_cost,
            });
        }

        let claim = ClaimedReward {
            id: ClaimId::new(),
            reward_id: reward.id.clone(),
            reward_name: reward.name.clone(),
            points_cost: reward.points_cost,
            user_id: user_id.clone(),
            username: account.name.clone(),
            claimed_at: Utc::now(),
            status: ClaimStatus::Pending,
            admin_notes: None,
        };
        let description = format!("Redeemed: {}", reward.name);
        let cost = reward.points_cost;

        self.claims.push(claim.clone());
        let posting = self.add_points(
            user_id,
            -cost,
            description,
            Some(reward_id.as_str().to_string()),
        )?;

        Ok(Redemption {
            claim,
            transaction: posting.transaction,
            account: posting.account,
        })
    }

    /// Moves a claim to a new status, enforcing the transition table.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::ClaimNotFound`] for unknown claims.
    /// - [`RewardsError::InvalidTransition`] if the move is not allowed.
    pub fn set_claim_status(
        &mut self,
        claim_id: ClaimId,
        status: ClaimStatus,
        notes: Option<String>,
    ) -> Result<ClaimTransition, RewardsError> {
        let claim = self
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or(RewardsError::ClaimNotFound(claim_id))?;
        let from = claim.status;
        if !from.can_transition_to(status) {
            return Err(RewardsError::InvalidTransition {
                from: from.as_str(),
                to: status.as_str(),
            });
        }
        claim.status = status;
        claim.admin_notes = notes;
        Ok(ClaimTransition {
            from,
            claim: claim.clone(),
        })
    }

    /// Looks up a claim.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::ClaimNotFound`] for unknown claims.
    pub fn claim(&self, claim_id: ClaimId) -> Result<&ClaimedReward, RewardsError> {
        self.claims
            .iter()
            .find(|c| c.id == claim_id)
            .ok_or(RewardsError::ClaimNotFound(claim_id))
    }

    /// Claims passing `filter`, newest first.
    #[must_use]
    pub fn filter_claims(&self, filter: &ClaimFilter, now: DateTime<Utc>) -> Vec<ClaimedReward> {
        self.claims
            .iter()
            .rev()
            .filter(|c| filter.matches(c, now))
            .cloned()
            .collect()
    }

    /// Claims made by one user, newest first.
    #[must_use]
    pub fn claims_for(&self, user_id: &UserId) -> Vec<ClaimedReward> {
        self.claims
            .iter()
            .rev()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every claim in creation order.
    #[must_use]
    pub fn claims(&self) -> &[ClaimedReward] {
        &self.claims
    }

    /// The full ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The reward catalog.
    #[must_use]
    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    /// Dashboard counters.
    #[must_use]
    pub fn stats(&self) -> LoyaltyStats {
        LoyaltyStats {
            total_rewards: self.catalog.len(),
            total_claimed: self.claims.len(),
            pending_approval: self
                .claims
                .iter()
                .filter(|c| c.status == ClaimStatus::Pending)
                .count(),
            total_points_redeemed: self.claims.iter().map(|c| c.points_cost).sum(),
            total_points_earned: self.ledger.total_earned(),
        }
    }
}

/// Concurrent handle to the loyalty state.
#[derive(Debug, Default)]
pub struct LoyaltyStore {
    state: RwLock<LoyaltyState>,
}

impl LoyaltyStore {
    /// Creates a store with an empty state and the given catalog.
    #[must_use]
    pub fn new(catalog: RewardCatalog) -> Self {
        Self {
            state: RwLock::new(LoyaltyState::with_catalog(catalog)),
        }
    }

    /// Runs `f` under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&LoyaltyState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` under the write lock; all mutations go through here.
    pub async fn write<R>(&self, f: impl FnOnce(&mut LoyaltyState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Clones the whole state for persistence.
    pub async fn snapshot(&self) -> LoyaltyState {
        self.state.read().await.clone()
    }

    /// Replaces the whole state with a restored snapshot.
    pub async fn restore(&self, state: LoyaltyState) {
        *self.state.write().await = state;
    }

    /// Active catalog entries in catalog order.
    pub async fn list_available(&self) -> Vec<LoyaltyReward> {
        self.read(|s| s.catalog.list_available()).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ledger::replay;

    fn user() -> UserId {
        UserId::new("user_1")
    }

    fn state_with_balance(points: i64) -> LoyaltyState {
        let mut state = LoyaltyState::with_catalog(RewardCatalog::standard());
        let Ok(_) = state.register(user(), "s@trendies.com".into(), "Stephen".into()) else {
            panic!("register failed");
        };
        if points > 0 {
            let Ok(_) = state.add_points(&user(), points, "seed".into(), None) else {
                panic!("seed failed");
            };
        }
        state
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut state = state_with_balance(0);
        let again = state.register(user(), "x".into(), "y".into());
        assert!(matches!(again, Err(RewardsError::AlreadyExists(_))));
    }

    #[test]
    fn add_points_to_unknown_user_fails() {
        let mut state = LoyaltyState::default();
        let result = state.add_points(&UserId::new("ghost"), 10, "x".into(), None);
        assert!(matches!(result, Err(RewardsError::UserNotFound(_))));
        assert!(state.ledger().is_empty());
    }

    #[test]
    fn postings_match_replay() {
        let deltas = [500, -100, 1_800, -5_000, 300, -50, 4_000];
        let mut state = state_with_balance(0);
        for delta in deltas {
            let Ok(_) = state.add_points(&user(), delta, "step".into(), None) else {
                panic!("posting failed");
            };
        }
        let Ok(account) = state.account(&user()) else {
            panic!("account missing");
        };
        let (total, lifetime) = replay(&deltas);
        assert_eq!(account.total_points, total);
        assert_eq!(account.lifetime_points, lifetime);
        assert_eq!(state.ledger().len(), deltas.len());
    }

    #[test]
    fn tier_change_is_reported() {
        let mut state = state_with_balance(1_900);
        let Ok(outcome) = state.add_points(&user(), 100, "sale".into(), None) else {
            panic!("posting failed");
        };
        assert_eq!(outcome.previous_tier, LoyaltyTier::Bronze);
        assert_eq!(outcome.tier_change(), Some(LoyaltyTier::Silver));

        let Ok(outcome) = state.add_points(&user(), -500, "spend".into(), None) else {
            panic!("posting failed");
        };
        assert_eq!(outcome.tier_change(), None);
    }

    #[test]
    fn adjustments_use_bonus_and_penalty() {
        let mut state = state_with_balance(100);
        let Ok(bonus) = state.adjust_points(&user(), 50, "goodwill".into()) else {
            panic!("bonus failed");
        };
        assert_eq!(bonus.transaction.kind, TransactionType::Bonus);
        let Ok(penalty) = state.adjust_points(&user(), -30, "chargeback".into()) else {
            panic!("penalty failed");
        };
        assert_eq!(penalty.transaction.kind, TransactionType::Penalty);
        assert_eq!(penalty.account.total_points, 120);
        assert_eq!(penalty.account.lifetime_points, 150);
    }

    #[test]
    fn redeem_debits_and_creates_one_pending_claim() {
        let mut state = state_with_balance(2_400);
        let before = state.ledger().len();

        let Ok(redemption) = state.redeem(&user(), &RewardId::new("reward_1")) else {
            panic!("redeem failed");
        };
        assert_eq!(redemption.account.total_points, 2_150);
        assert_eq!(redemption.claim.status, ClaimStatus::Pending);
        assert_eq!(redemption.claim.points_cost, 250);
        assert_eq!(redemption.claim.reward_name, "€5 Voucher");
        assert_eq!(redemption.transaction.points, -250);
        assert_eq!(redemption.transaction.kind, TransactionType::Redeemed);
        assert_eq!(
            redemption.transaction.reference_id.as_deref(),
            Some("reward_1")
        );
        assert_eq!(state.claims().len(), 1);
        assert_eq!(state.ledger().len(), before + 1);
    }

    #[test]
    fn redeem_exact_balance_leaves_zero() {
        let mut state = state_with_balance(250);
        let Ok(redemption) = state.redeem(&user(), &RewardId::new("reward_1")) else {
            panic!("redeem failed");
        };
        assert_eq!(redemption.account.total_points, 0);
    }

    #[test]
    fn redeem_insufficient_balance_changes_nothing() {
        let mut state = state_with_balance(249);
        let result = state.redeem(&user(), &RewardId::new("reward_1"));
        assert!(matches!(
            result,
            Err(RewardsError::InsufficientBalance {
                available: 249,
                required: 250
            })
        ));
        assert!(state.claims().is_empty());
        assert_eq!(state.ledger().len(), 1);
        assert_eq!(state.account(&user()).map(|a| a.total_points).ok(), Some(249));
    }

    #[test]
    fn redeem_unknown_and_inactive_rewards() {
        let mut rewards = RewardCatalog::standard().all().to_vec();
        if let Some(r) = rewards.get_mut(1) {
            r.is_active = false;
        }
        let mut state = LoyaltyState::with_catalog(RewardCatalog::new(rewards));
        let _ = state.register(user(), "e".into(), "n".into());
        let _ = state.add_points(&user(), 10_000, "seed".into(), None);

        let missing = state.redeem(&user(), &RewardId::new("reward_99"));
        assert!(matches!(missing, Err(RewardsError::RewardNotFound(_))));

        let inactive = state.redeem(&user(), &RewardId::new("reward_2"));
        assert!(matches!(inactive, Err(RewardsError::RewardInactive(_))));
        assert!(state.claims().is_empty());
    }

    #[test]
    fn claim_snapshot_survives_catalog_changes() {
        let mut state = state_with_balance(1_000);
        let Ok(redemption) = state.redeem(&user(), &RewardId::new("reward_1")) else {
            panic!("redeem failed");
        };
        let mut rewards = state.catalog.all().to_vec();
        if let Some(r) = rewards.first_mut() {
            r.points_cost = 999;
            r.name = "Renamed".to_string();
        }
        state.catalog = RewardCatalog::new(rewards);

        let Ok(claim) = state.claim(redemption.claim.id) else {
            panic!("claim missing");
        };
        assert_eq!(claim.points_cost, 250);
        assert_eq!(claim.reward_name, "€5 Voucher");
    }

    #[test]
    fn claim_transitions_follow_table() {
        let mut state = state_with_balance(1_000);
        let Ok(redemption) = state.redeem(&user(), &RewardId::new("reward_1")) else {
            panic!("redeem failed");
        };
        let id = redemption.claim.id;

        let skip = state.set_claim_status(id, ClaimStatus::Delivered, None);
        assert!(matches!(skip, Err(RewardsError::InvalidTransition { .. })));

        let Ok(approved) = state.set_claim_status(id, ClaimStatus::Approved, Some("ok".into()))
        else {
            panic!("approve failed");
        };
        assert_eq!(approved.from, ClaimStatus::Pending);
        assert_eq!(approved.claim.admin_notes.as_deref(), Some("ok"));

        let Ok(delivered) = state.set_claim_status(id, ClaimStatus::Delivered, None) else {
            panic!("deliver failed");
        };
        assert_eq!(delivered.claim.status, ClaimStatus::Delivered);

        let back = state.set_claim_status(id, ClaimStatus::Cancelled, None);
        assert!(matches!(back, Err(RewardsError::InvalidTransition { .. })));
    }

    #[test]
    fn unknown_claim_is_not_found() {
        let mut state = state_with_balance(0);
        let result = state.set_claim_status(ClaimId::new(), ClaimStatus::Approved, None);
        assert!(matches!(result, Err(RewardsError::ClaimNotFound(_))));
    }

    #[test]
    fn stats_aggregate_claims_and_earnings() {
        let mut state = state_with_balance(2_400);
        let _ = state.redeem(&user(), &RewardId::new("reward_1"));
        let _ = state.redeem(&user(), &RewardId::new("reward_2"));
        let stats = state.stats();
        assert_eq!(stats.total_rewards, 6);
        assert_eq!(stats.total_claimed, 2);
        assert_eq!(stats.pending_approval, 2);
        assert_eq!(stats.total_points_redeemed, 350);
        assert_eq!(stats.total_points_earned, 2_400);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = state_with_balance(500);
        let _ = state.redeem(&user(), &RewardId::new("reward_2"));
        let Ok(json) = serde_json::to_value(&state) else {
            panic!("encode failed");
        };
        let Ok(restored) = serde_json::from_value::<LoyaltyState>(json) else {
            panic!("decode failed");
        };
        assert_eq!(restored.claims().len(), 1);
        assert_eq!(restored.ledger().len(), 2);
        assert_eq!(
            restored.account(&user()).map(|a| a.total_points).ok(),
            Some(400)
        );
    }

    #[tokio::test]
    async fn concurrent_redemptions_cannot_double_spend() {
        use std::sync::Arc;

        let store = Arc::new(LoyaltyStore::new(RewardCatalog::standard()));
        store
            .write(|s| {
                let _ = s.register(user(), "e".into(), "n".into());
                let _ = s.add_points(&user(), 300, "seed".into(), None);
            })
            .await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .write(|s| s.redeem(&user(), &RewardId::new("reward_1")))
                    .await
                    .is_ok()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if matches!(handle.await, Ok(true)) {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        let balance = store
            .read(|s| s.account(&user()).map(|a| a.total_points).ok())
            .await;
        assert_eq!(balance, Some(50));
    }
}
