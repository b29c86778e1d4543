//! Loyalty service: accounts, points postings and redemptions.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    AdminStore, ClaimedReward, EventBus, LoyaltyAccount, LoyaltyReward, LoyaltyStats,
    LoyaltyStore, PointsTransaction, PostingOutcome, RewardId, RewardsEvent, UserId,
};
use crate::error::RewardsError;
use crate::notify::{self, MailDispatcher, messages};

/// Result of a redemption, including whether the receipt mail went out.
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    /// Newly created claim in `pending`.
    pub claim: ClaimedReward,
    /// Debit entry.
    pub transaction: PointsTransaction,
    /// Account after the debit.
    pub account: LoyaltyAccount,
    /// Whether the receipt was accepted by the mail collaborator.
    pub notification_sent: bool,
}

/// Orchestration layer for loyalty operations.
///
/// Every mutation follows the same pattern: run the rule under the store's
/// write guard, publish events, dispatch any notification, log.
#[derive(Debug, Clone)]
pub struct LoyaltyService {
    store: Arc<LoyaltyStore>,
    admin: Arc<AdminStore>,
    event_bus: EventBus,
    mailer: Arc<dyn MailDispatcher>,
}

impl LoyaltyService {
    /// Creates a new `LoyaltyService`.
    #[must_use]
    pub fn new(
        store: Arc<LoyaltyStore>,
        admin: Arc<AdminStore>,
        event_bus: EventBus,
        mailer: Arc<dyn MailDispatcher>,
    ) -> Self {
        Self {
            store,
            admin,
            event_bus,
            mailer,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<LoyaltyStore> {
        &self.store
    }

    /// Opens a loyalty account at Bronze with a zero balance.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for an empty id or email.
    /// - [`RewardsError::AlreadyExists`] if the account exists.
    pub async fn register_account(
        &self,
        user_id: UserId,
        email: String,
        name: String,
    ) -> Result<LoyaltyAccount, RewardsError> {
        if user_id.as_str().trim().is_empty() {
            return Err(RewardsError::MissingField("user_id"));
        }
        if email.trim().is_empty() {
            return Err(RewardsError::MissingField("email"));
        }
        let account = self
            .store
            .write(|s| s.register(user_id, email, name))
            .await?;
        tracing::info!(user_id = %account.user_id, "loyalty account opened");
        Ok(account)
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users.
    pub async fn account(&self, user_id: &UserId) -> Result<LoyaltyAccount, RewardsError> {
        self.store.read(|s| s.account(user_id).cloned()).await
    }

    /// Posts an ordinary credit or debit.
    ///
    /// The balance is clamped at zero rather than rejected on overdraft.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InvalidRequest`] for a zero delta.
    /// - [`RewardsError::UserNotFound`] for unknown users.
    pub async fn add_points(
        &self,
        user_id: &UserId,
        delta: i64,
        description: String,
        reference_id: Option<String>,
    ) -> Result<PostingOutcome, RewardsError> {
        if delta == 0 {
            return Err(RewardsError::InvalidRequest(
                "points delta must be non-zero".to_string(),
            ));
        }
        let outcome = self
            .store
            .write(|s| s.add_points(user_id, delta, description, reference_id))
            .await?;
        self.publish_posting(&outcome);
        tracing::info!(%user_id, points = delta, balance = outcome.account.total_points, "points posted");
        Ok(outcome)
    }

    /// Posts an admin bonus or penalty.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InvalidRequest`] for a zero delta.
    /// - [`RewardsError::MissingField`] for an empty reason.
    /// - [`RewardsError::UserNotFound`] for unknown users.
    pub async fn adjust_points(
        &self,
        user_id: &UserId,
        delta: i64,
        reason: String,
        admin_id: &str,
    ) -> Result<PostingOutcome, RewardsError> {
        if delta == 0 {
            return Err(RewardsError::InvalidRequest(
                "points delta must be non-zero".to_string(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(RewardsError::MissingField("reason"));
        }
        let outcome = self
            .store
            .write(|s| s.adjust_points(user_id, delta, reason))
            .await?;
        self.publish_posting(&outcome);
        tracing::info!(%user_id, points = delta, admin = admin_id, "points adjusted");
        Ok(outcome)
    }

    fn publish_posting(&self, outcome: &PostingOutcome) {
        let now = Utc::now();
        let _ = self.event_bus.publish(RewardsEvent::PointsPosted {
            user_id: outcome.account.user_id.clone(),
            transaction_id: outcome.transaction.id,
            kind: outcome.transaction.kind,
            points: outcome.transaction.points,
            balance: outcome.account.total_points,
            lifetime_points: outcome.account.lifetime_points,
            timestamp: now,
        });
        if let Some(tier) = outcome.tier_change() {
            let _ = self.event_bus.publish(RewardsEvent::TierChanged {
                user_id: outcome.account.user_id.clone(),
                from: outcome.previous_tier,
                to: tier,
                timestamp: now,
            });
            tracing::info!(user_id = %outcome.account.user_id, ?tier, "tier changed");
        }
    }

    /// Active catalog entries in catalog order.
    pub async fn list_available(&self) -> Vec<LoyaltyReward> {
        self.store.list_available().await
    }

    /// Redeems a reward: opens a `pending` claim and debits its cost in one
    /// step, then mails a receipt.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::UserBanned`] for banned users.
    /// - [`RewardsError::UserNotFound`], [`RewardsError::RewardNotFound`],
    ///   [`RewardsError::RewardInactive`] or
    ///   [`RewardsError::InsufficientBalance`] from validation.
    pub async fn redeem(
        &self,
        user_id: &UserId,
        reward_id: &RewardId,
    ) -> Result<RedemptionReceipt, RewardsError> {
        let admin = self.admin.read_guard().await;
        if admin.is_banned(user_id) {
            return Err(RewardsError::UserBanned(user_id.clone()));
        }
        let redemption = self.store.write(|s| s.redeem(user_id, reward_id)).await;
        drop(admin);
        let redemption = redemption?;

        let now = Utc::now();
        let _ = self.event_bus.publish(RewardsEvent::RewardClaimed {
            user_id: user_id.clone(),
            claim_id: redemption.claim.id,
            reward_id: reward_id.clone(),
            points_cost: redemption.claim.points_cost,
            timestamp: now,
        });
        let _ = self.event_bus.publish(RewardsEvent::PointsPosted {
            user_id: user_id.clone(),
            transaction_id: redemption.transaction.id,
            kind: redemption.transaction.kind,
            points: redemption.transaction.points,
            balance: redemption.account.total_points,
            lifetime_points: redemption.account.lifetime_points,
            timestamp: now,
        });

        let message = messages::loyalty_redemption(
            &redemption.account.email,
            &redemption.account.name,
            &redemption.claim.reward_name,
            redemption.claim.points_cost,
            redemption.account.total_points,
        );
        let notification_sent = notify::send_logged(self.mailer.as_ref(), message).await;

        tracing::info!(
            %user_id,
            %reward_id,
            claim_id = %redemption.claim.id,
            points_cost = redemption.claim.points_cost,
            balance = redemption.account.total_points,
            "reward redeemed"
        );
        Ok(RedemptionReceipt {
            claim: redemption.claim,
            transaction: redemption.transaction,
            account: redemption.account,
            notification_sent,
        })
    }

    /// A user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users.
    pub async fn points_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PointsTransaction>, RewardsError> {
        self.store
            .read(|s| -> Result<_, RewardsError> {
                s.account(user_id)?;
                Ok(s.ledger().for_user(user_id))
            })
            .await
    }

    /// A user's claims, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] for unknown users.
    pub async fn claims_for(&self, user_id: &UserId) -> Result<Vec<ClaimedReward>, RewardsError> {
        self.store
            .read(|s| -> Result<_, RewardsError> {
                s.account(user_id)?;
                Ok(s.claims_for(user_id))
            })
            .await
    }

    /// Dashboard counters.
    pub async fn stats(&self) -> LoyaltyStats {
        self.store.read(|s| s.stats()).await
    }

    /// The whole ledger in posting order, for export.
    pub async fn transactions(&self) -> Vec<PointsTransaction> {
        self.store.read(|s| s.ledger().entries().to_vec()).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ClaimStatus, LoyaltyTier, RewardCatalog, TransactionType};
    use crate::notify::RecordingMailer;

    struct Fixture {
        service: LoyaltyService,
        admin: Arc<AdminStore>,
        mailer: Arc<RecordingMailer>,
        bus: EventBus,
    }

    async fn fixture() -> Fixture {
        let admin = Arc::new(AdminStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let bus = EventBus::new(64);
        let service = LoyaltyService::new(
            Arc::new(LoyaltyStore::new(RewardCatalog::standard())),
            Arc::clone(&admin),
            bus.clone(),
            Arc::clone(&mailer) as Arc<dyn MailDispatcher>,
        );
        let Ok(_) = service
            .register_account(
                UserId::new("user_1"),
                "stephen@trendies.com".into(),
                "Stephen Neary".into(),
            )
            .await
        else {
            panic!("register failed");
        };
        Fixture {
            service,
            admin,
            mailer,
            bus,
        }
    }

    fn user() -> UserId {
        UserId::new("user_1")
    }

    #[tokio::test]
    async fn new_account_starts_at_bronze() {
        let f = fixture().await;
        let Ok(account) = f.service.account(&user()).await else {
            panic!("account missing");
        };
        assert_eq!(account.total_points, 0);
        assert_eq!(account.tier(), LoyaltyTier::Bronze);
    }

    #[tokio::test]
    async fn end_to_end_redemption() {
        let f = fixture().await;
        let mut rx = f.bus.subscribe();

        let Ok(earned) = f
            .service
            .add_points(&user(), 2_400, "Sale".into(), None)
            .await
        else {
            panic!("posting failed");
        };
        assert_eq!(earned.account.tier(), LoyaltyTier::Silver);

        let Ok(receipt) = f.service.redeem(&user(), &RewardId::new("reward_1")).await else {
            panic!("redeem failed");
        };
        assert_eq!(receipt.account.total_points, 2_150);
        assert_eq!(receipt.account.lifetime_points, 2_400);
        assert_eq!(receipt.claim.status, ClaimStatus::Pending);
        assert!(receipt.notification_sent);
        assert_eq!(f.mailer.sent_count().await, 1);

        let Ok(history) = f.service.points_history(&user()).await else {
            panic!("history failed");
        };
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().map(|t| t.kind), Some(TransactionType::Redeemed));

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type_str());
        }
        assert_eq!(
            types,
            ["points_posted", "tier_changed", "reward_claimed", "points_posted"]
        );
    }

    #[tokio::test]
    async fn mail_failure_does_not_undo_redemption() {
        let f = fixture().await;
        let _ = f.service.add_points(&user(), 500, "Sale".into(), None).await;
        f.mailer.set_fail(true).await;

        let Ok(receipt) = f.service.redeem(&user(), &RewardId::new("reward_2")).await else {
            panic!("redeem failed");
        };
        assert!(!receipt.notification_sent);
        assert_eq!(receipt.account.total_points, 400);
        let Ok(claims) = f.service.claims_for(&user()).await else {
            panic!("claims failed");
        };
        assert_eq!(claims.len(), 1);
    }

    #[tokio::test]
    async fn banned_user_cannot_redeem() {
        let f = fixture().await;
        let _ = f.service.add_points(&user(), 5_000, "Sale".into(), None).await;
        let _ = f
            .admin
            .write(|s| s.ban(&user(), "stephen@trendies.com", "fraud", "admin"))
            .await;

        let result = f.service.redeem(&user(), &RewardId::new("reward_1")).await;
        assert!(matches!(result, Err(RewardsError::UserBanned(_))));
        assert_eq!(f.service.stats().await.total_claimed, 0);
    }

    #[tokio::test]
    async fn zero_delta_is_rejected() {
        let f = fixture().await;
        let result = f.service.add_points(&user(), 0, "noop".into(), None).await;
        assert!(matches!(result, Err(RewardsError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let f = fixture().await;
        tokio_test::assert_ok!(f.service.add_points(&user(), 300, "First".into(), None).await);
        tokio_test::assert_ok!(f.service.add_points(&user(), -50, "Second".into(), None).await);

        let history = tokio_test::assert_ok!(f.service.points_history(&user()).await);
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().map(|t| t.points), Some(-50));
        tokio_test::assert_err!(f.service.claims_for(&UserId::new("ghost")).await);
    }

    #[tokio::test]
    async fn unknown_user_history_is_not_found() {
        let f = fixture().await;
        let result = f.service.points_history(&UserId::new("ghost")).await;
        assert!(matches!(result, Err(RewardsError::UserNotFound(_))));
    }
}
