//! Seller service: revenue tracking and badge upgrades.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    EventBus, RewardsEvent, SellerBadge, SellerDirectory, SellerId, SellerProfile, UserId,
};
use crate::error::RewardsError;
use crate::notify::{self, MailDispatcher, messages};

/// Result of recording a sale.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    /// Profile after the sale.
    pub seller: SellerProfile,
    /// New badge, if the sale earned one.
    pub upgraded_to: Option<SellerBadge>,
    /// Whether the upgrade notice went out.
    pub notification_sent: bool,
}

/// Orchestration layer for seller profiles.
#[derive(Debug, Clone)]
pub struct SellerService {
    directory: Arc<SellerDirectory>,
    event_bus: EventBus,
    mailer: Arc<dyn MailDispatcher>,
}

impl SellerService {
    /// Creates a new `SellerService`.
    #[must_use]
    pub fn new(
        directory: Arc<SellerDirectory>,
        event_bus: EventBus,
        mailer: Arc<dyn MailDispatcher>,
    ) -> Self {
        Self {
            directory,
            event_bus,
            mailer,
        }
    }

    /// Returns the underlying directory.
    #[must_use]
    pub fn store(&self) -> &Arc<SellerDirectory> {
        &self.directory
    }

    /// Registers a seller at the Verified badge.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for an empty id or email.
    /// - [`RewardsError::AlreadyExists`] for a duplicate id.
    pub async fn register_seller(
        &self,
        id: SellerId,
        name: String,
        email: String,
    ) -> Result<SellerProfile, RewardsError> {
        if id.as_str().trim().is_empty() {
            return Err(RewardsError::MissingField("seller_id"));
        }
        if email.trim().is_empty() {
            return Err(RewardsError::MissingField("email"));
        }
        let seller = self.directory.write(|s| s.register(id, name, email)).await?;
        tracing::info!(seller_id = %seller.id, "seller registered");
        Ok(seller)
    }

    /// Adds a sale and upgrades the badge when a threshold is crossed.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InvalidRequest`] for a non-positive amount.
    /// - [`RewardsError::SellerNotFound`] for unknown sellers.
    pub async fn record_sale(
        &self,
        id: &SellerId,
        amount: i64,
    ) -> Result<SaleReceipt, RewardsError> {
        let outcome = self
            .directory
            .write(|s| s.record_sale(id, amount, Utc::now()))
            .await?;
        let upgraded_to = outcome.upgrade();

        let mut notification_sent = false;
        if let Some(badge) = upgraded_to {
            let _ = self.event_bus.publish(RewardsEvent::BadgeUpgraded {
                user_id: UserId::new(id.as_str()),
                seller_id: id.clone(),
                from: outcome.previous_badge,
                to: badge,
                timestamp: Utc::now(),
            });
            let message =
                messages::badge_upgrade(&outcome.seller.email, &outcome.seller.name, badge);
            notification_sent = notify::send_logged(self.mailer.as_ref(), message).await;
            tracing::info!(seller_id = %id, ?badge, "seller badge upgraded");
        }

        tracing::info!(
            seller_id = %id,
            amount,
            total_revenue = outcome.seller.total_revenue,
            "sale recorded"
        );
        Ok(SaleReceipt {
            seller: outcome.seller,
            upgraded_to,
            notification_sent,
        })
    }

    /// Looks up a seller.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SellerNotFound`] for unknown sellers.
    pub async fn seller(&self, id: &SellerId) -> Result<SellerProfile, RewardsError> {
        self.directory.read(|s| s.get(id).cloned()).await
    }

    /// Every seller ordered by id.
    pub async fn list(&self) -> Vec<SellerProfile> {
        self.directory.read(|s| s.list()).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::notify::{MessageKind, RecordingMailer};

    #[tokio::test]
    async fn upgrade_publishes_and_notifies() {
        let mailer = Arc::new(RecordingMailer::new());
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let service = SellerService::new(
            Arc::new(SellerDirectory::new()),
            bus,
            Arc::clone(&mailer) as Arc<dyn MailDispatcher>,
        );
        let id = SellerId::new("seller_1");
        let Ok(_) = service
            .register_seller(id.clone(), "Maison".into(), "m@x.com".into())
            .await
        else {
            panic!("register failed");
        };

        let Ok(small) = service.record_sale(&id, 10_000).await else {
            panic!("sale failed");
        };
        assert_eq!(small.upgraded_to, None);
        assert_eq!(mailer.sent_count().await, 0);

        let Ok(big) = service.record_sale(&id, 140_000).await else {
            panic!("sale failed");
        };
        assert_eq!(big.upgraded_to, Some(SellerBadge::Pro));
        assert_eq!(big.seller.total_revenue, 150_000);
        assert!(big.seller.current_month_sales > 0);
        assert!(big.notification_sent);
        assert_eq!(
            mailer.sent().await.first().map(|m| m.kind),
            Some(MessageKind::BadgeUpgrade)
        );

        let Ok(event) = rx.try_recv() else {
            panic!("no event");
        };
        assert_eq!(event.event_type_str(), "badge_upgraded");
        assert_eq!(event.user_id().as_str(), "seller_1");
    }
}
