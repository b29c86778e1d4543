//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RewardsConfig;
use crate::domain::{
    AdminStore, EventBus, LoyaltyStore, MarketplaceStore, ReferralStore, RewardCatalog,
    SellerDirectory,
};
use crate::notify::MailDispatcher;
use crate::persistence::Stores;
use crate::service::{
    LoyaltyService, MarketplaceService, ModerationService, ReferralService, SellerService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Accounts, points and redemptions.
    pub loyalty: Arc<LoyaltyService>,
    /// Codes, invites and conversions.
    pub referrals: Arc<ReferralService>,
    /// Claim and invite moderation, bans, audit log.
    pub moderation: Arc<ModerationService>,
    /// Seller revenue badges.
    pub sellers: Arc<SellerService>,
    /// Listings and payouts.
    pub marketplace: Arc<MarketplaceService>,
    /// Mail collaborator, also used by the forwarder endpoints.
    pub mailer: Arc<dyn MailDispatcher>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires empty stores and every service from configuration.
    #[must_use]
    pub fn build(config: &RewardsConfig, mailer: Arc<dyn MailDispatcher>) -> Self {
        let catalog = if config.seed_catalog {
            RewardCatalog::standard()
        } else {
            RewardCatalog::default()
        };
        let event_bus = EventBus::new(config.event_bus_capacity);
        let loyalty_store = Arc::new(LoyaltyStore::new(catalog));
        let referral_store = Arc::new(ReferralStore::new());
        let admin_store = Arc::new(AdminStore::new());
        let directory = Arc::new(SellerDirectory::new());

        let loyalty = Arc::new(LoyaltyService::new(
            Arc::clone(&loyalty_store),
            Arc::clone(&admin_store),
            event_bus.clone(),
            Arc::clone(&mailer),
        ));
        let referrals = Arc::new(ReferralService::new(
            Arc::clone(&referral_store),
            Arc::clone(&loyalty),
            Arc::clone(&admin_store),
            event_bus.clone(),
            Arc::clone(&mailer),
            config.referral_bounty_points,
            config.invite_ttl_days,
        ));
        let moderation = Arc::new(ModerationService::new(
            loyalty_store,
            referral_store,
            admin_store,
            event_bus.clone(),
        ));
        let sellers = Arc::new(SellerService::new(
            directory,
            event_bus.clone(),
            Arc::clone(&mailer),
        ));
        let marketplace = Arc::new(MarketplaceService::new(
            Arc::new(MarketplaceStore::new()),
            Arc::clone(&sellers),
            event_bus.clone(),
        ));

        Self {
            loyalty,
            referrals,
            moderation,
            sellers,
            marketplace,
            mailer,
            event_bus,
        }
    }

    /// Handles to every persisted store.
    #[must_use]
    pub fn stores(&self) -> Stores {
        Stores {
            loyalty: Arc::clone(self.loyalty.store()),
            referrals: Arc::clone(self.referrals.store()),
            admin: Arc::clone(self.moderation.store()),
            sellers: Arc::clone(self.sellers.store()),
            marketplace: Arc::clone(self.marketplace.store()),
        }
    }
}
