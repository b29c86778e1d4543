//! Marketplace service: listing review and seller payouts.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    EventBus, Listing, ListingChange, ListingFilter, ListingId, ListingStatus, MarketplaceStore,
    NewListing, NewPayout, Payout, PayoutId, PayoutStatus, PayoutSummary, PayoutTransition,
    RewardsEvent, SellerId, UserId,
};
use crate::error::RewardsError;
use crate::service::SellerService;

/// Orchestration layer for listings and payouts.
#[derive(Debug, Clone)]
pub struct MarketplaceService {
    store: Arc<MarketplaceStore>,
    sellers: Arc<SellerService>,
    event_bus: EventBus,
}

impl MarketplaceService {
    /// Creates a new `MarketplaceService`.
    #[must_use]
    pub fn new(
        store: Arc<MarketplaceStore>,
        sellers: Arc<SellerService>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            sellers,
            event_bus,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<MarketplaceStore> {
        &self.store
    }

    /// Submits a listing for review.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::SellerNotFound`] for unknown sellers.
    /// - [`RewardsError::MissingField`] for a blank title.
    /// - [`RewardsError::InvalidRequest`] for a non-positive price.
    pub async fn add_listing(
        &self,
        seller_id: &SellerId,
        new: NewListing,
    ) -> Result<Listing, RewardsError> {
        self.sellers.seller(seller_id).await?;
        let now = Utc::now();
        let listing = self
            .store
            .write(|s| s.add_listing(seller_id.clone(), new, now))
            .await?;

        let _ = self.event_bus.publish(RewardsEvent::ListingAdded {
            user_id: UserId::new(seller_id.as_str()),
            listing_id: listing.id,
            price: listing.price,
            timestamp: now,
        });
        tracing::info!(%seller_id, listing_id = %listing.id, price = listing.price, "listing added");
        Ok(listing)
    }

    /// Applies a review decision. Re-applying the current status is a no-op
    /// that emits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::ListingNotFound`] for unknown listings.
    pub async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<ListingChange, RewardsError> {
        let change = self.store.write(|s| s.set_listing_status(id, status)).await?;
        if change.changed() {
            let _ = self.event_bus.publish(RewardsEvent::ListingStatusChanged {
                user_id: UserId::new(change.listing.seller_id.as_str()),
                listing_id: id,
                from: change.from,
                to: status,
                timestamp: Utc::now(),
            });
            tracing::info!(
                listing_id = %id,
                from = change.from.as_str(),
                to = status.as_str(),
                "listing status changed"
            );
        }
        Ok(change)
    }

    /// Looks up a listing.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::ListingNotFound`] for unknown listings.
    pub async fn listing(&self, id: ListingId) -> Result<Listing, RewardsError> {
        self.store.read(|s| s.listing(id).cloned()).await
    }

    /// Listings passing `filter`, newest first.
    pub async fn listings(&self, filter: &ListingFilter) -> Vec<Listing> {
        self.store.read(|s| s.filter_listings(filter)).await
    }

    /// Queues a payout for a seller.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::SellerNotFound`] for unknown sellers.
    /// - [`RewardsError::MissingField`] for a blank order id.
    /// - [`RewardsError::InvalidRequest`] for a non-positive amount.
    pub async fn record_payout(
        &self,
        seller_id: &SellerId,
        new: NewPayout,
    ) -> Result<Payout, RewardsError> {
        self.sellers.seller(seller_id).await?;
        let now = Utc::now();
        let payout = self
            .store
            .write(|s| s.add_payout(seller_id.clone(), new, now))
            .await?;

        let _ = self.event_bus.publish(RewardsEvent::PayoutRecorded {
            user_id: UserId::new(seller_id.as_str()),
            payout_id: payout.id,
            amount: payout.amount,
            timestamp: now,
        });
        tracing::info!(%seller_id, payout_id = %payout.id, amount = payout.amount, "payout recorded");
        Ok(payout)
    }

    /// Moves a payout along `pending -> processing -> paid`, with `failed`
    /// reachable from the first two and retryable back to `pending`.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::PayoutNotFound`] for unknown payouts.
    /// - [`RewardsError::InvalidTransition`] if the move is not allowed.
    pub async fn set_payout_status(
        &self,
        id: PayoutId,
        status: PayoutStatus,
    ) -> Result<PayoutTransition, RewardsError> {
        let now = Utc::now();
        let transition = self
            .store
            .write(|s| s.set_payout_status(id, status, now))
            .await?;

        let _ = self.event_bus.publish(RewardsEvent::PayoutStatusChanged {
            user_id: UserId::new(transition.payout.seller_id.as_str()),
            payout_id: id,
            from: transition.from,
            to: status,
            timestamp: now,
        });
        tracing::info!(
            payout_id = %id,
            from = transition.from.as_str(),
            to = status.as_str(),
            "payout status changed"
        );
        Ok(transition)
    }

    /// A seller's payouts, newest first, with per-status totals.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SellerNotFound`] for unknown sellers.
    pub async fn payouts(
        &self,
        seller_id: &SellerId,
    ) -> Result<(Vec<Payout>, PayoutSummary), RewardsError> {
        self.sellers.seller(seller_id).await?;
        Ok(self
            .store
            .read(|s| (s.payouts_for(seller_id), s.payout_summary(seller_id)))
            .await)
    }
}
