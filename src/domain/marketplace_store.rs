//! Marketplace store: seller listings and the payout ledger.
//!
//! Same split as the loyalty store. [`MarketplaceState`] implements the
//! rules synchronously and [`MarketplaceStore`] serializes writers behind one
//! [`tokio::sync::RwLock`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::listing::{Listing, ListingFilter, ListingStatus, NewListing};
use super::payout::{NewPayout, Payout, PayoutStatus, PayoutSummary};
use super::{ListingId, PayoutId, SellerId};
use crate::error::RewardsError;

/// A listing review decision.
#[derive(Debug, Clone)]
pub struct ListingChange {
    /// Status before the call.
    pub from: ListingStatus,
    /// Listing after the call.
    pub listing: Listing,
}

impl ListingChange {
    /// `false` when the listing already had the requested status.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.listing.status
    }
}

/// A payout settlement step.
#[derive(Debug, Clone)]
pub struct PayoutTransition {
    /// Status before the change.
    pub from: PayoutStatus,
    /// Payout after the change.
    pub payout: Payout,
}

/// Listings and payouts in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceState {
    listings: Vec<Listing>,
    payouts: Vec<Payout>,
}

impl MarketplaceState {
    /// Adds a listing in `pending` review.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for a blank title.
    /// - [`RewardsError::InvalidRequest`] for a non-positive price.
    pub fn add_listing(
        &mut self,
        seller_id: SellerId,
        new: NewListing,
        now: DateTime<Utc>,
    ) -> Result<Listing, RewardsError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(RewardsError::MissingField("title"));
        }
        if new.price <= 0 {
            return Err(RewardsError::InvalidRequest(
                "listing price must be positive".to_string(),
            ));
        }
        let listing = Listing {
            id: ListingId::new(),
            seller_id,
            title: title.to_string(),
            brand: new.brand.trim().to_string(),
            price: new.price,
            condition: new.condition,
            category: new.category.trim().to_string(),
            status: ListingStatus::Pending,
            tags: new.tags,
            image: new.image.filter(|i| !i.trim().is_empty()),
            created_at: now,
        };
        self.listings.push(listing.clone());
        Ok(listing)
    }

    /// Sets a listing's review status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::ListingNotFound`] for unknown listings.
    pub fn set_listing_status(
        &mut self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<ListingChange, RewardsError> {
        let listing = self
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RewardsError::ListingNotFound(id))?;
        let from = listing.status;
        listing.status = status;
        Ok(ListingChange {
            from,
            listing: listing.clone(),
        })
    }

    /// Looks up a listing.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::ListingNotFound`] for unknown listings.
    pub fn listing(&self, id: ListingId) -> Result<&Listing, RewardsError> {
        self.listings
            .iter()
            .find(|l| l.id == id)
            .ok_or(RewardsError::ListingNotFound(id))
    }

    /// Listings passing `filter`, newest first.
    #[must_use]
    pub fn filter_listings(&self, filter: &ListingFilter) -> Vec<Listing> {
        self.listings
            .iter()
            .rev()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect()
    }

    /// Queues a payout in `pending`.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for a blank order id.
    /// - [`RewardsError::InvalidRequest`] for a non-positive amount.
    pub fn add_payout(
        &mut self,
        seller_id: SellerId,
        new: NewPayout,
        now: DateTime<Utc>,
    ) -> Result<Payout, RewardsError> {
        let order_id = new.order_id.trim();
        if order_id.is_empty() {
            return Err(RewardsError::MissingField("order_id"));
        }
        if new.amount <= 0 {
            return Err(RewardsError::InvalidRequest(
                "payout amount must be positive".to_string(),
            ));
        }
        let payout = Payout {
            id: PayoutId::new(),
            seller_id,
            order_id: order_id.to_string(),
            item: new.item,
            buyer: new.buyer,
            amount: new.amount,
            status: PayoutStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.payouts.push(payout.clone());
        Ok(payout)
    }

    /// Moves a payout along its settlement lifecycle.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::PayoutNotFound`] for unknown payouts.
    /// - [`RewardsError::InvalidTransition`] if the move is not allowed.
    pub fn set_payout_status(
        &mut self,
        id: PayoutId,
        status: PayoutStatus,
        now: DateTime<Utc>,
    ) -> Result<PayoutTransition, RewardsError> {
        let payout = self
            .payouts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RewardsError::PayoutNotFound(id))?;
        let from = payout.status;
        if !from.can_transition_to(status) {
            return Err(RewardsError::InvalidTransition {
                from: from.as_str(),
                to: status.as_str(),
            });
        }
        payout.status = status;
        payout.updated_at = now;
        Ok(PayoutTransition {
            from,
            payout: payout.clone(),
        })
    }

    /// Looks up a payout.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PayoutNotFound`] for unknown payouts.
    pub fn payout(&self, id: PayoutId) -> Result<&Payout, RewardsError> {
        self.payouts
            .iter()
            .find(|p| p.id == id)
            .ok_or(RewardsError::PayoutNotFound(id))
    }

    /// One seller's payouts, newest first.
    #[must_use]
    pub fn payouts_for(&self, seller_id: &SellerId) -> Vec<Payout> {
        self.payouts
            .iter()
            .rev()
            .filter(|p| &p.seller_id == seller_id)
            .cloned()
            .collect()
    }

    /// Per-status totals of one seller's payouts.
    #[must_use]
    pub fn payout_summary(&self, seller_id: &SellerId) -> PayoutSummary {
        self.payouts
            .iter()
            .filter(|p| &p.seller_id == seller_id)
            .fold(PayoutSummary::default(), |mut acc, p| {
                acc.add(p);
                acc
            })
    }
}

/// Concurrent handle to the marketplace state.
#[derive(Debug, Default)]
pub struct MarketplaceStore {
    state: RwLock<MarketplaceState>,
}

impl MarketplaceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&MarketplaceState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` under the write lock.
    pub async fn write<R>(&self, f: impl FnOnce(&mut MarketplaceState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Clones the whole state for persistence.
    pub async fn snapshot(&self) -> MarketplaceState {
        self.state.read().await.clone()
    }

    /// Replaces the whole state with a restored snapshot.
    pub async fn restore(&self, state: MarketplaceState) {
        *self.state.write().await = state;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn new_listing(title: &str, price: i64) -> NewListing {
        NewListing {
            title: title.to_string(),
            brand: "Cartier".to_string(),
            price,
            category: "Jewelry".to_string(),
            ..NewListing::default()
        }
    }

    fn new_payout(order_id: &str, amount: i64) -> NewPayout {
        NewPayout {
            order_id: order_id.to_string(),
            item: "Love Bracelet".to_string(),
            buyer: "A. Buyer".to_string(),
            amount,
        }
    }

    #[test]
    fn listings_start_pending_and_filter_newest_first() {
        let mut state = MarketplaceState::default();
        let seller = SellerId::new("seller_1");
        let Ok(first) = state.add_listing(seller.clone(), new_listing("Ring", 900), Utc::now())
        else {
            panic!("add failed");
        };
        let Ok(second) = state.add_listing(seller, new_listing("  Bracelet ", 4_000), Utc::now())
        else {
            panic!("add failed");
        };
        assert_eq!(first.status, ListingStatus::Pending);
        assert_eq!(second.title, "Bracelet");

        let all = state.filter_listings(&ListingFilter::default());
        let ids: Vec<ListingId> = all.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn invalid_listings_are_rejected() {
        let mut state = MarketplaceState::default();
        let seller = SellerId::new("seller_1");
        assert!(matches!(
            state.add_listing(seller.clone(), new_listing("  ", 900), Utc::now()),
            Err(RewardsError::MissingField("title"))
        ));
        assert!(matches!(
            state.add_listing(seller, new_listing("Ring", 0), Utc::now()),
            Err(RewardsError::InvalidRequest(_))
        ));
        assert!(state.filter_listings(&ListingFilter::default()).is_empty());
    }

    #[test]
    fn listing_review_reports_whether_anything_changed() {
        let mut state = MarketplaceState::default();
        let Ok(listing) =
            state.add_listing(SellerId::new("seller_1"), new_listing("Ring", 900), Utc::now())
        else {
            panic!("add failed");
        };

        let Ok(live) = state.set_listing_status(listing.id, ListingStatus::Live) else {
            panic!("review failed");
        };
        assert!(live.changed());
        assert_eq!(live.from, ListingStatus::Pending);

        let Ok(again) = state.set_listing_status(listing.id, ListingStatus::Live) else {
            panic!("review failed");
        };
        assert!(!again.changed());

        let live_only = ListingFilter {
            status: Some(ListingStatus::Live),
            ..ListingFilter::default()
        };
        assert_eq!(state.filter_listings(&live_only).len(), 1);
        assert!(matches!(
            state.set_listing_status(ListingId::new(), ListingStatus::Live),
            Err(RewardsError::ListingNotFound(_))
        ));
    }

    #[test]
    fn payout_lifecycle_and_summary() {
        let mut state = MarketplaceState::default();
        let seller = SellerId::new("seller_1");
        let other = SellerId::new("seller_2");
        let now = Utc::now();
        let Ok(a) = state.add_payout(seller.clone(), new_payout("ORD-1", 1_000), now) else {
            panic!("payout failed");
        };
        let Ok(b) = state.add_payout(seller.clone(), new_payout("ORD-2", 300), now) else {
            panic!("payout failed");
        };
        let Ok(_) = state.add_payout(other.clone(), new_payout("ORD-3", 50), now) else {
            panic!("payout failed");
        };

        let skip = state.set_payout_status(a.id, PayoutStatus::Paid, now);
        assert!(matches!(skip, Err(RewardsError::InvalidTransition { .. })));

        let Ok(_) = state.set_payout_status(a.id, PayoutStatus::Processing, now) else {
            panic!("processing failed");
        };
        let Ok(paid) = state.set_payout_status(a.id, PayoutStatus::Paid, now) else {
            panic!("paid failed");
        };
        assert_eq!(paid.from, PayoutStatus::Processing);
        assert!(matches!(
            state.set_payout_status(a.id, PayoutStatus::Failed, now),
            Err(RewardsError::InvalidTransition { .. })
        ));

        let Ok(_) = state.set_payout_status(b.id, PayoutStatus::Failed, now) else {
            panic!("fail failed");
        };

        let mine = state.payouts_for(&seller);
        assert_eq!(mine.first().map(|p| p.id), Some(b.id));
        assert_eq!(mine.len(), 2);

        let summary = state.payout_summary(&seller);
        assert_eq!(summary.paid, 1_000);
        assert_eq!(summary.failed, 300);
        assert_eq!(summary.outstanding, 0);
        assert_eq!(state.payout_summary(&other).outstanding, 50);
    }

    #[test]
    fn invalid_payouts_are_rejected() {
        let mut state = MarketplaceState::default();
        let seller = SellerId::new("seller_1");
        assert!(matches!(
            state.add_payout(seller.clone(), new_payout(" ", 10), Utc::now()),
            Err(RewardsError::MissingField("order_id"))
        ));
        assert!(matches!(
            state.add_payout(seller, new_payout("ORD-1", -5), Utc::now()),
            Err(RewardsError::InvalidRequest(_))
        ));
        assert!(matches!(
            state.set_payout_status(PayoutId::new(), PayoutStatus::Paid, Utc::now()),
            Err(RewardsError::PayoutNotFound(_))
        ));
    }
}
