//! Marketplace DTOs: listing review and payouts.
//!
//! New listings and payouts are posted as [`crate::domain::NewListing`] and
//! [`crate::domain::NewPayout`] directly.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::PaginationParams;
use crate::domain::{
    Listing, ListingChange, ListingFilter, ListingStatus, Payout, PayoutStatus, PayoutSummary,
    SellerId,
};

/// Query parameters for `GET /listings`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Keep only this seller's listings.
    pub seller_id: Option<String>,
    /// Keep only listings in this review state.
    pub status: Option<ListingStatus>,
    /// Exact category.
    pub category: Option<String>,
    /// Exact brand.
    pub brand: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub per_page: Option<u32>,
}

impl ListingQuery {
    /// The listing filter part of the query.
    #[must_use]
    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            seller_id: self.seller_id.clone().map(SellerId::new),
            status: self.status,
            category: self.category.clone(),
            brand: self.brand.clone(),
        }
    }

    /// The pagination part of the query, with defaults filled in.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for `PUT /listings/{listing_id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListingStatusRequest {
    /// Target review state.
    pub status: ListingStatus,
}

/// A reviewed listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingStatusResponse {
    /// Listing after the decision.
    pub listing: Listing,
    /// State before the decision.
    pub previous_status: ListingStatus,
    /// `false` when the listing already had the requested state.
    pub changed: bool,
}

impl From<ListingChange> for ListingStatusResponse {
    fn from(change: ListingChange) -> Self {
        Self {
            changed: change.changed(),
            previous_status: change.from,
            listing: change.listing,
        }
    }
}

/// Request body for `PUT /payouts/{payout_id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PayoutStatusRequest {
    /// Target settlement state.
    pub status: PayoutStatus,
}

/// A seller's payouts with totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayoutListResponse {
    /// Payouts, newest first.
    pub payouts: Vec<Payout>,
    /// Per-status totals.
    pub summary: PayoutSummary,
}
