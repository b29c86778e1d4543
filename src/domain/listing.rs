//! Marketplace listings and their review state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingId, SellerId};

/// Review state of a listing.
///
/// Admins may move a listing between any two states; a rejected item can be
/// resubmitted and a live one pulled back for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Visible to buyers.
    Live,
    /// Awaiting review.
    Pending,
    /// Refused at review.
    Rejected,
}

impl ListingStatus {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

/// An item a seller has put up for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    /// Listing identifier.
    pub id: ListingId,
    /// Owning seller.
    pub seller_id: SellerId,
    /// Item title.
    pub title: String,
    /// Brand name.
    pub brand: String,
    /// Asking price in whole currency units.
    pub price: i64,
    /// Free-text condition grade ("Excellent", "Very Good", ...).
    pub condition: String,
    /// Catalog category ("Watches", "Bags", ...).
    pub category: String,
    /// Review state.
    pub status: ListingStatus,
    /// Merchandising tags.
    pub tags: Vec<String>,
    /// Image location, if any.
    pub image: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Seller-supplied fields of a new listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewListing {
    /// Item title.
    pub title: String,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Asking price; must be positive.
    pub price: i64,
    /// Condition grade.
    #[serde(default)]
    pub condition: String,
    /// Catalog category.
    #[serde(default)]
    pub category: String,
    /// Merchandising tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image location.
    #[serde(default)]
    pub image: Option<String>,
}

/// Exact-match filter over listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListingFilter {
    /// Owning seller.
    #[serde(default)]
    pub seller_id: Option<SellerId>,
    /// Review state.
    #[serde(default)]
    pub status: Option<ListingStatus>,
    /// Category, compared exactly.
    #[serde(default)]
    pub category: Option<String>,
    /// Brand, compared exactly.
    #[serde(default)]
    pub brand: Option<String>,
}

impl ListingFilter {
    /// Returns `true` if `listing` passes every set criterion.
    ///
    /// Empty strings count as unset.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        fn text_ok(want: Option<&String>, have: &str) -> bool {
            want.filter(|w| !w.is_empty()).is_none_or(|w| w == have)
        }
        self.seller_id.as_ref().is_none_or(|s| s == &listing.seller_id)
            && self.status.is_none_or(|s| s == listing.status)
            && text_ok(self.category.as_ref(), &listing.category)
            && text_ok(self.brand.as_ref(), &listing.brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(seller: &str, brand: &str, category: &str, status: ListingStatus) -> Listing {
        Listing {
            id: ListingId::new(),
            seller_id: SellerId::new(seller),
            title: "Item".to_string(),
            brand: brand.to_string(),
            price: 1_000,
            condition: "Excellent".to_string(),
            category: category.to_string(),
            status,
            tags: Vec::new(),
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ListingFilter::default();
        assert!(filter.matches(&listing("s1", "Rolex", "Watches", ListingStatus::Rejected)));
    }

    #[test]
    fn every_set_field_must_match() {
        let rolex = listing("s1", "Rolex", "Watches", ListingStatus::Live);
        let filter = ListingFilter {
            status: Some(ListingStatus::Live),
            brand: Some("Rolex".to_string()),
            ..ListingFilter::default()
        };
        assert!(filter.matches(&rolex));
        assert!(!filter.matches(&listing("s1", "Rolex", "Watches", ListingStatus::Pending)));
        assert!(!filter.matches(&listing("s1", "rolex", "Watches", ListingStatus::Live)));

        let other_seller = ListingFilter {
            seller_id: Some(SellerId::new("s2")),
            ..ListingFilter::default()
        };
        assert!(!other_seller.matches(&rolex));
    }

    #[test]
    fn empty_strings_are_ignored() {
        let filter = ListingFilter {
            category: Some(String::new()),
            ..ListingFilter::default()
        };
        assert!(filter.matches(&listing("s1", "Gucci", "Accessories", ListingStatus::Live)));
    }
}
