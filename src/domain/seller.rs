//! Seller revenue badges.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::SellerId;
use super::tier::SellerBadge;
use crate::error::RewardsError;

/// A seller's running revenue and current badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SellerProfile {
    /// Seller identifier.
    pub id: SellerId,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Lifetime revenue in whole currency units.
    pub total_revenue: i64,
    /// Completed sales.
    pub total_sales: u64,
    /// Highest badge reached.
    pub badge: SellerBadge,
    /// Revenue in the calendar month named by `sales_month`.
    #[serde(default)]
    pub current_month_sales: i64,
    /// `YYYY-MM` of the last recorded sale; empty before the first one.
    #[serde(default)]
    pub sales_month: String,
}

/// Result of recording a sale.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// Profile after the sale.
    pub seller: SellerProfile,
    /// Badge before the sale.
    pub previous_badge: SellerBadge,
}

impl SaleOutcome {
    /// The new badge, if the sale earned one.
    #[must_use]
    pub fn upgrade(&self) -> Option<SellerBadge> {
        (self.seller.badge != self.previous_badge).then_some(self.seller.badge)
    }
}

/// All seller profiles keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerState {
    sellers: BTreeMap<SellerId, SellerProfile>,
}

impl SellerState {
    /// Adds a seller with no revenue.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::AlreadyExists`] for a duplicate id.
    pub fn register(
        &mut self,
        id: SellerId,
        name: String,
        email: String,
    ) -> Result<SellerProfile, RewardsError> {
        if self.sellers.contains_key(&id) {
            return Err(RewardsError::AlreadyExists(format!("seller {id}")));
        }
        let profile = SellerProfile {
            id: id.clone(),
            name,
            email,
            total_revenue: 0,
            total_sales: 0,
            badge: SellerBadge::Verified,
            current_month_sales: 0,
            sales_month: String::new(),
        };
        self.sellers.insert(id, profile.clone());
        Ok(profile)
    }

    /// Adds a sale to a seller's revenue and reclassifies the badge.
    ///
    /// The badge only ever moves up. The monthly total restarts when `now`
    /// falls in a different calendar month than the previous sale.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InvalidRequest`] for a non-positive amount.
    /// - [`RewardsError::SellerNotFound`] for unknown sellers.
    pub fn record_sale(
        &mut self,
        id: &SellerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<SaleOutcome, RewardsError> {
        if amount <= 0 {
            return Err(RewardsError::InvalidRequest(
                "sale amount must be positive".to_string(),
            ));
        }
        let seller = self
            .sellers
            .get_mut(id)
            .ok_or_else(|| RewardsError::SellerNotFound(id.clone()))?;
        let previous_badge = seller.badge;
        seller.total_revenue = seller.total_revenue.saturating_add(amount);
        seller.total_sales = seller.total_sales.saturating_add(1);
        let month = now.format("%Y-%m").to_string();
        if seller.sales_month != month {
            seller.sales_month = month;
            seller.current_month_sales = 0;
        }
        seller.current_month_sales = seller.current_month_sales.saturating_add(amount);
        seller.badge = previous_badge.max(SellerBadge::classify(seller.total_revenue));
        Ok(SaleOutcome {
            seller: seller.clone(),
            previous_badge,
        })
    }

    /// Looks up a seller.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SellerNotFound`] for unknown sellers.
    pub fn get(&self, id: &SellerId) -> Result<&SellerProfile, RewardsError> {
        self.sellers
            .get(id)
            .ok_or_else(|| RewardsError::SellerNotFound(id.clone()))
    }

    /// Every seller ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<SellerProfile> {
        self.sellers.values().cloned().collect()
    }
}

/// Concurrent handle to seller profiles.
#[derive(Debug, Default)]
pub struct SellerDirectory {
    state: RwLock<SellerState>,
}

impl SellerDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&SellerState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` under the write lock.
    pub async fn write<R>(&self, f: impl FnOnce(&mut SellerState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Clones the whole state for persistence.
    pub async fn snapshot(&self) -> SellerState {
        self.state.read().await.clone()
    }

    /// Replaces the whole state with a restored snapshot.
    pub async fn restore(&self, state: SellerState) {
        *self.state.write().await = state;
    }
}
