//! Whole-store snapshot and restore.

use std::sync::Arc;

use super::models::{BlobName, StoredBlob};
use super::postgres::PostgresPersistence;
use crate::domain::{AdminStore, LoyaltyStore, MarketplaceStore, ReferralStore, SellerDirectory};
use crate::error::RewardsError;

/// Handles to every store that is persisted.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Loyalty accounts, ledger, claims and catalog.
    pub loyalty: Arc<LoyaltyStore>,
    /// Referral codes and invites.
    pub referrals: Arc<ReferralStore>,
    /// Audit log and bans.
    pub admin: Arc<AdminStore>,
    /// Seller profiles.
    pub sellers: Arc<SellerDirectory>,
    /// Listings and payouts.
    pub marketplace: Arc<MarketplaceStore>,
}

impl Stores {
    /// Encodes every store, one blob each.
    ///
    /// Each store is read under its own lock; the blobs are not a single
    /// point-in-time cut across stores.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] if a state cannot be
    /// serialized.
    pub async fn encode_all(&self) -> Result<Vec<StoredBlob>, RewardsError> {
        Ok(vec![
            StoredBlob::encode(BlobName::Loyalty, &self.loyalty.snapshot().await)?,
            StoredBlob::encode(BlobName::Referrals, &self.referrals.snapshot().await)?,
            StoredBlob::encode(BlobName::Admin, &self.admin.snapshot().await)?,
            StoredBlob::encode(BlobName::Sellers, &self.sellers.snapshot().await)?,
            StoredBlob::encode(BlobName::Marketplace, &self.marketplace.snapshot().await)?,
        ])
    }

    /// Replaces one store's state with a decoded blob.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] for a version mismatch or
    /// a malformed payload; the store is left untouched.
    pub async fn apply(&self, name: BlobName, blob: StoredBlob) -> Result<(), RewardsError> {
        match name {
            BlobName::Loyalty => self.loyalty.restore(blob.decode()?).await,
            BlobName::Referrals => self.referrals.restore(blob.decode()?).await,
            BlobName::Admin => self.admin.restore(blob.decode()?).await,
            BlobName::Sellers => self.sellers.restore(blob.decode()?).await,
            BlobName::Marketplace => self.marketplace.restore(blob.decode()?).await,
        }
        Ok(())
    }
}

/// Periodic snapshot writer and startup restorer.
#[derive(Debug, Clone)]
pub struct SnapshotCoordinator {
    persistence: PostgresPersistence,
    stores: Stores,
}

impl SnapshotCoordinator {
    /// Creates a coordinator for the given stores.
    #[must_use]
    pub fn new(persistence: PostgresPersistence, stores: Stores) -> Self {
        Self {
            persistence,
            stores,
        }
    }

    /// Writes every store.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] on encoding or database
    /// failure.
    pub async fn save_all(&self) -> Result<(), RewardsError> {
        for blob in self.stores.encode_all().await? {
            self.persistence.save_blob(&blob).await?;
        }
        tracing::debug!("store snapshots saved");
        Ok(())
    }

    /// Restores every store that has a saved blob. Returns how many were
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] on database failure or a
    /// blob that cannot be decoded.
    pub async fn restore_all(&self) -> Result<usize, RewardsError> {
        let mut restored = 0;
        for name in BlobName::ALL {
            let Some(blob) = self.persistence.load_blob(name).await? else {
                tracing::info!(store = name.as_str(), "no snapshot found, starting empty");
                continue;
            };
            tracing::info!(store = name.as_str(), saved_at = %blob.saved_at, "restoring snapshot");
            self.stores.apply(name, blob).await?;
            restored += 1;
        }
        Ok(restored)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{NewPayout, RewardCatalog, SellerId, UserId};
    use crate::persistence::models::SCHEMA_VERSION;

    fn stores() -> Stores {
        Stores {
            loyalty: Arc::new(LoyaltyStore::new(RewardCatalog::standard())),
            referrals: Arc::new(ReferralStore::new()),
            admin: Arc::new(AdminStore::new()),
            sellers: Arc::new(SellerDirectory::new()),
            marketplace: Arc::new(MarketplaceStore::new()),
        }
    }

    #[tokio::test]
    async fn blobs_restore_into_fresh_stores() {
        let source = stores();
        source
            .loyalty
            .write(|s| {
                let _ = s.register(UserId::new("user_1"), "e@x.com".into(), "Eve".into());
                let _ = s.add_points(&UserId::new("user_1"), 700, "seed".into(), None);
            })
            .await;
        source
            .marketplace
            .write(|s| {
                let payout = NewPayout {
                    order_id: "ORD-1".into(),
                    amount: 250,
                    ..NewPayout::default()
                };
                let _ = s.add_payout(SellerId::new("seller_1"), payout, chrono::Utc::now());
            })
            .await;
        let Ok(blobs) = source.encode_all().await else {
            panic!("encode failed");
        };
        assert_eq!(blobs.len(), BlobName::ALL.len());

        let target = Stores {
            loyalty: Arc::new(LoyaltyStore::new(RewardCatalog::default())),
            ..stores()
        };
        for (name, blob) in BlobName::ALL.into_iter().zip(blobs) {
            assert_eq!(blob.name, name.as_str());
            let Ok(()) = target.apply(name, blob).await else {
                panic!("apply failed");
            };
        }
        let balance = target
            .loyalty
            .read(|s| s.account(&UserId::new("user_1")).map(|a| a.total_points).ok())
            .await;
        assert_eq!(balance, Some(700));
        assert_eq!(target.loyalty.list_available().await.len(), 6);
        let owed = target
            .marketplace
            .read(|s| s.payout_summary(&SellerId::new("seller_1")).outstanding)
            .await;
        assert_eq!(owed, 250);
    }

    #[tokio::test]
    async fn bad_version_leaves_store_untouched() {
        let target = stores();
        let Ok(mut blob) = StoredBlob::encode(BlobName::Loyalty, &crate::domain::LoyaltyState::default())
        else {
            panic!("encode failed");
        };
        blob.schema_version = SCHEMA_VERSION + 7;
        let result = target.apply(BlobName::Loyalty, blob).await;
        assert!(matches!(result, Err(RewardsError::PersistenceError(_))));
        assert_eq!(target.loyalty.list_available().await.len(), 6);
    }
}
