//! Database models for store snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RewardsError;

/// Payload layout version written with every blob.
///
/// Bump this when a store's serialized shape changes incompatibly.
pub const SCHEMA_VERSION: i32 = 1;

/// Name of a persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobName {
    /// Accounts, ledger, claims and catalog.
    Loyalty,
    /// Codes, invites and referrer profiles.
    Referrals,
    /// Audit log and bans.
    Admin,
    /// Seller profiles.
    Sellers,
    /// Listings and payouts.
    Marketplace,
}

impl BlobName {
    /// Every store, in restore order.
    pub const ALL: [Self; 5] = [
        Self::Loyalty,
        Self::Referrals,
        Self::Admin,
        Self::Sellers,
        Self::Marketplace,
    ];

    /// Row key in `store_blobs`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loyalty => "loyalty",
            Self::Referrals => "referrals",
            Self::Admin => "admin",
            Self::Sellers => "sellers",
            Self::Marketplace => "marketplace",
        }
    }
}

/// A row from the `store_blobs` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    /// Store name.
    pub name: String,
    /// Layout version the payload was written with.
    pub schema_version: i32,
    /// JSONB payload with the whole store state.
    pub payload: serde_json::Value,
    /// Last write timestamp.
    pub saved_at: DateTime<Utc>,
}

impl StoredBlob {
    /// Encodes a store state at the current schema version.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] if the state cannot be
    /// serialized.
    pub fn encode<T: Serialize>(name: BlobName, state: &T) -> Result<Self, RewardsError> {
        Ok(Self {
            name: name.as_str().to_string(),
            schema_version: SCHEMA_VERSION,
            payload: serde_json::to_value(state)?,
            saved_at: Utc::now(),
        })
    }

    /// Decodes the payload, rejecting unknown schema versions.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::PersistenceError`] for a version mismatch or
    /// a payload that does not match the store's shape.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RewardsError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(RewardsError::PersistenceError(format!(
                "blob {} has schema version {}, expected {SCHEMA_VERSION}",
                self.name, self.schema_version
            )));
        }
        Ok(serde_json::from_value(self.payload)?)
    }
}
