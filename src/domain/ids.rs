//! Type-safe identifiers.
//!
//! Server-generated identifiers ([`TransactionId`], [`ClaimId`],
//! [`InviteId`], [`ActionId`], [`ListingId`], [`PayoutId`]) are newtype wrappers around [`uuid::Uuid`]
//! (v4). Caller-supplied identifiers ([`UserId`], [`RewardId`], [`SellerId`])
//! wrap a `String` so that existing account and catalog keys such as
//! `"user_1"` or `"reward_3"` are accepted verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the given key.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a single ledger entry.
    TransactionId
);
uuid_id!(
    /// Identifier of a claimed reward.
    ClaimId
);
uuid_id!(
    /// Identifier of a referral invite.
    InviteId
);
uuid_id!(
    /// Identifier of an admin audit record.
    ActionId
);
uuid_id!(
    /// Identifier of a marketplace listing.
    ListingId
);
uuid_id!(
    /// Identifier of a seller payout.
    PayoutId
);

string_id!(
    /// Identifier of a platform user (loyalty member, referrer or admin).
    UserId
);
string_id!(
    /// Identifier of a reward catalog entry.
    RewardId
);
string_id!(
    /// Identifier of a seller profile.
    SellerId
);
