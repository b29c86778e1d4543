//! Domain events reflecting loyalty, referral, seller and marketplace
//! mutations.
//!
//! Every state change emits a [`RewardsEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers, which
//! filter them by [`RewardsEvent::user_id`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::claim::ClaimStatus;
use super::ledger::TransactionType;
use super::listing::ListingStatus;
use super::payout::PayoutStatus;
use super::referral::InviteStatus;
use super::tier::{LoyaltyTier, SellerBadge};
use super::{
    ClaimId, InviteId, ListingId, PayoutId, RewardId, SellerId, TransactionId, UserId,
};

/// Domain event emitted after every state mutation.
///
/// For seller events `user_id` carries the seller id, so a client can follow
/// a seller through the same subscription mechanism.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RewardsEvent {
    /// A ledger entry was appended.
    PointsPosted {
        /// Account owner.
        user_id: UserId,
        /// Ledger entry id.
        transaction_id: TransactionId,
        /// Entry type.
        kind: TransactionType,
        /// Signed delta.
        points: i64,
        /// Spendable balance after the posting.
        balance: i64,
        /// Lifetime earned after the posting.
        lifetime_points: i64,
        /// Posting timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A posting moved an account into a new tier.
    TierChanged {
        /// Account owner.
        user_id: UserId,
        /// Tier before.
        from: LoyaltyTier,
        /// Tier after.
        to: LoyaltyTier,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A reward was redeemed and a claim opened.
    RewardClaimed {
        /// Claimant.
        user_id: UserId,
        /// New claim.
        claim_id: ClaimId,
        /// Redeemed catalog entry.
        reward_id: RewardId,
        /// Points debited.
        points_cost: i64,
        /// Claim timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin moved a claim to a new state.
    ClaimStatusChanged {
        /// Claimant.
        user_id: UserId,
        /// Claim.
        claim_id: ClaimId,
        /// State before.
        from: ClaimStatus,
        /// State after.
        to: ClaimStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A referral invite was sent.
    InviteSent {
        /// Referrer.
        user_id: UserId,
        /// New invite.
        invite_id: InviteId,
        /// Invited address.
        invitee_email: String,
        /// Send timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The invitee verified their address.
    InviteVerified {
        /// Referrer.
        user_id: UserId,
        /// Invite.
        invite_id: InviteId,
        /// Verification timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The invitee signed up and the bounty was credited.
    InviteConverted {
        /// Referrer.
        user_id: UserId,
        /// Invite.
        invite_id: InviteId,
        /// Bounty points credited.
        rewards: i64,
        /// Conversion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin blocked an invite.
    InviteBlocked {
        /// Referrer.
        user_id: UserId,
        /// Invite.
        invite_id: InviteId,
        /// Block reason.
        reason: String,
        /// Block timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin lifted an invite block.
    InviteUnblocked {
        /// Referrer.
        user_id: UserId,
        /// Invite.
        invite_id: InviteId,
        /// Unblock timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An open invite aged past its TTL.
    InviteExpired {
        /// Referrer.
        user_id: UserId,
        /// Invite.
        invite_id: InviteId,
        /// State before expiry.
        from: InviteStatus,
        /// Expiry timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A seller reached a higher revenue badge.
    BadgeUpgraded {
        /// Seller id, as a user key.
        user_id: UserId,
        /// Seller.
        seller_id: SellerId,
        /// Badge before.
        from: SellerBadge,
        /// Badge after.
        to: SellerBadge,
        /// Upgrade timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A seller submitted a listing for review.
    ListingAdded {
        /// Seller id, as a user key.
        user_id: UserId,
        /// New listing.
        listing_id: ListingId,
        /// Asking price.
        price: i64,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin moved a listing to a new review state.
    ListingStatusChanged {
        /// Seller id, as a user key.
        user_id: UserId,
        /// Listing.
        listing_id: ListingId,
        /// State before.
        from: ListingStatus,
        /// State after.
        to: ListingStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A payout was queued for a seller.
    PayoutRecorded {
        /// Seller id, as a user key.
        user_id: UserId,
        /// New payout.
        payout_id: PayoutId,
        /// Amount owed.
        amount: i64,
        /// Record timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A payout moved to a new settlement state.
    PayoutStatusChanged {
        /// Seller id, as a user key.
        user_id: UserId,
        /// Payout.
        payout_id: PayoutId,
        /// State before.
        from: PayoutStatus,
        /// State after.
        to: PayoutStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl RewardsEvent {
    /// Returns the user the event concerns.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::PointsPosted { user_id, .. }
            | Self::TierChanged { user_id, .. }
            | Self::RewardClaimed { user_id, .. }
            | Self::ClaimStatusChanged { user_id, .. }
            | Self::InviteSent { user_id, .. }
            | Self::InviteVerified { user_id, .. }
            | Self::InviteConverted { user_id, .. }
            | Self::InviteBlocked { user_id, .. }
            | Self::InviteUnblocked { user_id, .. }
            | Self::InviteExpired { user_id, .. }
            | Self::BadgeUpgraded { user_id, .. }
            | Self::ListingAdded { user_id, .. }
            | Self::ListingStatusChanged { user_id, .. }
            | Self::PayoutRecorded { user_id, .. }
            | Self::PayoutStatusChanged { user_id, .. } => user_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PointsPosted { .. } => "points_posted",
            Self::TierChanged { .. } => "tier_changed",
            Self::RewardClaimed { .. } => "reward_claimed",
            Self::ClaimStatusChanged { .. } => "claim_status_changed",
            Self::InviteSent { .. } => "invite_sent",
            Self::InviteVerified { .. } => "invite_verified",
            Self::InviteConverted { .. } => "invite_converted",
            Self::InviteBlocked { .. } => "invite_blocked",
            Self::InviteUnblocked { .. } => "invite_unblocked",
            Self::InviteExpired { .. } => "invite_expired",
            Self::BadgeUpgraded { .. } => "badge_upgraded",
            Self::ListingAdded { .. } => "listing_added",
            Self::ListingStatusChanged { .. } => "listing_status_changed",
            Self::PayoutRecorded { .. } => "payout_recorded",
            Self::PayoutStatusChanged { .. } => "payout_status_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_changed_event_type() {
        let event = RewardsEvent::TierChanged {
            user_id: UserId::new("user_1"),
            from: LoyaltyTier::Bronze,
            to: LoyaltyTier::Silver,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "tier_changed");
        assert_eq!(event.user_id().as_str(), "user_1");
    }

    #[test]
    fn points_posted_serializes_with_tag() {
        let event = RewardsEvent::PointsPosted {
            user_id: UserId::new("user_1"),
            transaction_id: TransactionId::new(),
            kind: TransactionType::Earned,
            points: 2_400,
            balance: 2_400,
            lifetime_points: 2_400,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"points_posted\""));
        assert!(json.contains("\"kind\":\"earned\""));
        assert!(json.contains("2400"));
    }

    #[test]
    fn payout_status_change_is_keyed_by_seller() {
        let event = RewardsEvent::PayoutStatusChanged {
            user_id: UserId::new("seller_1"),
            payout_id: PayoutId::new(),
            from: PayoutStatus::Processing,
            to: PayoutStatus::Paid,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "payout_status_changed");
        assert_eq!(event.user_id().as_str(), "seller_1");
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"to\":\"paid\""));
    }
}
