//! Domain layer: identifiers, tiers, the stores and the event system.
//!
//! Each store keeps its plain state (`*State`) separate from the
//! `RwLock`-guarded handle the services share, so every rule is testable
//! synchronously and every mutation runs under a single write guard.

pub mod account;
pub mod audit;
pub mod catalog;
pub mod claim;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod listing;
pub mod loyalty_store;
pub mod marketplace_store;
pub mod payout;
pub mod referral;
pub mod referral_store;
pub mod rewards_event;
pub mod seller;
pub mod tier;

pub use account::LoyaltyAccount;
pub use audit::{AdminAction, AdminActionType, AdminState, AdminStore, BannedUser};
pub use catalog::{LoyaltyReward, RewardCatalog, RewardCategory};
pub use claim::{ClaimFilter, ClaimStatus, ClaimedReward, DateWindow};
pub use event_bus::EventBus;
pub use ids::{
    ActionId, ClaimId, InviteId, ListingId, PayoutId, RewardId, SellerId, TransactionId, UserId,
};
pub use ledger::{Ledger, PointsTransaction, TransactionType};
pub use listing::{Listing, ListingFilter, ListingStatus, NewListing};
pub use loyalty_store::{
    ClaimTransition, LoyaltyState, LoyaltyStats, LoyaltyStore, PostingOutcome, Redemption,
};
pub use marketplace_store::{
    ListingChange, MarketplaceState, MarketplaceStore, PayoutTransition,
};
pub use payout::{NewPayout, Payout, PayoutStatus, PayoutSummary};
pub use referral::{
    AdminReferralStats, InviteStatus, ReferralCode, ReferralInvite, ReferralStats,
    ReferrerProfile,
};
pub use referral_store::{InviteChange, ReferralState, ReferralStore};
pub use rewards_event::RewardsEvent;
pub use seller::{SaleOutcome, SellerDirectory, SellerProfile, SellerState};
pub use tier::{LoyaltyTier, SellerBadge, TierProgress};
