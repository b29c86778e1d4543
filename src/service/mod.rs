//! Service layer: business logic orchestration.
//!
//! Services run domain rules under the store locks, emit events through the
//! [`super::domain::EventBus`] and hand notifications to the mail
//! collaborator.

pub mod loyalty_service;
pub mod marketplace_service;
pub mod moderation_service;
pub mod referral_service;
pub mod seller_service;

pub use loyalty_service::{LoyaltyService, RedemptionReceipt};
pub use marketplace_service::MarketplaceService;
pub use moderation_service::{ClaimDecision, InviteDecision, ModerationService};
pub use referral_service::{ConversionReceipt, InviteReceipt, ReferralService, SignupOutcome};
pub use seller_service::{SaleReceipt, SellerService};
