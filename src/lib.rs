//! # trendies-rewards
//!
//! Loyalty ledger, reward redemption, referral and seller badge service for
//! Trendies Seller Pro, exposed over REST and WebSocket.
//!
//! Points live in an append-only ledger; balances and tiers are derived
//! from it. Redemptions debit the ledger and open claims that admins move
//! through a strict moderation table. Referral invites credit a fixed bounty
//! to the referrer exactly once on conversion.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Loyalty / Referral / Moderation / Seller services (service/)
//!     ├── EventBus (domain/)      MailDispatcher (notify/)
//!     │
//!     ├── LoyaltyStore, ReferralStore, AdminStore, SellerDirectory (domain/)
//!     │
//!     └── PostgreSQL snapshots (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod ws;
