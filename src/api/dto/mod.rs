//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records that already carry a schema (ledger entries, claims,
//! invites, audit actions) are returned as-is; the types here wrap them
//! with request shapes and derived fields.

pub mod admin_dto;
pub mod common_dto;
pub mod loyalty_dto;
pub mod marketplace_dto;
pub mod notification_dto;
pub mod referral_dto;
pub mod seller_dto;

pub use admin_dto::*;
pub use common_dto::*;
pub use loyalty_dto::*;
pub use marketplace_dto::*;
pub use notification_dto::*;
pub use referral_dto::*;
pub use seller_dto::*;
