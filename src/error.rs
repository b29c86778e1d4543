//! Service error types with HTTP status code mapping.
//!
//! [`RewardsError`] is the central error type. Each variant maps to a
//! numeric code, an HTTP status and a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ClaimId, InviteId, ListingId, PayoutId, RewardId, SellerId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "insufficient balance: 100 available, 250 required",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status            |
/// |-----------|---------------------|------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request        |
/// | 2000–2099 | Not Found           | 404 Not Found          |
/// | 2100–2199 | State conflict      | 409 Conflict           |
/// | 3000–3999 | Server              | 500 Internal Server Error |
/// | 4000–4999 | Business rule       | 422 / 403              |
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required field was empty or absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// No loyalty account or referrer with the given ID.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No catalog entry with the given ID.
    #[error("reward not found: {0}")]
    RewardNotFound(RewardId),

    /// No claim with the given ID.
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// No invite matched the lookup.
    #[error("referral invite not found")]
    InviteNotFound(Option<InviteId>),

    /// No seller with the given ID.
    #[error("seller not found: {0}")]
    SellerNotFound(SellerId),

    /// No listing with the given ID.
    #[error("listing not found: {0}")]
    ListingNotFound(ListingId),

    /// No payout with the given ID.
    #[error("payout not found: {0}")]
    PayoutNotFound(PayoutId),

    /// The inviter already invited this address.
    #[error("this email has already been invited")]
    AlreadyInvited,

    /// The invite has left the `pending` state.
    #[error("this referral has already been processed")]
    AlreadyProcessed,

    /// An entity with the same key already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The requested state change is not in the transition table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: &'static str,
        /// Requested state.
        to: &'static str,
    },

    /// The catalog entry is no longer redeemable.
    #[error("reward is no longer available: {0}")]
    RewardInactive(RewardId),

    /// The spendable balance does not cover the cost.
    #[error("insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        /// Current spendable balance.
        available: i64,
        /// Points needed.
        required: i64,
    },

    /// The acting user is banned.
    #[error("user is banned: {0}")]
    UserBanned(UserId),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RewardsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MissingField(_) => 1002,
            Self::UserNotFound(_) => 2001,
            Self::RewardNotFound(_) => 2002,
            Self::ClaimNotFound(_) => 2003,
            Self::InviteNotFound(_) => 2004,
            Self::SellerNotFound(_) => 2005,
            Self::ListingNotFound(_) => 2006,
            Self::PayoutNotFound(_) => 2007,
            Self::AlreadyInvited => 2101,
            Self::AlreadyProcessed => 2102,
            Self::AlreadyExists(_) => 2103,
            Self::InvalidTransition { .. } => 2104,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::RewardInactive(_) => 4001,
            Self::InsufficientBalance { .. } => 4002,
            Self::UserBanned(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound(_)
            | Self::RewardNotFound(_)
            | Self::ClaimNotFound(_)
            | Self::InviteNotFound(_)
            | Self::SellerNotFound(_)
            | Self::ListingNotFound(_)
            | Self::PayoutNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyInvited
            | Self::AlreadyProcessed
            | Self::AlreadyExists(_)
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::RewardInactive(_) | Self::InsufficientBalance { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::UserBanned(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RewardsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::InviteNotFound(Some(id)) => Some(format!("invite_id={id}")),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<sqlx::Error> for RewardsError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<serde_json::Error> for RewardsError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceError(format!("payload encoding: {err}"))
    }
}
