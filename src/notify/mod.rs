//! Outbound mail collaborator.
//!
//! The core hands fully rendered [`OutboundMessage`]s to a
//! [`MailDispatcher`] and only looks at whether dispatch succeeded. A failed
//! dispatch never rolls back the state change that triggered it.

pub mod logging;
pub mod messages;
pub mod recording;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RewardsError;

pub use logging::LoggingMailer;
pub use recording::RecordingMailer;

/// Category tag attached to every outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Invitation sent to a prospective member.
    ReferralInvite,
    /// Confirmation sent after the invitee verifies.
    ReferralVerification,
    /// Notice to the referrer that an invite converted.
    ReferralConverted,
    /// Receipt for a reward redemption.
    LoyaltyRedemption,
    /// Notice to a seller that their badge went up.
    BadgeUpgrade,
}

/// A fully rendered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OutboundMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Plain-text body.
    pub text_body: String,
    /// Category tag.
    pub kind: MessageKind,
    /// Free-form values the template was rendered from.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of handing a message to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchReceipt {
    /// Whether the collaborator accepted the message.
    pub success: bool,
    /// Collaborator-assigned message id.
    pub message_id: String,
}

/// Mail dispatch seam.
#[async_trait]
pub trait MailDispatcher: Send + Sync + std::fmt::Debug {
    /// Hands one message to the collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Internal`] if the collaborator refused the
    /// message.
    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, RewardsError>;
}

/// Dispatches and reduces the outcome to a success flag, logging failures.
///
/// Used by the services for fire-and-forget notifications.
pub async fn send_logged(mailer: &dyn MailDispatcher, message: OutboundMessage) -> bool {
    let kind = message.kind;
    let to = message.to.clone();
    match mailer.dispatch(message).await {
        Ok(receipt) => receipt.success,
        Err(e) => {
            tracing::warn!(?kind, %to, error = %e, "notification dispatch failed");
            false
        }
    }
}
