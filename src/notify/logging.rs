//! Mailer that only logs, for running without a mail provider.

use async_trait::async_trait;

use super::{DispatchReceipt, MailDispatcher, OutboundMessage};
use crate::error::RewardsError;

/// Accepts every message and writes a `tracing` line for it.
///
/// Nothing is retained, so a long-running server does not accumulate
/// dispatched messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

impl LoggingMailer {
    /// Creates the mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailDispatcher for LoggingMailer {
    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, RewardsError> {
        let message_id = format!("msg_{}", uuid::Uuid::new_v4().simple());
        tracing::info!(
            to = %message.to,
            kind = ?message.kind,
            subject = %message.subject,
            %message_id,
            "mail dispatched"
        );
        Ok(DispatchReceipt {
            success: true,
            message_id,
        })
    }
}
