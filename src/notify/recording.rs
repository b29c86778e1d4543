//! In-process mailer that logs and queues every message.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DispatchReceipt, MailDispatcher, OutboundMessage};
use crate::error::RewardsError;

/// Mailer that records every accepted message.
///
/// Keeps every message in memory for inspection, so it suits tests and
/// short-lived tooling; the server binary uses [`super::LoggingMailer`].
/// [`Self::set_fail`] makes every dispatch fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: RwLock<Vec<OutboundMessage>>,
    fail: RwLock<bool>,
}

impl RecordingMailer {
    /// Creates an empty mailer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles forced failure.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Number of messages accepted so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// Copy of every accepted message, oldest first.
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl MailDispatcher for RecordingMailer {
    async fn dispatch(&self, message: OutboundMessage) -> Result<DispatchReceipt, RewardsError> {
        if *self.fail.read().await {
            return Err(RewardsError::Internal("mail dispatch refused".to_string()));
        }
        let message_id = format!("msg_{}", uuid::Uuid::new_v4().simple());
        tracing::info!(
            to = %message.to,
            kind = ?message.kind,
            subject = %message.subject,
            %message_id,
            "mail dispatched"
        );
        self.sent.write().await.push(message);
        Ok(DispatchReceipt {
            success: true,
            message_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::notify::{MessageKind, send_logged};

    fn message() -> OutboundMessage {
        OutboundMessage {
            to: "friend@example.com".to_string(),
            subject: "Hello".to_string(),
            html_body: "<p>Hi</p>".to_string(),
            text_body: "Hi".to_string(),
            kind: MessageKind::ReferralInvite,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn records_accepted_messages() {
        let mailer = RecordingMailer::new();
        let Ok(receipt) = mailer.dispatch(message()).await else {
            panic!("dispatch failed");
        };
        assert!(receipt.success);
        assert!(receipt.message_id.starts_with("msg_"));
        assert_eq!(mailer.sent_count().await, 1);
    }

    #[tokio::test]
    async fn forced_failure_records_nothing() {
        let mailer = RecordingMailer::new();
        mailer.set_fail(true).await;
        assert!(mailer.dispatch(message()).await.is_err());
        assert!(!send_logged(&mailer, message()).await);
        assert_eq!(mailer.sent_count().await, 0);
    }
}
