//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds an envelope stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error envelope.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    /// Serializes the envelope, `None` if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands carried in the payload of a [`WsMessageType::Command`] message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow events for specific users.
    Subscribe {
        /// User IDs to follow. Use `["*"]` for every user.
        user_ids: Vec<String>,
    },
    /// Stop following specific users.
    Unsubscribe {
        /// User IDs to drop; `"*"` drops the wildcard.
        user_ids: Vec<String>,
    },
    /// Fetch an account with its tier progress.
    GetAccount {
        /// Account owner.
        user_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_payload() {
        let payload = serde_json::json!({ "command": "subscribe", "user_ids": ["user_1", "*"] });
        let Ok(WsCommand::Subscribe { user_ids }) = serde_json::from_value(payload) else {
            panic!("expected subscribe");
        };
        assert_eq!(user_ids, ["user_1", "*"]);

        let payload = serde_json::json!({ "command": "get_account", "user_id": "user_1" });
        assert!(matches!(
            serde_json::from_value::<WsCommand>(payload),
            Ok(WsCommand::GetAccount { .. })
        ));
    }

    #[test]
    fn error_envelope_shape() {
        let Some(json) = WsMessage::error("req-1", 404, "unknown command").to_json() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("invalid json");
        };
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("error"));
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some("req-1"));
        assert_eq!(
            value.pointer("/payload/code").and_then(serde_json::Value::as_u64),
            Some(404)
        );
    }
}
