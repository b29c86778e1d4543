//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::AccountResponse;
use crate::domain::{RewardsEvent, UserId};
use crate::service::LoyaltyService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events whose `user_id` passes the subscription filter.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<RewardsEvent>,
    loyalty: Arc<LoyaltyService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &loyalty).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(event.user_id()) {
                            continue;
                        }
                        let Ok(payload) = serde_json::to_value(&event) else {
                            tracing::warn!(event_type = event.event_type_str(), "event not serializable");
                            continue;
                        };
                        let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
                        let Some(json) = msg.to_json() else { continue };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    loyalty: &LoyaltyService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON").to_json();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command").to_json();
    };

    let payload = match command {
        WsCommand::Subscribe { user_ids } => {
            let added = subs.subscribe(&user_ids);
            serde_json::json!({
                "subscribed": added,
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { user_ids } => {
            let removed = subs.unsubscribe(&user_ids);
            serde_json::json!({
                "unsubscribed": removed,
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::GetAccount { user_id } => {
            match loyalty.account(&UserId::new(user_id)).await {
                Ok(account) => serde_json::to_value(AccountResponse::from(account)).ok()?,
                Err(e) => {
                    return WsMessage::error(msg.id, e.error_code(), &e.to_string()).to_json();
                }
            }
        }
    };

    WsMessage::new(msg.id, WsMessageType::Response, payload).to_json()
}
