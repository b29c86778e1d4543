//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` pushes [`crate::domain::RewardsEvent`]s to clients
//! that subscribed to the affected user (or to `"*"`), and answers
//! `get_account` queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
