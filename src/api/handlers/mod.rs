//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod loyalty;
pub mod marketplace;
pub mod notification;
pub mod referral;
pub mod seller;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(loyalty::routes())
        .merge(referral::routes())
        .merge(admin::routes())
        .merge(seller::routes())
        .merge(marketplace::routes())
        .merge(notification::routes())
}
