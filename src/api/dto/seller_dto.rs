//! Seller DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{SellerBadge, SellerId, SellerProfile};
use crate::service::SaleReceipt;

/// Request body for `POST /sellers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterSellerRequest {
    /// Caller-chosen seller key.
    pub seller_id: SellerId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact address.
    pub email: String,
}

/// Request body for `POST /sellers/{seller_id}/sales`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordSaleRequest {
    /// Positive sale amount.
    pub amount: i64,
}

/// Response body for a recorded sale.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    /// Seller after the sale.
    pub seller: SellerProfile,
    /// New badge, if the sale crossed a threshold.
    pub upgraded_to: Option<SellerBadge>,
    /// Whether the upgrade mail went out.
    pub notification_sent: bool,
}

impl From<SaleReceipt> for SaleResponse {
    fn from(receipt: SaleReceipt) -> Self {
        Self {
            seller: receipt.seller,
            upgraded_to: receipt.upgraded_to,
            notification_sent: receipt.notification_sent,
        }
    }
}
