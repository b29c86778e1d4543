//! Mail forwarder DTOs.
//!
//! Required fields are modelled as `Option` so a missing value surfaces as
//! [`RewardsError::MissingField`] rather than a deserialization rejection.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::RewardsError;

/// Request body for `POST /notifications/redemption`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedemptionNoticeRequest {
    /// Recipient address.
    pub to_email: Option<String>,
    /// Recipient display name.
    #[serde(default)]
    pub username: String,
    /// Redeemed reward.
    pub reward_name: Option<String>,
    /// Points spent.
    #[serde(default)]
    pub points_cost: i64,
    /// Balance after the redemption.
    #[serde(default)]
    pub remaining_points: i64,
}

/// Request body for `POST /notifications/referral`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReferralNoticeRequest {
    /// Invitee address.
    pub invite_email: Option<String>,
    /// Referrer's code.
    pub referral_code: Option<String>,
    /// Referrer display name.
    #[serde(default)]
    pub inviter_name: String,
    /// Verification token, when known.
    #[serde(default)]
    pub token: String,
}

/// Returns the trimmed value or [`RewardsError::MissingField`].
///
/// # Errors
///
/// Returns [`RewardsError::MissingField`] when `value` is absent or blank.
pub fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, RewardsError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RewardsError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(matches!(
            required(None, "to_email"),
            Err(RewardsError::MissingField("to_email"))
        ));
        assert!(matches!(
            required(Some("  "), "reward_name"),
            Err(RewardsError::MissingField("reward_name"))
        ));
        assert!(matches!(required(Some(" a@b.c "), "to_email"), Ok("a@b.c")));
    }
}
