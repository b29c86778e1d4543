//! Referral DTOs: codes, invites, verification, conversion and signup.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ReferralInvite, ReferralStats, ReferrerProfile, UserId};
use crate::service::{ConversionReceipt, InviteReceipt, SignupOutcome};

/// Request body for `POST /referrals/codes`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateCodeRequest {
    /// Loyalty member the code belongs to.
    pub user_id: UserId,
}

/// Request body for `POST /referrals/invites`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendInviteRequest {
    /// Referrer.
    pub inviter_id: UserId,
    /// Address being invited.
    pub invitee_email: String,
}

/// Response body for a sent invite (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct InviteResponse {
    /// The new invite.
    pub invite: ReferralInvite,
    /// Whether the invitation mail was accepted.
    pub notification_sent: bool,
}

impl From<InviteReceipt> for InviteResponse {
    fn from(receipt: InviteReceipt) -> Self {
        Self {
            invite: receipt.invite,
            notification_sent: receipt.notification_sent,
        }
    }
}

/// Request body for `POST /referrals/verify`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyInviteRequest {
    /// Code printed in the invitation.
    pub referral_code: String,
    /// Invitee address.
    pub email: String,
    /// Verification token from the invitation link.
    pub token: String,
}

/// Response body for `POST /referrals/invites/{invite_id}/convert`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionResponse {
    /// Invite after the call.
    pub invite: ReferralInvite,
    /// `true` if this call credited the bounty.
    pub credited: bool,
    /// Whether the referrer was notified.
    pub notification_sent: bool,
}

impl From<ConversionReceipt> for ConversionResponse {
    fn from(receipt: ConversionReceipt) -> Self {
        Self {
            invite: receipt.invite,
            credited: receipt.credited,
            notification_sent: receipt.notification_sent,
        }
    }
}

/// Request body for `POST /signup`.
///
/// The password is required but never stored here; credentials belong to
/// the identity provider.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// New member address.
    #[serde(default)]
    pub email: String,
    /// New member password.
    #[serde(default)]
    pub password: Option<String>,
    /// Referral code the member signed up with.
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// Response body for `POST /signup`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    /// Normalized address.
    pub email: String,
    /// Whether a matching invite was converted.
    pub referral_converted: bool,
    /// The converted invite, if any.
    pub invite: Option<ReferralInvite>,
}

impl SignupResponse {
    /// Builds the response from the service outcome.
    #[must_use]
    pub fn new(email: String, outcome: SignupOutcome) -> Self {
        Self {
            email,
            referral_converted: outcome.referral_converted,
            invite: outcome.invite,
        }
    }
}

/// Response body for `GET /referrals/users/{user_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserReferralResponse {
    /// Aggregates over the user's invites.
    pub stats: ReferralStats,
    /// Referrer profile, once a code has been generated.
    pub profile: Option<ReferrerProfile>,
    /// The user's invites, newest first.
    pub invites: Vec<ReferralInvite>,
}
