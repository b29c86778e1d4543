//! Referral codes, invites and referrer profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{InviteId, UserId};

/// Lifecycle state of an invite.
///
/// ```text
/// pending ──► verified ──► converted
/// pending ──► converted            (signup without verification)
/// pending | verified ──► expired   (TTL sweep)
/// pending | verified ──► blocked ──► pending   (admin toggle)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Sent, awaiting verification.
    Pending,
    /// Invitee proved ownership of the address.
    Verified,
    /// Invitee signed up; the bounty has been credited.
    Converted,
    /// Aged out before converting.
    Expired,
    /// Held by an admin.
    Blocked,
}

impl InviteStatus {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Converted => "converted",
            Self::Expired => "expired",
            Self::Blocked => "blocked",
        }
    }

    /// `pending` or `verified`: the invite can still convert or expire.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Verified)
    }
}

/// A referral outreach record.
///
/// `rewards > 0` only once `status == converted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferralInvite {
    /// Invite identifier.
    pub id: InviteId,
    /// Code the invite was sent under.
    pub referral_code: String,
    /// Referrer.
    pub inviter_user_id: UserId,
    /// Referrer display name at send time.
    pub inviter_name: String,
    /// Referrer address at send time.
    pub inviter_email: String,
    /// Invited address.
    pub invitee_email: String,
    /// Lifecycle state.
    pub status: InviteStatus,
    /// Send timestamp.
    pub sent_at: DateTime<Utc>,
    /// Verification timestamp.
    pub verified_at: Option<DateTime<Utc>>,
    /// Conversion timestamp.
    pub converted_at: Option<DateTime<Utc>>,
    /// Secret the invitee must present to verify.
    pub verification_token: String,
    /// Bounty credited on conversion, 0 before.
    pub rewards: i64,
    /// Set while an admin block is in force.
    pub is_blocked: bool,
    /// Reason given for the current block.
    pub block_reason: Option<String>,
}

/// A generated referral code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferralCode {
    /// Code text, e.g. `REF-STEPHEN4821`.
    pub code: String,
    /// Owner.
    pub user_id: UserId,
    /// Generation timestamp.
    pub created_at: DateTime<Utc>,
    /// Only the latest code per user is active.
    pub is_active: bool,
}

/// Running referral counters for one referrer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferrerProfile {
    /// Referrer.
    pub user_id: UserId,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Currently active code.
    pub referral_code: String,
    /// Invites ever sent.
    pub total_invites: u32,
    /// Invites converted.
    pub converted_invites: u32,
    /// Bounty points earned.
    pub total_rewards: i64,
    /// `converted_invites / total_invites * 100`, 0 with no invites.
    pub conversion_rate: f64,
}

impl ReferrerProfile {
    /// Recomputes `conversion_rate` from the counters.
    pub fn refresh_rate(&mut self) {
        self.conversion_rate = conversion_rate(self.converted_invites, self.total_invites);
    }
}

/// Per-referrer statistics derived from the invite list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReferralStats {
    /// Invites sent.
    pub total_invites: u32,
    /// Invites still `pending`.
    pub pending_invites: u32,
    /// Invites `converted`.
    pub converted_invites: u32,
    /// Sum of invite rewards.
    pub total_rewards: i64,
    /// Converted share in percent.
    pub conversion_rate: f64,
}

/// Platform-wide referral statistics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminReferralStats {
    /// Codes ever generated.
    pub total_codes: usize,
    /// Invites ever sent.
    pub total_invites: u32,
    /// Invites converted.
    pub total_conversions: u32,
    /// Sum of invite rewards.
    pub total_rewards: i64,
    /// Converted share in percent.
    pub conversion_rate: f64,
    /// Up to five referrers with the highest bounty totals.
    pub top_referrers: Vec<ReferrerProfile>,
}

/// Percentage of `converted` over `total`, 0 when `total` is 0.
#[must_use]
pub fn conversion_rate(converted: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(converted) / f64::from(total) * 100.0
}

/// Builds `REF-<FIRSTNAME><NNNN>` from a display name and a four-digit suffix.
///
/// Non-alphanumeric characters are dropped from the first name; an empty
/// result falls back to `MEMBER`.
#[must_use]
pub fn format_code(name: &str, suffix: u16) -> String {
    let first: String = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_uppercase();
    let first = if first.is_empty() {
        "MEMBER".to_string()
    } else {
        first
    };
    format!("REF-{first}{:04}", suffix % 10_000)
}
