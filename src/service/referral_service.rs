//! Referral service: codes, invites, verification and conversion.
//!
//! Conversion is the only point where the referral and loyalty stores meet:
//! the bounty lands in the referrer's loyalty ledger as an `earned` entry
//! referencing the invite. Locks are always taken referral first, then
//! loyalty.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::LoyaltyService;
use crate::config::MAX_INVITE_TTL_DAYS;
use crate::domain::{
    AdminReferralStats, AdminStore, EventBus, InviteChange, InviteId, ReferralCode,
    ReferralInvite, ReferralStats, ReferralStore, ReferrerProfile, RewardsEvent, UserId,
};
use crate::error::RewardsError;
use crate::notify::{self, MailDispatcher, messages};

/// A sent invite and whether its mail went out.
#[derive(Debug, Clone)]
pub struct InviteReceipt {
    /// The new invite.
    pub invite: ReferralInvite,
    /// Whether the invitation mail was accepted.
    pub notification_sent: bool,
}

/// Result of a conversion attempt.
#[derive(Debug, Clone)]
pub struct ConversionReceipt {
    /// Invite after the call.
    pub invite: ReferralInvite,
    /// `true` if this call credited the bounty.
    pub credited: bool,
    /// Whether the referrer was notified.
    pub notification_sent: bool,
}

/// Result of a signup.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    /// Whether a matching invite was converted.
    pub referral_converted: bool,
    /// The converted invite, if any.
    pub invite: Option<ReferralInvite>,
}

/// Orchestration layer for the referral workflow.
#[derive(Debug, Clone)]
pub struct ReferralService {
    store: Arc<ReferralStore>,
    loyalty: Arc<LoyaltyService>,
    admin: Arc<AdminStore>,
    event_bus: EventBus,
    mailer: Arc<dyn MailDispatcher>,
    bounty: i64,
    invite_ttl: Duration,
}

impl ReferralService {
    /// Creates a new `ReferralService`.
    ///
    /// `invite_ttl_days` is clamped to `1..=MAX_INVITE_TTL_DAYS`. A
    /// non-positive `bounty` makes every conversion fail before it touches
    /// the invite.
    #[must_use]
    pub fn new(
        store: Arc<ReferralStore>,
        loyalty: Arc<LoyaltyService>,
        admin: Arc<AdminStore>,
        event_bus: EventBus,
        mailer: Arc<dyn MailDispatcher>,
        bounty: i64,
        invite_ttl_days: i64,
    ) -> Self {
        Self {
            store,
            loyalty,
            admin,
            event_bus,
            mailer,
            bounty,
            invite_ttl: Duration::days(invite_ttl_days.clamp(1, MAX_INVITE_TTL_DAYS)),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<ReferralStore> {
        &self.store
    }

    /// Points credited per conversion.
    #[must_use]
    pub const fn bounty(&self) -> i64 {
        self.bounty
    }

    /// Generates a new active code for a loyalty member.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] if the user has no loyalty
    /// account.
    pub async fn generate_code(&self, user_id: &UserId) -> Result<ReferralCode, RewardsError> {
        let account = self.loyalty.account(user_id).await?;
        let code = self
            .store
            .write(|s| s.generate_code(user_id, &account.email, &account.name, Utc::now()))
            .await?;
        tracing::info!(%user_id, code = %code.code, "referral code generated");
        Ok(code)
    }

    /// Sends a `pending` invite and mails the invitee.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] / [`RewardsError::InvalidRequest`]
    ///   for an empty or malformed address.
    /// - [`RewardsError::UserBanned`] for banned referrers.
    /// - [`RewardsError::UserNotFound`] if the referrer has no code.
    /// - [`RewardsError::AlreadyInvited`] for a repeated (referrer, address)
    ///   pair.
    pub async fn send_invite(
        &self,
        inviter_id: &UserId,
        invitee_email: &str,
    ) -> Result<InviteReceipt, RewardsError> {
        let invitee_email = normalize_email(invitee_email)?;
        let admin = self.admin.read_guard().await;
        if admin.is_banned(inviter_id) {
            return Err(RewardsError::UserBanned(inviter_id.clone()));
        }
        let invite = self
            .store
            .write(|s| s.send_invite(inviter_id, &invitee_email, Utc::now()))
            .await;
        drop(admin);
        let invite = invite?;

        let _ = self.event_bus.publish(RewardsEvent::InviteSent {
            user_id: inviter_id.clone(),
            invite_id: invite.id,
            invitee_email: invite.invitee_email.clone(),
            timestamp: invite.sent_at,
        });
        let message = messages::referral_invite(
            &invite.inviter_name,
            &invite.invitee_email,
            &invite.referral_code,
            &invite.verification_token,
        );
        let notification_sent = notify::send_logged(self.mailer.as_ref(), message).await;

        tracing::info!(%inviter_id, invite_id = %invite.id, invitee = %invite.invitee_email, "referral invite sent");
        Ok(InviteReceipt {
            invite,
            notification_sent,
        })
    }

    /// Verifies an invite by (code, email, token).
    ///
    /// The email is trimmed and lower-cased first, the same normalization
    /// applied when the invite was sent, so the address match is
    /// case-insensitive. Code and token must match exactly.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] / [`RewardsError::InvalidRequest`]
    ///   for an empty or malformed address.
    /// - [`RewardsError::InviteNotFound`] if nothing matches all three.
    /// - [`RewardsError::AlreadyProcessed`] if the invite left `pending`.
    pub async fn verify(
        &self,
        code: &str,
        email: &str,
        token: &str,
    ) -> Result<ReferralInvite, RewardsError> {
        let email = normalize_email(email)?;
        let invite = self
            .store
            .write(|s| s.verify(code, &email, token, Utc::now()))
            .await?;

        let _ = self.event_bus.publish(RewardsEvent::InviteVerified {
            user_id: invite.inviter_user_id.clone(),
            invite_id: invite.id,
            timestamp: Utc::now(),
        });
        let message = messages::referral_verification(&invite.invitee_email, &invite.referral_code);
        let _ = notify::send_logged(self.mailer.as_ref(), message).await;

        tracing::info!(invite_id = %invite.id, "referral invite verified");
        Ok(invite)
    }

    /// Converts an invite and credits the bounty to the referrer's ledger.
    ///
    /// Repeating the call on a converted invite credits nothing.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InviteNotFound`] for unknown invites.
    /// - [`RewardsError::UserNotFound`] if the referrer has no loyalty
    ///   account.
    /// - [`RewardsError::InvalidTransition`] for blocked or expired invites.
    /// - [`RewardsError::InvalidRequest`] if the configured bounty is not
    ///   positive; the invite is left untouched.
    pub async fn convert(&self, invite_id: InviteId) -> Result<ConversionReceipt, RewardsError> {
        if self.bounty <= 0 {
            return Err(RewardsError::InvalidRequest(format!(
                "referral bounty must be positive, got {}",
                self.bounty
            )));
        }
        let inviter = self
            .store
            .read(|s| s.invite(invite_id).map(|i| i.inviter_user_id.clone()))
            .await?;
        // The credit below must not fail once the invite is converted.
        self.loyalty.account(&inviter).await?;

        let change = self
            .store
            .write(|s| s.convert(invite_id, self.bounty, Utc::now()))
            .await?;
        if !change.changed {
            return Ok(ConversionReceipt {
                invite: change.invite,
                credited: false,
                notification_sent: false,
            });
        }
        let invite = change.invite;

        self.loyalty
            .add_points(
                &invite.inviter_user_id,
                self.bounty,
                format!("Referral conversion - {}", invite.invitee_email),
                Some(invite.id.to_string()),
            )
            .await?;

        let _ = self.event_bus.publish(RewardsEvent::InviteConverted {
            user_id: invite.inviter_user_id.clone(),
            invite_id: invite.id,
            rewards: invite.rewards,
            timestamp: invite.converted_at.unwrap_or_else(Utc::now),
        });
        let message = messages::referral_converted(
            &invite.inviter_email,
            &invite.inviter_name,
            &invite.invitee_email,
            invite.rewards,
        );
        let notification_sent = notify::send_logged(self.mailer.as_ref(), message).await;

        tracing::info!(
            invite_id = %invite.id,
            inviter = %invite.inviter_user_id,
            bounty = invite.rewards,
            from = change.from.as_str(),
            "referral converted"
        );
        Ok(ConversionReceipt {
            invite,
            credited: true,
            notification_sent,
        })
    }

    /// Records a signup and converts the matching open invite, if any.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for an empty email.
    /// - Any error from [`Self::convert`].
    pub async fn complete_signup(
        &self,
        email: &str,
        referral_code: Option<&str>,
    ) -> Result<SignupOutcome, RewardsError> {
        let email = normalize_email(email)?;
        let Some(code) = referral_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(SignupOutcome {
                referral_converted: false,
                invite: None,
            });
        };
        let Some(invite_id) = self.store.read(|s| s.signup_invite(code, &email)).await else {
            tracing::debug!(%email, code, "signup without matching invite");
            return Ok(SignupOutcome {
                referral_converted: false,
                invite: None,
            });
        };
        let receipt = self.convert(invite_id).await?;
        Ok(SignupOutcome {
            referral_converted: receipt.credited,
            invite: Some(receipt.invite),
        })
    }

    /// Expires open invites older than the configured TTL.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Vec<ReferralInvite> {
        let ttl = self.invite_ttl;
        let expired: Vec<InviteChange> = self.store.write(|s| s.expire_stale(now, ttl)).await;
        for change in &expired {
            let _ = self.event_bus.publish(RewardsEvent::InviteExpired {
                user_id: change.invite.inviter_user_id.clone(),
                invite_id: change.invite.id,
                from: change.from,
                timestamp: now,
            });
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "stale referral invites expired");
        }
        expired.into_iter().map(|c| c.invite).collect()
    }

    /// Statistics for one referrer.
    pub async fn user_stats(&self, user_id: &UserId) -> ReferralStats {
        self.store.read(|s| s.user_stats(user_id)).await
    }

    /// A referrer's running counters.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] if the user never generated a
    /// code.
    pub async fn profile(&self, user_id: &UserId) -> Result<ReferrerProfile, RewardsError> {
        self.store.read(|s| s.profile(user_id).cloned()).await
    }

    /// Invites sent by one referrer, newest first.
    pub async fn invites_for(&self, user_id: &UserId) -> Vec<ReferralInvite> {
        self.store
            .read(|s| {
                s.invites()
                    .iter()
                    .rev()
                    .filter(|i| &i.inviter_user_id == user_id)
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Platform-wide statistics.
    pub async fn admin_stats(&self) -> AdminReferralStats {
        self.store.read(|s| s.admin_stats()).await
    }

    /// Every invite in send order, for export.
    pub async fn invites(&self) -> Vec<ReferralInvite> {
        self.store.read(|s| s.invites().to_vec()).await
    }

    /// Every generated code in generation order.
    pub async fn codes(&self) -> Vec<ReferralCode> {
        self.store.read(|s| s.codes().to_vec()).await
    }
}

/// Trims and lower-cases an address, rejecting empty or `@`-less input.
fn normalize_email(raw: &str) -> Result<String, RewardsError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(RewardsError::MissingField("email"));
    }
    if !email.contains('@') {
        return Err(RewardsError::InvalidRequest(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(email.to_lowercase())
}
