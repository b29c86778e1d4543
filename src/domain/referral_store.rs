//! Referral store: codes, invites and referrer counters.
//!
//! Same shape as the loyalty store: a plain [`ReferralState`] holding the
//! rules and a [`ReferralStore`] serializing access behind one
//! [`tokio::sync::RwLock`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::referral::{
    AdminReferralStats, InviteStatus, ReferralCode, ReferralInvite, ReferralStats,
    ReferrerProfile, conversion_rate, format_code,
};
use super::{InviteId, UserId};
use crate::error::RewardsError;

/// Number of referrers returned by [`ReferralState::admin_stats`].
const TOP_REFERRERS: usize = 5;

/// Length of a generated verification token.
const TOKEN_LEN: usize = 13;

/// Result of an invite state change.
#[derive(Debug, Clone)]
pub struct InviteChange {
    /// Status before the call.
    pub from: InviteStatus,
    /// Invite after the call.
    pub invite: ReferralInvite,
    /// `false` when the call was an idempotent no-op.
    pub changed: bool,
}

/// Plain referral data and its rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferralState {
    codes: Vec<ReferralCode>,
    invites: Vec<ReferralInvite>,
    referrers: HashMap<UserId, ReferrerProfile>,
}

impl ReferralState {
    /// Generates a fresh code for a user and makes it their active code.
    ///
    /// The four-digit suffix starts from the last four digits of `now` in
    /// milliseconds and is bumped until the code is unused.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Internal`] if all 10 000 suffixes for this
    /// name are taken.
    pub fn generate_code(
        &mut self,
        user_id: &UserId,
        email: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<ReferralCode, RewardsError> {
        let start = u16::try_from(now.timestamp_millis().rem_euclid(10_000)).unwrap_or(0);
        let code = (0..10_000_u16)
            .map(|offset| format_code(name, (start + offset) % 10_000))
            .find(|candidate| !self.codes.iter().any(|c| &c.code == candidate))
            .ok_or_else(|| RewardsError::Internal(format!("referral codes exhausted for {name}")))?;

        for existing in self.codes.iter_mut().filter(|c| &c.user_id == user_id) {
            existing.is_active = false;
        }
        let record = ReferralCode {
            code: code.clone(),
            user_id: user_id.clone(),
            created_at: now,
            is_active: true,
        };
        self.codes.push(record.clone());

        let profile = self
            .referrers
            .entry(user_id.clone())
            .or_insert_with(|| ReferrerProfile {
                user_id: user_id.clone(),
                email: email.to_string(),
                name: name.to_string(),
                referral_code: String::new(),
                total_invites: 0,
                converted_invites: 0,
                total_rewards: 0,
                conversion_rate: 0.0,
            });
        profile.referral_code = code;
        profile.email = email.to_string();
        profile.name = name.to_string();

        Ok(record)
    }

    /// Creates a `pending` invite from a referrer to an address.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::UserNotFound`] if the inviter has no referral code.
    /// - [`RewardsError::AlreadyInvited`] if this inviter already invited
    ///   this address.
    pub fn send_invite(
        &mut self,
        inviter_id: &UserId,
        invitee_email: &str,
        now: DateTime<Utc>,
    ) -> Result<ReferralInvite, RewardsError> {
        let profile = self
            .referrers
            .get_mut(inviter_id)
            .ok_or_else(|| RewardsError::UserNotFound(inviter_id.clone()))?;
        if self
            .invites
            .iter()
            .any(|i| &i.inviter_user_id == inviter_id && i.invitee_email == invitee_email)
        {
            return Err(RewardsError::AlreadyInvited);
        }

        let invite = ReferralInvite {
            id: InviteId::new(),
            referral_code: profile.referral_code.clone(),
            inviter_user_id: inviter_id.clone(),
            inviter_name: profile.name.clone(),
            inviter_email: profile.email.clone(),
            invitee_email: invitee_email.to_string(),
            status: InviteStatus::Pending,
            sent_at: now,
            verified_at: None,
            converted_at: None,
            verification_token: new_token(),
            rewards: 0,
            is_blocked: false,
            block_reason: None,
        };
        profile.total_invites = profile.total_invites.saturating_add(1);
        profile.refresh_rate();
        self.invites.push(invite.clone());
        Ok(invite)
    }

    /// Verifies an invite by exact (code, email, token) match.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InviteNotFound`] if nothing matches all three.
    /// - [`RewardsError::AlreadyProcessed`] if the match is not `pending`.
    pub fn verify(
        &mut self,
        code: &str,
        email: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ReferralInvite, RewardsError> {
        let invite = self
            .invites
            .iter_mut()
            .find(|i| {
                i.referral_code == code && i.invitee_email == email && i.verification_token == token
            })
            .ok_or(RewardsError::InviteNotFound(None))?;
        if invite.status != InviteStatus::Pending {
            return Err(RewardsError::AlreadyProcessed);
        }
        invite.status = InviteStatus::Verified;
        invite.verified_at = Some(now);
        Ok(invite.clone())
    }

    /// Converts an open invite and credits the bounty to its referrer.
    ///
    /// Converting an already-converted invite is a no-op, so the bounty is
    /// credited at most once.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InviteNotFound`] for unknown invites.
    /// - [`RewardsError::InvalidTransition`] for `blocked` or `expired`.
    pub fn convert(
        &mut self,
        invite_id: InviteId,
        bounty: i64,
        now: DateTime<Utc>,
    ) -> Result<InviteChange, RewardsError> {
        let invite = self.invite_mut(invite_id)?;
        let from = invite.status;
        match from {
            InviteStatus::Converted => {
                return Ok(InviteChange {
                    from,
                    invite: invite.clone(),
                    changed: false,
                });
            }
            InviteStatus::Blocked | InviteStatus::Expired => {
                return Err(RewardsError::InvalidTransition {
                    from: from.as_str(),
                    to: InviteStatus::Converted.as_str(),
                });
            }
            InviteStatus::Pending | InviteStatus::Verified => {}
        }
        invite.status = InviteStatus::Converted;
        invite.converted_at = Some(now);
        invite.rewards = bounty;
        let invite = invite.clone();

        if let Some(profile) = self.referrers.get_mut(&invite.inviter_user_id) {
            profile.converted_invites = profile.converted_invites.saturating_add(1);
            profile.total_rewards = profile.total_rewards.saturating_add(bounty);
            profile.refresh_rate();
        }
        Ok(InviteChange {
            from,
            invite,
            changed: true,
        })
    }

    /// Places an admin block on an open invite.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::InviteNotFound`] for unknown invites.
    /// - [`RewardsError::InvalidTransition`] for `converted` or `expired`.
    pub fn block(&mut self, invite_id: InviteId, reason: &str) -> Result<InviteChange, RewardsError> {
        let invite = self.invite_mut(invite_id)?;
        let from = invite.status;
        match from {
            InviteStatus::Blocked => Ok(InviteChange {
                from,
                invite: invite.clone(),
                changed: false,
            }),
            InviteStatus::Converted | InviteStatus::Expired => {
                Err(RewardsError::InvalidTransition {
                    from: from.as_str(),
                    to: InviteStatus::Blocked.as_str(),
                })
            }
            InviteStatus::Pending | InviteStatus::Verified => {
                invite.status = InviteStatus::Blocked;
                invite.is_blocked = true;
                invite.block_reason = Some(reason.to_string());
                Ok(InviteChange {
                    from,
                    invite: invite.clone(),
                    changed: true,
                })
            }
        }
    }

    /// Lifts an admin block, returning the invite to `pending`.
    ///
    /// Any earlier verification is discarded. Unblocking an invite that is
    /// not blocked is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InviteNotFound`] for unknown invites.
    pub fn unblock(&mut self, invite_id: InviteId) -> Result<InviteChange, RewardsError> {
        let invite = self.invite_mut(invite_id)?;
        let from = invite.status;
        if from != InviteStatus::Blocked {
            return Ok(InviteChange {
                from,
                invite: invite.clone(),
                changed: false,
            });
        }
        invite.status = InviteStatus::Pending;
        invite.is_blocked = false;
        invite.block_reason = None;
        invite.verified_at = None;
        Ok(InviteChange {
            from,
            invite: invite.clone(),
            changed: true,
        })
    }

    /// Expires every open invite sent more than `ttl` before `now`.
    pub fn expire_stale(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<InviteChange> {
        self.invites
            .iter_mut()
            .filter(|i| i.status.is_open() && now - i.sent_at > ttl)
            .map(|invite| {
                let from = invite.status;
                invite.status = InviteStatus::Expired;
                InviteChange {
                    from,
                    invite: invite.clone(),
                    changed: true,
                }
            })
            .collect()
    }

    /// Finds the open, unblocked invite a signup with this code and email
    /// should convert.
    #[must_use]
    pub fn signup_invite(&self, code: &str, email: &str) -> Option<InviteId> {
        self.invites
            .iter()
            .find(|i| i.referral_code == code && i.invitee_email == email && i.status.is_open())
            .map(|i| i.id)
    }

    /// Looks up an invite.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InviteNotFound`] for unknown invites.
    pub fn invite(&self, invite_id: InviteId) -> Result<&ReferralInvite, RewardsError> {
        self.invites
            .iter()
            .find(|i| i.id == invite_id)
            .ok_or(RewardsError::InviteNotFound(Some(invite_id)))
    }

    fn invite_mut(&mut self, invite_id: InviteId) -> Result<&mut ReferralInvite, RewardsError> {
        self.invites
            .iter_mut()
            .find(|i| i.id == invite_id)
            .ok_or(RewardsError::InviteNotFound(Some(invite_id)))
    }

    /// Every invite in send order.
    #[must_use]
    pub fn invites(&self) -> &[ReferralInvite] {
        &self.invites
    }

    /// Every generated code in generation order.
    #[must_use]
    pub fn codes(&self) -> &[ReferralCode] {
        &self.codes
    }

    /// A referrer's running counters.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] if the user never generated a
    /// code.
    pub fn profile(&self, user_id: &UserId) -> Result<&ReferrerProfile, RewardsError> {
        self.referrers
            .get(user_id)
            .ok_or_else(|| RewardsError::UserNotFound(user_id.clone()))
    }

    /// Statistics for one referrer, derived from their invites.
    #[must_use]
    pub fn user_stats(&self, user_id: &UserId) -> ReferralStats {
        let mine = self.invites.iter().filter(|i| &i.inviter_user_id == user_id);
        let (mut total, mut pending, mut converted, mut rewards) = (0_u32, 0_u32, 0_u32, 0_i64);
        for invite in mine {
            total += 1;
            match invite.status {
                InviteStatus::Pending => pending += 1,
                InviteStatus::Converted => converted += 1,
                _ => {}
            }
            rewards += invite.rewards;
        }
        ReferralStats {
            total_invites: total,
            pending_invites: pending,
            converted_invites: converted,
            total_rewards: rewards,
            conversion_rate: conversion_rate(converted, total),
        }
    }

    /// Platform-wide statistics.
    #[must_use]
    pub fn admin_stats(&self) -> AdminReferralStats {
        let total_invites = u32::try_from(self.invites.len()).unwrap_or(u32::MAX);
        let total_conversions = u32::try_from(
            self.invites
                .iter()
                .filter(|i| i.status == InviteStatus::Converted)
                .count(),
        )
        .unwrap_or(u32::MAX);
        let mut top_referrers: Vec<ReferrerProfile> = self.referrers.values().cloned().collect();
        top_referrers.sort_by(|a, b| {
            b.total_rewards
                .cmp(&a.total_rewards)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        top_referrers.truncate(TOP_REFERRERS);

        AdminReferralStats {
            total_codes: self.codes.len(),
            total_invites,
            total_conversions,
            total_rewards: self.invites.iter().map(|i| i.rewards).sum(),
            conversion_rate: conversion_rate(total_conversions, total_invites),
            top_referrers,
        }
    }
}

/// Random lowercase alphanumeric verification token.
fn new_token() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(TOKEN_LEN)
        .collect()
}

/// Concurrent handle to the referral state.
#[derive(Debug, Default)]
pub struct ReferralStore {
    state: RwLock<ReferralState>,
}

impl ReferralStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&ReferralState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` under the write lock; all mutations go through here.
    pub async fn write<R>(&self, f: impl FnOnce(&mut ReferralState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Clones the whole state for persistence.
    pub async fn snapshot(&self) -> ReferralState {
        self.state.read().await.clone()
    }

    /// Replaces the whole state with a restored snapshot.
    pub async fn restore(&self, state: ReferralState) {
        *self.state.write().await = state;
    }
}
