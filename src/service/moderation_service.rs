//! Moderation service: claim review, invite blocks and user bans.
//!
//! Every decision that changes state appends exactly one audit entry.
//! Rejected transitions and no-ops append nothing.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::domain::{
    AdminAction, AdminActionType, AdminStore, BannedUser, ClaimFilter, ClaimId, ClaimStatus,
    ClaimedReward, EventBus, InviteId, LoyaltyStore, ReferralInvite, ReferralStore,
    RewardsEvent, UserId,
};
use crate::error::RewardsError;

/// Notes attached to claims approved in bulk.
const BULK_APPROVE_NOTES: &str = "Bulk approved by admin";

/// A claim decision and its audit entry.
#[derive(Debug, Clone)]
pub struct ClaimDecision {
    /// Claim after the decision.
    pub claim: ClaimedReward,
    /// Audit entry.
    pub action: AdminAction,
}

/// An invite decision; `action` is `None` for no-ops.
#[derive(Debug, Clone)]
pub struct InviteDecision {
    /// Invite after the decision.
    pub invite: ReferralInvite,
    /// Audit entry, if the invite changed.
    pub action: Option<AdminAction>,
}

/// Maps a target claim state to its audit action.
const fn claim_action(status: ClaimStatus) -> Option<AdminActionType> {
    match status {
        ClaimStatus::Approved => Some(AdminActionType::ApproveReward),
        ClaimStatus::Cancelled => Some(AdminActionType::RejectReward),
        ClaimStatus::Delivered => Some(AdminActionType::DeliverReward),
        ClaimStatus::Pending => None,
    }
}

/// Orchestration layer for admin decisions.
#[derive(Debug, Clone)]
pub struct ModerationService {
    loyalty: Arc<LoyaltyStore>,
    referrals: Arc<ReferralStore>,
    admin: Arc<AdminStore>,
    event_bus: EventBus,
}

impl ModerationService {
    /// Creates a new `ModerationService`.
    #[must_use]
    pub fn new(
        loyalty: Arc<LoyaltyStore>,
        referrals: Arc<ReferralStore>,
        admin: Arc<AdminStore>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            loyalty,
            referrals,
            admin,
            event_bus,
        }
    }

    /// Returns the audit store.
    #[must_use]
    pub fn store(&self) -> &Arc<AdminStore> {
        &self.admin
    }

    /// Moves a claim along the moderation table and audits the decision.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::ClaimNotFound`] for unknown claims.
    /// - [`RewardsError::InvalidTransition`] for moves outside the table,
    ///   including any move back to `pending`.
    pub async fn set_claim_status(
        &self,
        claim_id: ClaimId,
        status: ClaimStatus,
        admin_id: &str,
        notes: Option<String>,
    ) -> Result<ClaimDecision, RewardsError> {
        let notes = notes.filter(|n| !n.trim().is_empty());
        let transition = self
            .loyalty
            .write(|s| s.set_claim_status(claim_id, status, notes.clone()))
            .await?;
        let Some(kind) = claim_action(status) else {
            return Err(RewardsError::Internal(format!(
                "claim moved to {} without an audit action",
                status.as_str()
            )));
        };

        let claim = transition.claim;
        let metadata = json!({
            "reward_name": claim.reward_name,
            "user_id": claim.user_id,
            "username": claim.username,
            "points_cost": claim.points_cost,
            "from": transition.from.as_str(),
            "to": status.as_str(),
        });
        let action = self
            .admin
            .write(|s| {
                s.record(
                    kind,
                    claim.id.to_string(),
                    notes.unwrap_or_default(),
                    admin_id,
                    Some(metadata),
                )
            })
            .await;

        let _ = self.event_bus.publish(RewardsEvent::ClaimStatusChanged {
            user_id: claim.user_id.clone(),
            claim_id,
            from: transition.from,
            to: status,
            timestamp: action.performed_at,
        });
        tracing::info!(
            %claim_id,
            from = transition.from.as_str(),
            to = status.as_str(),
            admin = admin_id,
            "claim status changed"
        );
        Ok(ClaimDecision { claim, action })
    }

    /// Approves every `pending` claim in the filtered view.
    ///
    /// Each claim gets its own audit entry. A claim that stopped being
    /// pending since the view was taken is skipped.
    pub async fn bulk_approve(&self, filter: &ClaimFilter, admin_id: &str) -> Vec<ClaimDecision> {
        let pending: Vec<ClaimId> = self
            .claims(filter)
            .await
            .into_iter()
            .filter(|c| c.status == ClaimStatus::Pending)
            .map(|c| c.id)
            .collect();

        let mut decisions = Vec::with_capacity(pending.len());
        for claim_id in pending {
            match self
                .set_claim_status(
                    claim_id,
                    ClaimStatus::Approved,
                    admin_id,
                    Some(BULK_APPROVE_NOTES.to_string()),
                )
                .await
            {
                Ok(decision) => decisions.push(decision),
                Err(e) => tracing::warn!(%claim_id, error = %e, "bulk approve skipped claim"),
            }
        }
        tracing::info!(count = decisions.len(), admin = admin_id, "bulk approve finished");
        decisions
    }

    /// Claims passing `filter`, newest first.
    pub async fn claims(&self, filter: &ClaimFilter) -> Vec<ClaimedReward> {
        let now = Utc::now();
        self.loyalty.read(|s| s.filter_claims(filter, now)).await
    }

    /// Blocks an open invite.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for an empty reason.
    /// - [`RewardsError::InviteNotFound`] for unknown invites.
    /// - [`RewardsError::InvalidTransition`] for converted or expired
    ///   invites.
    pub async fn block_invite(
        &self,
        invite_id: InviteId,
        reason: &str,
        admin_id: &str,
    ) -> Result<InviteDecision, RewardsError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RewardsError::MissingField("reason"));
        }
        let change = self.referrals.write(|s| s.block(invite_id, reason)).await?;
        if !change.changed {
            return Ok(InviteDecision {
                invite: change.invite,
                action: None,
            });
        }
        let invite = change.invite;
        let action = self
            .admin
            .write(|s| {
                s.record(
                    AdminActionType::BlockReferral,
                    invite.id.to_string(),
                    reason,
                    admin_id,
                    Some(invite_metadata(&invite, change.from.as_str())),
                )
            })
            .await;

        let _ = self.event_bus.publish(RewardsEvent::InviteBlocked {
            user_id: invite.inviter_user_id.clone(),
            invite_id,
            reason: reason.to_string(),
            timestamp: action.performed_at,
        });
        tracing::info!(%invite_id, admin = admin_id, reason, "referral invite blocked");
        Ok(InviteDecision {
            invite,
            action: Some(action),
        })
    }

    /// Lifts an invite block.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InviteNotFound`] for unknown invites.
    pub async fn unblock_invite(
        &self,
        invite_id: InviteId,
        admin_id: &str,
    ) -> Result<InviteDecision, RewardsError> {
        let change = self.referrals.write(|s| s.unblock(invite_id)).await?;
        if !change.changed {
            return Ok(InviteDecision {
                invite: change.invite,
                action: None,
            });
        }
        let invite = change.invite;
        let action = self
            .admin
            .write(|s| {
                s.record(
                    AdminActionType::UnblockReferral,
                    invite.id.to_string(),
                    "Block lifted",
                    admin_id,
                    Some(invite_metadata(&invite, change.from.as_str())),
                )
            })
            .await;

        let _ = self.event_bus.publish(RewardsEvent::InviteUnblocked {
            user_id: invite.inviter_user_id.clone(),
            invite_id,
            timestamp: action.performed_at,
        });
        tracing::info!(%invite_id, admin = admin_id, "referral invite unblocked");
        Ok(InviteDecision {
            invite,
            action: Some(action),
        })
    }

    /// Bans a user from redeeming and inviting.
    ///
    /// # Errors
    ///
    /// - [`RewardsError::MissingField`] for an empty reason.
    /// - [`RewardsError::AlreadyExists`] if the user is already banned.
    pub async fn ban_user(
        &self,
        user_id: &UserId,
        email: &str,
        reason: &str,
        admin_id: &str,
    ) -> Result<AdminAction, RewardsError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RewardsError::MissingField("reason"));
        }
        let action = self
            .admin
            .write(|s| s.ban(user_id, email, reason, admin_id))
            .await
            .ok_or_else(|| RewardsError::AlreadyExists(format!("ban for {user_id}")))?;
        tracing::info!(%user_id, admin = admin_id, reason, "user banned");
        Ok(action)
    }

    /// Lifts a ban.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::UserNotFound`] if the user is not banned.
    pub async fn unban_user(
        &self,
        user_id: &UserId,
        admin_id: &str,
    ) -> Result<AdminAction, RewardsError> {
        let action = self
            .admin
            .write(|s| s.unban(user_id, admin_id))
            .await
            .ok_or_else(|| RewardsError::UserNotFound(user_id.clone()))?;
        tracing::info!(%user_id, admin = admin_id, "user unbanned");
        Ok(action)
    }

    /// Current bans.
    pub async fn banned_users(&self) -> Vec<BannedUser> {
        self.admin.read(|s| s.banned()).await
    }

    /// The full audit log, oldest first.
    pub async fn actions(&self) -> Vec<AdminAction> {
        self.admin.read(|s| s.actions().to_vec()).await
    }
}

fn invite_metadata(invite: &ReferralInvite, from: &str) -> serde_json::Value {
    json!({
        "inviter_user_id": invite.inviter_user_id,
        "invitee_email": invite.invitee_email,
        "referral_code": invite.referral_code,
        "from": from,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{InviteStatus, RewardCatalog, RewardId};

    struct Fixture {
        moderation: ModerationService,
        loyalty: Arc<LoyaltyStore>,
        referrals: Arc<ReferralStore>,
    }

    fn user() -> UserId {
        UserId::new("user_1")
    }

    async fn fixture() -> Fixture {
        let loyalty = Arc::new(LoyaltyStore::new(RewardCatalog::standard()));
        let referrals = Arc::new(ReferralStore::new());
        loyalty
            .write(|s| {
                let _ = s.register(user(), "s@trendies.com".into(), "Stephen".into());
                let _ = s.add_points(&user(), 10_000, "seed".into(), None);
            })
            .await;
        let moderation = ModerationService::new(
            Arc::clone(&loyalty),
            Arc::clone(&referrals),
            Arc::new(AdminStore::new()),
            EventBus::new(64),
        );
        Fixture {
            moderation,
            loyalty,
            referrals,
        }
    }

    async fn redeem(f: &Fixture, reward: &str) -> ClaimId {
        let Ok(r) = f
            .loyalty
            .write(|s| s.redeem(&user(), &RewardId::new(reward)))
            .await
        else {
            panic!("redeem failed");
        };
        r.claim.id
    }

    #[tokio::test]
    async fn approve_appends_audit_with_snapshot() {
        let f = fixture().await;
        let claim_id = redeem(&f, "reward_1").await;

        let Ok(decision) = f
            .moderation
            .set_claim_status(claim_id, ClaimStatus::Approved, "admin_1", Some("ok".into()))
            .await
        else {
            panic!("approve failed");
        };
        assert_eq!(decision.claim.status, ClaimStatus::Approved);
        assert_eq!(decision.action.kind, AdminActionType::ApproveReward);
        assert_eq!(decision.action.target_id, claim_id.to_string());
        assert_eq!(decision.action.reason, "ok");
        assert_eq!(decision.action.performed_by, "admin_1");
        let Some(meta) = decision.action.metadata else {
            panic!("metadata missing");
        };
        assert_eq!(meta["reward_name"], "€5 Voucher");
        assert_eq!(meta["points_cost"], 250);
        assert_eq!(meta["user_id"], "user_1");
    }

    #[tokio::test]
    async fn invalid_transition_appends_nothing() {
        let f = fixture().await;
        let claim_id = redeem(&f, "reward_1").await;
        let result = f
            .moderation
            .set_claim_status(claim_id, ClaimStatus::Delivered, "admin_1", None)
            .await;
        assert!(matches!(result, Err(RewardsError::InvalidTransition { .. })));
        assert!(f.moderation.actions().await.is_empty());
    }

    #[tokio::test]
    async fn reject_and_deliver_map_to_actions() {
        let f = fixture().await;
        let a = redeem(&f, "reward_1").await;
        let b = redeem(&f, "reward_2").await;
        let _ = f
            .moderation
            .set_claim_status(a, ClaimStatus::Cancelled, "admin", None)
            .await;
        let _ = f
            .moderation
            .set_claim_status(b, ClaimStatus::Approved, "admin", None)
            .await;
        let _ = f
            .moderation
            .set_claim_status(b, ClaimStatus::Delivered, "admin", None)
            .await;
        let kinds: Vec<AdminActionType> =
            f.moderation.actions().await.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [
                AdminActionType::RejectReward,
                AdminActionType::ApproveReward,
                AdminActionType::DeliverReward
            ]
        );
    }

    #[tokio::test]
    async fn bulk_approve_only_touches_filtered_pending() {
        let f = fixture().await;
        let voucher = redeem(&f, "reward_1").await;
        let _ = redeem(&f, "reward_2").await;
        let already = redeem(&f, "reward_3").await;
        let _ = f
            .moderation
            .set_claim_status(already, ClaimStatus::Cancelled, "admin", None)
            .await;

        let filter = ClaimFilter {
            search: Some("voucher".into()),
            ..ClaimFilter::default()
        };
        let decisions = f.moderation.bulk_approve(&filter, "admin").await;
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions.first().map(|d| d.claim.id), Some(voucher));
        assert_eq!(
            decisions.first().map(|d| d.action.reason.clone()),
            Some(BULK_APPROVE_NOTES.to_string())
        );

        let all = f.moderation.bulk_approve(&ClaimFilter::default(), "admin").await;
        assert_eq!(all.len(), 1);
        let pending = f
            .moderation
            .claims(&ClaimFilter {
                status: Some(ClaimStatus::Pending),
                ..ClaimFilter::default()
            })
            .await;
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn block_toggle_is_audited_once_per_change() {
        let f = fixture().await;
        let invite_id = f
            .referrals
            .write(|s| {
                let _ = s.generate_code(&user(), "s@trendies.com", "Stephen", Utc::now());
                s.send_invite(&user(), "friend@example.com", Utc::now())
                    .map(|i| i.id)
            })
            .await;
        let Ok(invite_id) = invite_id else {
            panic!("invite failed");
        };

        let empty = f.moderation.block_invite(invite_id, " ", "admin").await;
        assert!(matches!(empty, Err(RewardsError::MissingField("reason"))));

        let Ok(blocked) = f.moderation.block_invite(invite_id, "spam", "admin").await else {
            panic!("block failed");
        };
        assert_eq!(blocked.invite.status, InviteStatus::Blocked);
        assert!(blocked.action.is_some());

        let Ok(again) = f.moderation.block_invite(invite_id, "spam", "admin").await else {
            panic!("reblock failed");
        };
        assert!(again.action.is_none());

        let Ok(unblocked) = f.moderation.unblock_invite(invite_id, "admin").await else {
            panic!("unblock failed");
        };
        assert_eq!(unblocked.invite.status, InviteStatus::Pending);

        let kinds: Vec<AdminActionType> =
            f.moderation.actions().await.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [AdminActionType::BlockReferral, AdminActionType::UnblockReferral]
        );
    }

    #[tokio::test]
    async fn ban_twice_conflicts_and_unban_requires_ban() {
        let f = fixture().await;
        let Ok(_) = f
            .moderation
            .ban_user(&user(), "s@trendies.com", "fraud", "admin")
            .await
        else {
            panic!("ban failed");
        };
        let again = f
            .moderation
            .ban_user(&user(), "s@trendies.com", "fraud", "admin")
            .await;
        assert!(matches!(again, Err(RewardsError::AlreadyExists(_))));
        assert_eq!(f.moderation.banned_users().await.len(), 1);

        let Ok(_) = f.moderation.unban_user(&user(), "admin").await else {
            panic!("unban failed");
        };
        let missing = f.moderation.unban_user(&user(), "admin").await;
        assert!(matches!(missing, Err(RewardsError::UserNotFound(_))));
    }
}
