//! Admin audit log and user bans.
//!
//! Every moderation decision appends an [`AdminAction`]. Entries are never
//! mutated or deleted; the only way to undo a decision is to append its
//! inverse (`unblock_referral`, `unban_user`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard};
use utoipa::ToSchema;

use super::{ActionId, UserId};

/// Kind of moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionType {
    /// An invite was blocked.
    BlockReferral,
    /// An invite block was lifted.
    UnblockReferral,
    /// A user was banned.
    BanUser,
    /// A user ban was lifted.
    UnbanUser,
    /// A claim was approved.
    ApproveReward,
    /// A claim was cancelled.
    RejectReward,
    /// A claim was delivered.
    DeliverReward,
}

impl AdminActionType {
    /// Snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlockReferral => "block_referral",
            Self::UnblockReferral => "unblock_referral",
            Self::BanUser => "ban_user",
            Self::UnbanUser => "unban_user",
            Self::ApproveReward => "approve_reward",
            Self::RejectReward => "reject_reward",
            Self::DeliverReward => "deliver_reward",
        }
    }
}

/// One immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminAction {
    /// Entry identifier.
    pub id: ActionId,
    /// What was decided.
    #[serde(rename = "type")]
    pub kind: AdminActionType,
    /// Claim, invite or user the decision applies to.
    pub target_id: String,
    /// Free-text reason or admin notes.
    pub reason: String,
    /// Acting admin.
    pub performed_by: String,
    /// Decision timestamp.
    pub performed_at: DateTime<Utc>,
    /// Snapshot of the target at decision time.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// A user currently barred from redeeming and inviting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BannedUser {
    /// Banned user.
    pub user_id: UserId,
    /// Contact address at ban time.
    pub email: String,
    /// Reason given.
    pub reason: String,
    /// Acting admin.
    pub banned_by: String,
    /// Ban timestamp.
    pub banned_at: DateTime<Utc>,
}

/// Audit log and ban list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminState {
    actions: Vec<AdminAction>,
    banned: HashMap<UserId, BannedUser>,
}

impl AdminState {
    /// Appends an entry stamped with a new id and the current time.
    pub fn record(
        &mut self,
        kind: AdminActionType,
        target_id: impl Into<String>,
        reason: impl Into<String>,
        performed_by: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> AdminAction {
        let action = AdminAction {
            id: ActionId::new(),
            kind,
            target_id: target_id.into(),
            reason: reason.into(),
            performed_by: performed_by.into(),
            performed_at: Utc::now(),
            metadata,
        };
        self.actions.push(action.clone());
        action
    }

    /// Bans a user. Returns `None` if they were already banned.
    pub fn ban(
        &mut self,
        user_id: &UserId,
        email: &str,
        reason: &str,
        admin: &str,
    ) -> Option<AdminAction> {
        if self.banned.contains_key(user_id) {
            return None;
        }
        let entry = BannedUser {
            user_id: user_id.clone(),
            email: email.to_string(),
            reason: reason.to_string(),
            banned_by: admin.to_string(),
            banned_at: Utc::now(),
        };
        self.banned.insert(user_id.clone(), entry);
        Some(self.record(
            AdminActionType::BanUser,
            user_id.as_str(),
            reason,
            admin,
            Some(serde_json::json!({ "email": email })),
        ))
    }

    /// Lifts a ban. Returns `None` if the user was not banned.
    pub fn unban(&mut self, user_id: &UserId, admin: &str) -> Option<AdminAction> {
        let entry = self.banned.remove(user_id)?;
        Some(self.record(
            AdminActionType::UnbanUser,
            user_id.as_str(),
            format!("Ban lifted ({})", entry.reason),
            admin,
            Some(serde_json::json!({ "email": entry.email })),
        ))
    }

    /// Returns `true` while a ban is in force.
    #[must_use]
    pub fn is_banned(&self, user_id: &UserId) -> bool {
        self.banned.contains_key(user_id)
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn actions(&self) -> &[AdminAction] {
        &self.actions
    }

    /// Current bans ordered by user id.
    #[must_use]
    pub fn banned(&self) -> Vec<BannedUser> {
        let mut users: Vec<BannedUser> = self.banned.values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users
    }
}

/// Concurrent handle to the audit log.
#[derive(Debug, Default)]
pub struct AdminStore {
    state: RwLock<AdminState>,
}

impl AdminStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&AdminState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` under the write lock.
    pub async fn write<R>(&self, f: impl FnOnce(&mut AdminState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Holds the read lock until the guard is dropped.
    ///
    /// A ban needs the write lock, so it cannot land while a caller keeps
    /// this guard across its own ban-gated write.
    pub async fn read_guard(&self) -> RwLockReadGuard<'_, AdminState> {
        self.state.read().await
    }

    /// Shortcut for [`AdminState::is_banned`].
    pub async fn is_banned(&self, user_id: &UserId) -> bool {
        self.state.read().await.is_banned(user_id)
    }

    /// Clones the whole state for persistence.
    pub async fn snapshot(&self) -> AdminState {
        self.state.read().await.clone()
    }

    /// Replaces the whole state with a restored snapshot.
    pub async fn restore(&self, state: AdminState) {
        *self.state.write().await = state;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut state = AdminState::default();
        let first = state.record(AdminActionType::ApproveReward, "c1", "ok", "admin", None);
        let second = state.record(AdminActionType::RejectReward, "c2", "no", "admin", None);
        let ids: Vec<ActionId> = state.actions().iter().map(|a| a.id).collect();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[test]
    fn ban_and_unban_are_audited_once() {
        let mut state = AdminState::default();
        let user = UserId::new("user_9");

        assert!(state.ban(&user, "x@y.com", "fraud", "admin").is_some());
        assert!(state.is_banned(&user));
        assert!(state.ban(&user, "x@y.com", "fraud", "admin").is_none());
        assert_eq!(state.banned().len(), 1);

        let Some(lifted) = state.unban(&user, "admin") else {
            panic!("unban should record an action");
        };
        assert_eq!(lifted.kind, AdminActionType::UnbanUser);
        assert!(!state.is_banned(&user));
        assert!(state.unban(&user, "admin").is_none());

        let kinds: Vec<AdminActionType> = state.actions().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, [AdminActionType::BanUser, AdminActionType::UnbanUser]);
    }

    #[tokio::test]
    async fn ban_waits_for_read_guard() {
        let store = AdminStore::new();
        let user = UserId::new("user_9");

        let guard = store.read_guard().await;
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            store.write(|s| s.ban(&user, "x@y.com", "fraud", "admin")),
        )
        .await;
        assert!(blocked.is_err());
        assert!(!guard.is_banned(&user));
        drop(guard);

        assert!(store.write(|s| s.ban(&user, "x@y.com", "fraud", "admin")).await.is_some());
        assert!(store.is_banned(&user).await);
    }

    #[test]
    fn action_serializes_type_field() {
        let mut state = AdminState::default();
        let action = state.record(AdminActionType::BlockReferral, "i1", "spam", "admin", None);
        let Ok(json) = serde_json::to_value(&action) else {
            panic!("encode failed");
        };
        assert_eq!(json["type"], "block_referral");
        assert_eq!(json["target_id"], "i1");
    }
}
