//! Append-only points ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TransactionId, UserId};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Points credited by a qualifying action (referral conversion, sale).
    Earned,
    /// Points spent on a reward.
    Redeemed,
    /// Discretionary credit granted by an admin.
    Bonus,
    /// Discretionary debit applied by an admin.
    Penalty,
}

impl TransactionType {
    /// Type of an ordinary posting, derived from the sign of its delta.
    #[must_use]
    pub const fn from_delta(delta: i64) -> Self {
        if delta > 0 { Self::Earned } else { Self::Redeemed }
    }

    /// Type of an admin adjustment, derived from the sign of its delta.
    #[must_use]
    pub const fn adjustment(delta: i64) -> Self {
        if delta > 0 { Self::Bonus } else { Self::Penalty }
    }
}

/// Immutable ledger entry.
///
/// `points` carries the requested delta (positive credit, negative debit),
/// even when the resulting balance was clamped at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PointsTransaction {
    /// Entry identifier.
    pub id: TransactionId,
    /// Account the entry was posted to.
    pub user_id: UserId,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Signed points delta.
    pub points: i64,
    /// Human-readable description.
    pub description: String,
    /// Weak reference to the reward, invite or sale that caused the entry.
    pub reference_id: Option<String>,
    /// Posting timestamp.
    pub created_at: DateTime<Utc>,
}

/// Ordered sequence of every [`PointsTransaction`] across all accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<PointsTransaction>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Entries are never edited or removed afterwards.
    pub fn append(&mut self, entry: PointsTransaction) {
        self.entries.push(entry);
    }

    /// All entries in posting order.
    #[must_use]
    pub fn entries(&self) -> &[PointsTransaction] {
        &self.entries
    }

    /// Entries for one account, newest first.
    #[must_use]
    pub fn for_user(&self, user_id: &UserId) -> Vec<PointsTransaction> {
        self.entries
            .iter()
            .rev()
            .filter(|tx| &tx.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Sum of all `earned` entries across accounts.
    #[must_use]
    pub fn total_earned(&self) -> i64 {
        self.entries
            .iter()
            .filter(|tx| tx.kind == TransactionType::Earned)
            .map(|tx| tx.points)
            .sum()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been posted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replays a delta sequence from an empty account.
///
/// Returns `(total_points, lifetime_points)`: the running sum clamped at zero
/// after every step, and the sum of positive deltas.
#[must_use]
pub fn replay(deltas: &[i64]) -> (i64, i64) {
    deltas.iter().fold((0_i64, 0_i64), |(total, lifetime), &delta| {
        let total = total.saturating_add(delta).max(0);
        let lifetime = if delta > 0 {
            lifetime.saturating_add(delta)
        } else {
            lifetime
        };
        (total, lifetime)
    })
}
