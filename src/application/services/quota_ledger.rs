use std::sync::Arc;

use dashmap::DashMap;

use crate::application::ports::{QuotaError, QuotaStore};
use crate::domain::{TaskId, UserId};

pub const DEFAULT_RATE_PER_MINUTE: i64 = 100;
pub const BYTES_PER_ESTIMATED_SECOND: u64 = 1024 * 1024;
pub const MIN_ESTIMATED_SECONDS: u64 = 60;
const PRIVILEGED_LANGUAGES: [&str; 2] = ["zh", "en"];

/// Cost estimation plus per-task debit bookkeeping.
///
/// Each task carries at most one outstanding charge. Pre-deducting twice for
/// the same task is a no-op, and a refund or settlement consumes the charge so
/// it can never be returned twice.
pub struct QuotaLedger {
    store: Arc<dyn QuotaStore>,
    rate_per_minute: i64,
    charges: DashMap<TaskId, Charge>,
}

#[derive(Debug, Clone, Copy)]
struct Charge {
    user_id: UserId,
    amount: i64,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn QuotaStore>, rate_per_minute: i64) -> Self {
        Self {
            store,
            rate_per_minute,
            charges: DashMap::new(),
        }
    }

    pub fn rate_per_minute(&self) -> i64 {
        self.rate_per_minute
    }

    /// Without a known duration, every MiB counts as one second of audio with
    /// a one minute floor. Languages other than `zh`/`en` cost 20% more,
    /// rounded up.
    pub fn estimate_cost(&self, file_size: u64, duration: Option<u32>, language: &str) -> i64 {
        let seconds = match duration {
            Some(d) => u64::from(d),
            None => (file_size / BYTES_PER_ESTIMATED_SECOND).max(MIN_ESTIMATED_SECONDS),
        };
        self.cost_for_seconds(seconds, language)
    }

    pub fn cost_for_seconds(&self, seconds: u64, language: &str) -> i64 {
        let minutes = seconds.div_ceil(60) as i64;
        let cost = minutes * self.rate_per_minute;
        if PRIVILEGED_LANGUAGES.contains(&language) {
            cost
        } else {
            (cost * 6 + 4) / 5
        }
    }

    pub async fn ensure_affordable(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        let available = self.store.balance(user_id).await?;
        if available < amount {
            return Err(QuotaError::Insufficient {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    pub async fn pre_deduct(
        &self,
        task_id: TaskId,
        user_id: UserId,
        amount: i64,
    ) -> Result<(), QuotaError> {
        if amount <= 0 || self.charges.contains_key(&task_id) {
            return Ok(());
        }
        self.store.decrease(user_id, amount).await?;
        self.charges.insert(task_id, Charge { user_id, amount });
        tracing::info!(task_id = %task_id, user_id = %user_id, amount, "Quota pre-deducted");
        Ok(())
    }

    /// Returns the whole outstanding charge of the task, if any.
    pub async fn refund(&self, task_id: TaskId, reason: &str) -> Result<i64, QuotaError> {
        let Some((_, charge)) = self.charges.remove(&task_id) else {
            return Ok(0);
        };
        if let Err(e) = self.store.increase(charge.user_id, charge.amount).await {
            // Keep the charge so a later attempt can still return it.
            self.charges.insert(task_id, charge);
            return Err(e);
        }
        tracing::info!(
            task_id = %task_id,
            user_id = %charge.user_id,
            amount = charge.amount,
            reason,
            "Quota refunded"
        );
        Ok(charge.amount)
    }

    /// Lowers the outstanding charge to `actual`, refunding the difference.
    /// Never charges beyond the pre-deducted amount. Returns the billed amount.
    ///
    /// The charge stays outstanding until [`commit`](Self::commit), so a task
    /// that loses a race with a cancellation can still be refunded in full.
    /// If the difference cannot be credited back the full pre-deducted amount
    /// stays billed.
    pub async fn settle(&self, task_id: TaskId, actual: i64) -> i64 {
        let Some((_, mut charge)) = self.charges.remove(&task_id) else {
            return 0;
        };
        let billed = actual.clamp(0, charge.amount);
        let over_charge = charge.amount - billed;
        if over_charge > 0 {
            if let Err(e) = self.store.increase(charge.user_id, over_charge).await {
                tracing::warn!(
                    task_id = %task_id,
                    user_id = %charge.user_id,
                    error = %e,
                    "Settlement refund failed, keeping full charge"
                );
                self.charges.insert(task_id, charge);
                return charge.amount;
            }
            charge.amount = billed;
        }
        self.charges.insert(task_id, charge);
        tracing::info!(task_id = %task_id, user_id = %charge.user_id, billed, "Quota settled");
        billed
    }

    /// Makes the outstanding charge final.
    pub fn commit(&self, task_id: TaskId) -> Option<i64> {
        self.charges.remove(&task_id).map(|(_, c)| c.amount)
    }

    pub fn outstanding(&self, task_id: TaskId) -> Option<i64> {
        self.charges.get(&task_id).map(|c| c.amount)
    }
}
