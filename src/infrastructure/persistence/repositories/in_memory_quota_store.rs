use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::application::ports::{QuotaError, QuotaStore};
use crate::domain::UserId;

/// Balances adjusted under the map's per-entry lock.
#[derive(Default)]
pub struct InMemoryQuotaStore {
    balances: DashMap<UserId, i64>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, user_id: UserId, quota: i64) {
        self.balances.insert(user_id, quota);
    }
}

#[async_trait]
impl QuotaStore for InMemoryQuotaStore {
    async fn balance(&self, user_id: UserId) -> Result<i64, QuotaError> {
        self.balances
            .get(&user_id)
            .map(|b| *b)
            .ok_or(QuotaError::UnknownUser(user_id))
    }

    async fn decrease(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        match self.balances.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let available = *entry.get();
                if available < amount {
                    return Err(QuotaError::Insufficient {
                        required: amount,
                        available,
                    });
                }
                *entry.get_mut() -= amount;
                Ok(())
            }
            Entry::Vacant(_) => Err(QuotaError::UnknownUser(user_id)),
        }
    }

    async fn increase(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        match self.balances.get_mut(&user_id) {
            Some(mut balance) => {
                *balance += amount;
                Ok(())
            }
            None => Err(QuotaError::UnknownUser(user_id)),
        }
    }
}
