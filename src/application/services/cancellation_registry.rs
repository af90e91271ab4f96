use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::domain::TaskId;

/// One cancellation token per task handed to the worker pool.
#[derive(Default)]
pub struct CancellationRegistry {
    tokens: DashMap<TaskId, CancellationToken>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, task_id: TaskId) -> CancellationToken {
        self.tokens.entry(task_id).or_default().clone()
    }

    /// Returns `false` when no worker holds a token for the task.
    pub fn cancel(&self, task_id: TaskId) -> bool {
        match self.tokens.get(&task_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, task_id: TaskId) {
        self.tokens.remove(&task_id);
    }

    pub fn is_tracked(&self, task_id: TaskId) -> bool {
        self.tokens.contains_key(&task_id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
