use async_trait::async_trait;

use crate::domain::{Task, TaskId, TaskStatus, UserId};

use super::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub page: u32,
    pub page_size: u32,
}

impl TaskQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Out-of-range values fall back to the first page of the default size.
    pub fn new(status: Option<TaskStatus>, page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let page_size = page_size
            .filter(|s| (1..=Self::MAX_PAGE_SIZE).contains(s))
            .unwrap_or(Self::DEFAULT_PAGE_SIZE);
        Self {
            status,
            page,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStats {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub processing_tasks: u64,
    pub total_duration: u64,
    pub total_file_size: u64,
    pub total_quota_cost: i64,
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    async fn get_for_user(&self, id: TaskId, user_id: UserId)
    -> Result<Option<Task>, RepositoryError>;

    /// Newest first, with the total count of matching tasks.
    async fn list_for_user(
        &self,
        user_id: UserId,
        query: &TaskQuery,
    ) -> Result<(Vec<Task>, u64), RepositoryError>;

    /// Persists `task` only while the stored copy is still active.
    ///
    /// Returns `false` when the stored task already reached a terminal state,
    /// so a late writer can never overwrite a cancelled or finished task.
    async fn update_if_active(&self, task: &Task) -> Result<bool, RepositoryError>;

    /// Overwrites the recorded charge in any state. Used once a terminal task
    /// is known to still hold quota that could not be returned.
    async fn set_quota_cost(&self, id: TaskId, quota_cost: i64) -> Result<(), RepositoryError>;

    async fn delete(&self, id: TaskId, user_id: UserId) -> Result<bool, RepositoryError>;

    async fn stats_for_user(&self, user_id: UserId) -> Result<TaskStats, RepositoryError>;
}
