use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{RepositoryError, TaskQuery, TaskRepository, TaskStats};
use crate::domain::{Task, TaskId, TaskStatus, UserId};

/// Process-local task store for single-node runs and tests.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "task {} already exists",
                task.id
            )));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn get_for_user(
        &self,
        id: TaskId,
        user_id: UserId,
    ) -> Result<Option<Task>, RepositoryError> {
        Ok(self
            .tasks
            .read()
            .await
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        query: &TaskQuery,
    ) -> Result<(Vec<Task>, u64), RepositoryError> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<&Task> = tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn update_if_active(&self, task: &Task) -> Result<bool, RepositoryError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(stored) if stored.status.is_active() => {
                *stored = task.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_quota_cost(&self, id: TaskId, quota_cost: i64) -> Result<(), RepositoryError> {
        match self.tasks.write().await.get_mut(&id) {
            Some(stored) => {
                stored.quota_cost = quota_cost;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: TaskId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut tasks = self.tasks.write().await;
        if tasks.get(&id).is_some_and(|t| t.user_id == user_id) {
            tasks.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn stats_for_user(&self, user_id: UserId) -> Result<TaskStats, RepositoryError> {
        let tasks = self.tasks.read().await;
        let mut stats = TaskStats::default();
        for task in tasks.values().filter(|t| t.user_id == user_id) {
            stats.total_tasks += 1;
            match task.status {
                TaskStatus::Completed => stats.completed_tasks += 1,
                TaskStatus::Failed => stats.failed_tasks += 1,
                TaskStatus::Processing => stats.processing_tasks += 1,
                _ => {}
            }
            stats.total_duration += u64::from(task.duration.unwrap_or(0));
            stats.total_file_size += task.file_size;
            stats.total_quota_cost += task.quota_cost;
        }
        Ok(stats)
    }
}
