use async_trait::async_trait;

use crate::domain::Task;

/// Delivery of task outcome events (mail, webhook, ...) lives behind this port.
#[async_trait]
pub trait TaskNotifier: Send + Sync {
    async fn task_completed(&self, task: &Task);

    async fn task_failed(&self, task: &Task);
}
