use async_trait::async_trait;

use crate::application::ports::TaskNotifier;
use crate::domain::Task;

/// Emits task outcomes as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTaskNotifier;

#[async_trait]
impl TaskNotifier for TracingTaskNotifier {
    async fn task_completed(&self, task: &Task) {
        tracing::info!(
            task_id = %task.id,
            user_id = %task.user_id,
            file = %task.original_filename,
            quota_cost = task.quota_cost,
            billing_duration = task.billing_duration,
            "Transcription task completed"
        );
    }

    async fn task_failed(&self, task: &Task) {
        tracing::warn!(
            task_id = %task.id,
            user_id = %task.user_id,
            file = %task.original_filename,
            error_code = task.error_code.as_deref().unwrap_or_default(),
            error = task.error_message.as_deref().unwrap_or_default(),
            "Transcription task failed"
        );
    }
}
