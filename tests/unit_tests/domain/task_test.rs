use scribeflow::domain::{
    ChannelId, StoragePath, Task, TaskStateError, TaskStatus, TranscriptionOptions, UserId,
};

use crate::helpers::sample_result;

fn new_task() -> Task {
    Task::new(
        UserId::new(1),
        None,
        ChannelId::new(),
        "talk.mp3".to_string(),
        2048,
        "mp3".to_string(),
        None,
        TranscriptionOptions::default(),
        120,
    )
}

fn processing_task() -> Task {
    let mut task = new_task();
    task.transition(TaskStatus::Uploading, 10).unwrap();
    task.transition(TaskStatus::Processing, 20).unwrap();
    task
}

#[test]
fn given_new_task_when_created_then_pending_with_zero_progress() {
    let task = new_task();

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.progress, 0);
    assert_eq!(task.quota_cost, 120);
    assert!(task.started_at.is_none());
}

#[test]
fn given_pending_task_when_skipping_upload_then_transition_is_rejected() {
    let mut task = new_task();

    let result = task.transition(TaskStatus::Processing, 20);

    assert_eq!(
        result,
        Err(TaskStateError::InvalidTransition {
            from: TaskStatus::Pending,
            to: TaskStatus::Processing,
        })
    );
    assert_eq!(task.status, TaskStatus::Pending);
}

#[test]
fn given_processing_task_when_entering_processing_then_started_at_set_once() {
    let mut task = processing_task();
    let started = task.started_at;

    task.transition(TaskStatus::Processing, 50).unwrap();

    assert!(started.is_some());
    assert_eq!(task.started_at, started);
    assert_eq!(task.progress, 50);
}

#[test]
fn given_progress_when_lower_value_arrives_then_progress_never_decreases() {
    let mut task = processing_task();
    task.advance_progress(70);

    task.advance_progress(30);

    assert_eq!(task.progress, 70);
}

#[test]
fn given_processing_task_when_recording_result_then_completed_with_metadata() {
    let mut task = processing_task();

    task.record_result(&sample_result()).unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
    assert_eq!(task.result_text.as_deref(), Some("Bonjour tout le monde. Merci."));
    assert_eq!(task.detected_language.as_deref(), Some("fr"));
    assert_eq!(task.duration, Some(43));
    assert_eq!(task.billing_duration, Some(43));
    assert!(task.completed_at.is_some());
}

#[test]
fn given_out_of_range_confidence_when_recording_result_then_clamped() {
    let mut task = processing_task();
    let mut result = sample_result();
    result.confidence_score = 1.7;

    task.record_result(&result).unwrap();

    assert_eq!(task.confidence_score, Some(1.0));
}

#[test]
fn given_completed_task_when_cancelling_then_already_finished_and_unchanged() {
    let mut task = processing_task();
    task.record_result(&sample_result()).unwrap();

    let result = task.mark_cancelled("too late");

    assert_eq!(
        result,
        Err(TaskStateError::AlreadyFinished(TaskStatus::Completed))
    );
    assert_eq!(task.status, TaskStatus::Completed);
}

#[test]
fn given_failed_task_when_failing_again_then_first_error_is_kept() {
    let mut task = processing_task();
    task.mark_failed("API_ERROR", "boom").unwrap();

    let again = task.mark_failed("TIMEOUT", "later");

    assert!(again.is_err());
    assert_eq!(task.error_code.as_deref(), Some("API_ERROR"));
}

#[test]
fn given_completion_recorded_in_memory_when_delivery_fails_then_failed_without_result() {
    let mut task = processing_task();
    task.record_result(&sample_result()).unwrap();

    task.fail_undelivered("STORAGE_ERROR", "disk full").unwrap();

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error_code.as_deref(), Some("STORAGE_ERROR"));
    assert!(task.result_text.is_none());
    assert!(task.confidence_score.is_none());
    assert!(task.detected_language.is_none());
    assert!(task.billing_duration.is_none());
    assert!(task.result_file_path.is_none());
    assert!(task.completed_at.is_some());
}

#[test]
fn given_cancelled_task_when_delivery_fails_then_cancellation_is_kept() {
    let mut task = processing_task();
    task.mark_cancelled("stop").unwrap();

    let result = task.fail_undelivered("STORAGE_ERROR", "disk full");

    assert_eq!(
        result,
        Err(TaskStateError::AlreadyFinished(TaskStatus::Cancelled))
    );
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.error_code.is_none());
}

#[test]
fn given_processing_task_when_attaching_rendering_then_rejected_until_completed() {
    let mut task = processing_task();
    let path = StoragePath::result(&task.id, task.options.output_format);

    let early = task.attach_rendering(path.clone(), 100);
    task.record_result(&sample_result()).unwrap();
    task.attach_rendering(path.clone(), 100).unwrap();

    assert_eq!(early, Err(TaskStateError::NotCompleted(TaskStatus::Processing)));
    assert_eq!(task.result_file_path, Some(path));
    assert_eq!(task.quota_cost, 100);
}

#[test]
fn given_status_strings_when_parsing_then_all_variants_round_trip() {
    for status in TaskStatus::ALL {
        assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
    }
    assert!("paused".parse::<TaskStatus>().is_err());
}

#[test]
fn given_terminal_statuses_when_checking_then_not_cancellable() {
    assert!(TaskStatus::Processing.is_cancellable());
    assert!(!TaskStatus::Completed.is_cancellable());
    assert!(!TaskStatus::Failed.is_cancellable());
    assert!(!TaskStatus::Cancelled.is_cancellable());
}
