use std::time::Duration;

use bytes::Bytes;

use scribeflow::application::ports::{AdapterError, MediaStore, StoredFileRepository, TaskQuery};
use scribeflow::application::services::{CreateTaskRequest, PreviewKind, ResultPreview, TaskError};
use scribeflow::domain::{
    FileKind, OutputFormat, StoragePath, TaskId, TaskStatus, TranscriptionResult, UserId,
};

use crate::helpers::{
    FakeAdapter, FakeBehavior, StorageFaults, TEST_BALANCE, TestHarness, byte_stream,
    sample_result,
};

const MIB: u64 = 1024 * 1024;

fn french(mut request: CreateTaskRequest) -> CreateTaskRequest {
    request.options.language = "fr".to_string();
    request
}

fn harness_with_faults(faults: StorageFaults) -> TestHarness {
    TestHarness::with_faults(
        FakeAdapter::new(FakeBehavior::Complete(sample_result())),
        8,
        faults,
    )
}

async fn assert_no_renderings(harness: &TestHarness, task_id: TaskId) {
    for format in OutputFormat::ALL {
        let path = StoragePath::result(&task_id, format);
        assert!(harness.media.get(&path).await.is_err(), "{path} left behind");
    }
    let files = harness.files.list_by_task(task_id).await.unwrap();
    assert!(files.iter().all(|f| f.kind == FileKind::Original));
}

async fn wait_for_balance_below(harness: &TestHarness, limit: i64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while harness.balance().await >= limit {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("quota was never pre-deducted");
}

fn code_of(result: Result<impl std::fmt::Debug, TaskError>) -> &'static str {
    result.unwrap_err().code()
}

#[tokio::test]
async fn given_unsupported_extension_when_creating_then_file_not_supported() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let result = harness.orchestrator.create(harness.request("notes.txt", 1024)).await;

    assert_eq!(code_of(result), "FILE_NOT_SUPPORTED");
}

#[tokio::test]
async fn given_empty_file_when_creating_then_invalid_request() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let result = harness.orchestrator.create(harness.request("talk.mp3", 0)).await;

    assert_eq!(code_of(result), "INVALID_REQUEST");
}

#[tokio::test]
async fn given_oversized_file_when_creating_then_file_too_large() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let result = harness
        .orchestrator
        .create(harness.request("talk.mp3", 101 * MIB))
        .await;

    assert_eq!(code_of(result), "FILE_TOO_LARGE");
}

#[tokio::test]
async fn given_unknown_language_when_creating_then_unsupported_language() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let mut request = harness.request("talk.mp3", 1024);
    request.options.language = "xx".to_string();

    let result = harness.orchestrator.create(request).await;

    assert_eq!(code_of(result), "UNSUPPORTED_LANGUAGE");
}

#[tokio::test]
async fn given_out_of_range_priority_when_creating_then_invalid_request() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let mut request = harness.request("talk.mp3", 1024);
    request.options.priority = 9;

    let result = harness.orchestrator.create(request).await;

    assert_eq!(code_of(result), "INVALID_REQUEST");
}

#[tokio::test]
async fn given_zero_or_excessive_duration_when_creating_then_duration_too_long() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let mut zero = harness.request("talk.mp3", 1024);
    zero.duration = Some(0);
    let mut long = harness.request("talk.mp3", 1024);
    long.duration = Some(3601);

    assert_eq!(code_of(harness.orchestrator.create(zero).await), "DURATION_TOO_LONG");
    assert_eq!(code_of(harness.orchestrator.create(long).await), "DURATION_TOO_LONG");
}

#[tokio::test]
async fn given_low_balance_when_creating_then_insufficient_quota_and_nothing_stored() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    harness.quotas.set_balance(harness.user_id, 50);

    let result = harness.orchestrator.create(harness.request("talk.mp3", 1024)).await;

    assert_eq!(code_of(result), "INSUFFICIENT_QUOTA");
    let (tasks, total) = harness
        .orchestrator
        .list(harness.user_id, &TaskQuery::default())
        .await
        .unwrap();
    assert!(tasks.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn given_format_no_channel_accepts_when_creating_then_engine_unavailable() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let result = harness.orchestrator.create(harness.request("talk.flac", 1024)).await;

    assert_eq!(code_of(result), "ENGINE_UNAVAILABLE");
}

#[tokio::test]
async fn given_valid_request_when_creating_then_pending_with_estimated_cost() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));

    let task = harness
        .orchestrator
        .create(french(harness.request("talk.mp3", 10 * MIB)))
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.quota_cost, 120);
    assert_eq!(task.file_type, "mp3");
    assert_eq!(harness.balance().await, TEST_BALANCE);
}

#[tokio::test]
async fn given_queued_task_when_executed_then_completed_billed_and_rendered() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, job) = harness
        .submit(french(harness.request("talk.mp3", 10 * MIB)))
        .await;
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.progress, 20);

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.result_text.as_deref(), Some("Bonjour tout le monde. Merci."));
    assert_eq!(stored.billing_duration, Some(43));
    assert_eq!(stored.quota_cost, 120);
    assert_eq!(
        stored.result_file_path,
        Some(StoragePath::result(&task.id, OutputFormat::Json))
    );
    assert!(stored.started_at.is_some());
    assert!(stored.completed_at.is_some());

    let files = harness.files.list_by_task(task.id).await.unwrap();
    assert_eq!(files.len(), 5);
    assert_eq!(files.iter().filter(|f| f.kind == FileKind::Original).count(), 1);
    assert_eq!(files.iter().filter(|f| f.kind == FileKind::Result).count(), 4);

    let srt = harness
        .orchestrator
        .download(task.id, harness.user_id, Some(OutputFormat::Srt))
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&srt.body).starts_with("1\n00:00:00,000 --> 00:00:02,500"));
    assert_eq!(srt.mime_type, "application/x-subrip");
    assert!(srt.file_name.ends_with("_result.srt"));

    assert_eq!(harness.balance().await, TEST_BALANCE - 120);
    assert_eq!(harness.notifier.completed(), vec![task.id]);
    assert_eq!(harness.orchestrator.ledger().outstanding(task.id), None);
    assert!(!harness.orchestrator.cancellations().is_tracked(task.id));
}

#[tokio::test]
async fn given_known_short_duration_when_executed_then_billed_by_actual_seconds() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let mut request = harness.request("talk.mp3", 1024);
    request.options.language = "en".to_string();
    request.duration = Some(150);
    let (task, job) = harness.submit(request).await;
    assert_eq!(task.quota_cost, 300);

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.quota_cost, 100);
    assert_eq!(harness.balance().await, TEST_BALANCE - 100);
}

#[tokio::test]
async fn given_adapter_failure_when_executed_then_failed_and_refunded() {
    let mut harness = TestHarness::new(FakeBehavior::Fail(AdapterError::Api(
        "upstream rejected".to_string(),
    )));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("API_ERROR"));
    assert_eq!(stored.quota_cost, 0);
    assert_eq!(harness.balance().await, TEST_BALANCE);
    assert_eq!(
        harness.notifier.failed(),
        vec![(task.id, Some("API_ERROR".to_string()))]
    );
}

#[tokio::test]
async fn given_empty_transcript_when_executed_then_failed_without_result_and_refunded() {
    let mut harness = TestHarness::new(FakeBehavior::Resolve(TranscriptionResult::new("")));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("TASK_NOT_FOUND"));
    assert!(stored.result_text.is_none());
    assert!(stored.result_file_path.is_none());
    assert!(stored.billing_duration.is_none());
    assert_eq!(stored.quota_cost, 0);
    assert_eq!(harness.balance().await, TEST_BALANCE);
    assert_eq!(
        harness.notifier.failed(),
        vec![(task.id, Some("TASK_NOT_FOUND".to_string()))]
    );
    assert!(harness.notifier.completed().is_empty());
    let download = harness
        .orchestrator
        .download(task.id, harness.user_id, None)
        .await;
    assert_eq!(code_of(download), "RESULT_NOT_READY");
}

#[tokio::test]
async fn given_rendering_write_fails_midway_when_executed_then_failed_and_partial_blobs_removed() {
    let mut harness = harness_with_faults(StorageFaults {
        result_puts_before_failure: Some(2),
        ..StorageFaults::default()
    });
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("STORAGE_ERROR"));
    assert!(stored.result_text.is_none());
    assert_eq!(stored.quota_cost, 0);
    assert_eq!(harness.balance().await, TEST_BALANCE);
    assert_eq!(harness.orchestrator.ledger().outstanding(task.id), None);
    assert_no_renderings(&harness, task.id).await;
    assert_eq!(harness.notifier.failed().len(), 1);
    assert!(harness.notifier.completed().is_empty());
}

#[tokio::test]
async fn given_result_record_fails_when_executed_then_failed_and_renderings_removed() {
    let mut harness = harness_with_faults(StorageFaults {
        result_records_before_failure: Some(1),
        ..StorageFaults::default()
    });
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("STORAGE_ERROR"));
    assert!(stored.result_file_path.is_none());
    assert_eq!(harness.balance().await, TEST_BALANCE);
    assert_no_renderings(&harness, task.id).await;
    assert_eq!(harness.files.list_by_task(task.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn given_polling_adapter_when_executed_then_completes_after_polls() {
    let mut harness = TestHarness::new(FakeBehavior::Poll {
        polls: 2,
        result: sample_result(),
    });
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    assert_eq!(harness.adapter.polls(), 2);
    assert_eq!(harness.stored(task.id).await.status, TaskStatus::Completed);
}

#[tokio::test]
async fn given_stalled_back_end_when_timeout_passes_then_failed_with_timeout() {
    let mut harness = TestHarness::new(FakeBehavior::Stall {
        timeout: Duration::from_millis(1),
    });
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    harness.orchestrator.execute(job).await;

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("TIMEOUT"));
    assert_eq!(harness.balance().await, TEST_BALANCE);
}

#[tokio::test]
async fn given_queued_task_when_cancelled_before_execution_then_worker_skips_it() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;

    let cancelled = harness
        .orchestrator
        .cancel(task.id, harness.user_id)
        .await
        .unwrap();
    harness.orchestrator.execute(job).await;

    assert_eq!(cancelled.status, TaskStatus::Cancelled);
    assert_eq!(harness.adapter.submits(), 0);
    assert_eq!(harness.stored(task.id).await.status, TaskStatus::Cancelled);
    assert_eq!(harness.balance().await, TEST_BALANCE);
}

#[tokio::test]
async fn given_running_task_when_cancelled_then_refunded_exactly_once() {
    let mut harness = TestHarness::new(FakeBehavior::Hang);
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    let orchestrator = harness.orchestrator.clone();
    let worker = tokio::spawn(async move { orchestrator.execute(job).await });
    wait_for_balance_below(&harness, TEST_BALANCE).await;

    harness
        .orchestrator
        .cancel(task.id, harness.user_id)
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop after cancellation")
        .unwrap();

    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Cancelled);
    assert_eq!(stored.quota_cost, 0);
    assert_eq!(harness.balance().await, TEST_BALANCE);
    assert_eq!(harness.adapter.submits(), 1);
    assert!(harness.notifier.completed().is_empty());
    assert!(harness.notifier.failed().is_empty());
}

#[tokio::test]
async fn given_refund_unavailable_when_cancelling_running_task_then_held_charge_is_recorded() {
    let mut harness = TestHarness::with_faults(
        FakeAdapter::new(FakeBehavior::Hang),
        8,
        StorageFaults {
            refuse_credits: true,
            ..StorageFaults::default()
        },
    );
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    let charge = task.quota_cost;
    let orchestrator = harness.orchestrator.clone();
    let worker = tokio::spawn(async move { orchestrator.execute(job).await });
    wait_for_balance_below(&harness, TEST_BALANCE).await;

    let cancelled = harness
        .orchestrator
        .cancel(task.id, harness.user_id)
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop after cancellation")
        .unwrap();

    assert_eq!(cancelled.status, TaskStatus::Cancelled);
    assert_eq!(cancelled.quota_cost, charge);
    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Cancelled);
    assert_eq!(stored.quota_cost, charge);
    assert_eq!(harness.balance().await, TEST_BALANCE - charge);
    assert_eq!(
        harness.orchestrator.ledger().outstanding(task.id),
        Some(charge)
    );
}

#[tokio::test]
async fn given_finished_task_when_cancelling_then_task_already_finished() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    harness.orchestrator.execute(job).await;
    let balance = harness.balance().await;

    let result = harness.orchestrator.cancel(task.id, harness.user_id).await;

    assert!(matches!(result, Err(TaskError::AlreadyFinished(TaskStatus::Completed))));
    assert_eq!(code_of(result), "TASK_ALREADY_FINISHED");
    assert_eq!(harness.balance().await, balance);
}

#[tokio::test]
async fn given_failed_task_when_cancelling_then_task_already_finished() {
    let mut harness = TestHarness::new(FakeBehavior::Fail(AdapterError::Network(
        "reset".to_string(),
    )));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    harness.orchestrator.execute(job).await;

    let result = harness.orchestrator.cancel(task.id, harness.user_id).await;

    assert_eq!(code_of(result), "TASK_ALREADY_FINISHED");
}

#[tokio::test]
async fn given_full_queue_when_processing_then_queue_full_and_task_failed() {
    let harness = TestHarness::with_adapter(FakeAdapter::new(FakeBehavior::Hang), 1);
    let first = harness
        .orchestrator
        .create(harness.request("a.mp3", 16))
        .await
        .unwrap();
    let second = harness
        .orchestrator
        .create(harness.request("b.mp3", 16))
        .await
        .unwrap();
    harness
        .orchestrator
        .process(first.id, byte_stream(Bytes::from(vec![1u8; 16])))
        .await
        .unwrap();

    let result = harness
        .orchestrator
        .process(second.id, byte_stream(Bytes::from(vec![1u8; 16])))
        .await;

    assert!(matches!(result, Err(TaskError::QueueFull)));
    let stored = harness.stored(second.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("QUEUE_FULL"));
    assert!(!harness.orchestrator.cancellations().is_tracked(second.id));
}

#[tokio::test]
async fn given_short_upload_when_processing_then_upload_failed_and_blob_removed() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let task = harness
        .orchestrator
        .create(harness.request("talk.mp3", 100))
        .await
        .unwrap();

    let result = harness
        .orchestrator
        .process(task.id, byte_stream(Bytes::from(vec![0u8; 50])))
        .await;

    assert_eq!(code_of(result), "UPLOAD_FAILED");
    let stored = harness.stored(task.id).await;
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("UPLOAD_FAILED"));
    assert!(harness.files.list_by_task(task.id).await.unwrap().is_empty());
    assert_eq!(harness.notifier.failed().len(), 1);
}

#[tokio::test]
async fn given_cancelled_task_when_processing_then_rejected() {
    let harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let task = harness
        .orchestrator
        .create(harness.request("talk.mp3", 8))
        .await
        .unwrap();
    harness
        .orchestrator
        .cancel(task.id, harness.user_id)
        .await
        .unwrap();

    let result = harness
        .orchestrator
        .process(task.id, byte_stream(Bytes::from_static(b"12345678")))
        .await;

    assert_eq!(code_of(result), "TASK_ALREADY_FINISHED");
}

#[tokio::test]
async fn given_completed_task_when_deleted_then_records_and_blobs_are_gone() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    harness.orchestrator.execute(job).await;

    harness
        .orchestrator
        .delete(task.id, harness.user_id)
        .await
        .unwrap();

    let lookup = harness.orchestrator.get(task.id, harness.user_id).await;
    assert_eq!(code_of(lookup), "TASK_NOT_FOUND");
    assert!(harness.files.list_by_task(task.id).await.unwrap().is_empty());
    let blob = harness
        .media
        .get(&StoragePath::result(&task.id, OutputFormat::Txt))
        .await;
    assert!(blob.is_err());
}

#[tokio::test]
async fn given_other_user_when_reading_task_then_not_found() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, _) = harness.submit(harness.request("talk.mp3", 1024)).await;

    let result = harness.orchestrator.get(task.id, UserId::new(999)).await;

    assert_eq!(code_of(result), "TASK_NOT_FOUND");
}

#[tokio::test]
async fn given_completed_task_when_previewing_then_text_and_json_are_returned() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, job) = harness.submit(harness.request("talk.mp3", 1024)).await;
    harness.orchestrator.execute(job).await;

    let text = harness
        .orchestrator
        .preview(task.id, harness.user_id, PreviewKind::Text)
        .await
        .unwrap();
    let json = harness
        .orchestrator
        .preview(task.id, harness.user_id, PreviewKind::Json)
        .await
        .unwrap();

    assert_eq!(
        text,
        ResultPreview::Text("Bonjour tout le monde. Merci.".to_string())
    );
    let ResultPreview::Json(body) = json else {
        panic!("expected a json preview");
    };
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["language"], "fr");
    assert_eq!(value["segments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn given_unfinished_task_when_downloading_then_result_not_ready() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (task, _) = harness.submit(harness.request("talk.mp3", 1024)).await;

    let result = harness
        .orchestrator
        .download(task.id, harness.user_id, None)
        .await;

    assert_eq!(code_of(result), "RESULT_NOT_READY");
}

#[test]
fn given_preview_names_when_parsing_then_text_json_or_invalid_format() {
    assert_eq!("text".parse::<PreviewKind>().unwrap(), PreviewKind::Text);
    assert_eq!("json".parse::<PreviewKind>().unwrap(), PreviewKind::Json);
    assert_eq!(code_of("xml".parse::<PreviewKind>()), "INVALID_FORMAT");
}

#[tokio::test]
async fn given_mixed_tasks_when_listing_and_aggregating_then_per_user_view() {
    let mut harness = TestHarness::new(FakeBehavior::Complete(sample_result()));
    let (done, job) = harness.submit(harness.request("a.mp3", 2048)).await;
    harness.orchestrator.execute(job).await;
    let pending = harness
        .orchestrator
        .create(harness.request("b.wav", 1024))
        .await
        .unwrap();

    let (all, total) = harness
        .orchestrator
        .list(harness.user_id, &TaskQuery::default())
        .await
        .unwrap();
    let (completed, _) = harness
        .orchestrator
        .list(
            harness.user_id,
            &TaskQuery::new(Some(TaskStatus::Completed), None, None),
        )
        .await
        .unwrap();
    let stats = harness.orchestrator.stats(harness.user_id).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(all[0].id, pending.id);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.total_file_size, 3072);
}
