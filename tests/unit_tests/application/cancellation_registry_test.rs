use scribeflow::application::services::CancellationRegistry;
use scribeflow::domain::TaskId;

#[test]
fn given_registered_task_when_cancelled_then_token_fires() {
    let registry = CancellationRegistry::new();
    let task_id = TaskId::new();
    let token = registry.register(task_id);

    assert!(registry.cancel(task_id));
    assert!(token.is_cancelled());
}

#[test]
fn given_untracked_task_when_cancelled_then_reports_false() {
    let registry = CancellationRegistry::new();
    assert!(!registry.cancel(TaskId::new()));
}

#[test]
fn given_double_registration_when_cancelled_then_both_handles_share_the_token() {
    let registry = CancellationRegistry::new();
    let task_id = TaskId::new();
    let first = registry.register(task_id);
    let second = registry.register(task_id);

    registry.cancel(task_id);

    assert!(first.is_cancelled());
    assert!(second.is_cancelled());
    assert_eq!(registry.len(), 1);
}

#[test]
fn given_removed_task_when_checking_then_no_longer_tracked() {
    let registry = CancellationRegistry::new();
    let task_id = TaskId::new();
    registry.register(task_id);

    registry.remove(task_id);

    assert!(!registry.is_tracked(task_id));
    assert!(registry.is_empty());
}
