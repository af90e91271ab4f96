mod tracing_notifier;

pub use tracing_notifier::TracingTaskNotifier;
