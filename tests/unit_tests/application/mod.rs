mod adapter_registry_test;
mod cancellation_registry_test;
mod engine_selector_test;
mod task_orchestrator_test;
