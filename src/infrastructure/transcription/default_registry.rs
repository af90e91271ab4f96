use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::TranscriptionAdapter;
use crate::application::services::AdapterRegistry;
use crate::domain::EngineType;

use super::{AzureWhisperAdapter, OpenAiWhisperAdapter};

/// Registry with every adapter this build ships.
pub fn default_adapter_registry(timeout: Duration, max_retries: u32) -> AdapterRegistry {
    AdapterRegistry::new()
        .with_defaults(timeout, max_retries)
        .register(EngineType::Whisper, |config| {
            let adapter: Arc<dyn TranscriptionAdapter> =
                Arc::new(OpenAiWhisperAdapter::from_adapter_config(config)?);
            Ok(adapter)
        })
        .register(EngineType::Azure, |config| {
            let adapter: Arc<dyn TranscriptionAdapter> =
                Arc::new(AzureWhisperAdapter::from_adapter_config(config)?);
            Ok(adapter)
        })
}
