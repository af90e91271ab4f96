use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{AdapterConfig, AdapterError, TranscriptionAdapter};
use crate::domain::{Channel, EngineType};

pub type AdapterConstructor = Arc<
    dyn Fn(AdapterConfig) -> Result<Arc<dyn TranscriptionAdapter>, AdapterError> + Send + Sync,
>;

/// Engine type to adapter constructor, filled once at start-up and shared
/// read-only afterwards.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    constructors: HashMap<EngineType, AdapterConstructor>,
    timeout: Option<Duration>,
    max_retries: u32,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout and retry count applied to every adapter built for a channel.
    pub fn with_defaults(mut self, timeout: Duration, max_retries: u32) -> Self {
        self.timeout = Some(timeout);
        self.max_retries = max_retries;
        self
    }

    pub fn register<F>(mut self, engine_type: EngineType, constructor: F) -> Self
    where
        F: Fn(AdapterConfig) -> Result<Arc<dyn TranscriptionAdapter>, AdapterError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(engine_type, Arc::new(constructor));
        self
    }

    pub fn is_registered(&self, engine_type: EngineType) -> bool {
        self.constructors.contains_key(&engine_type)
    }

    pub fn engine_types(&self) -> Vec<EngineType> {
        let mut types: Vec<EngineType> = self.constructors.keys().copied().collect();
        types.sort_by_key(|t| t.code());
        types
    }

    pub fn create(
        &self,
        engine_type: EngineType,
        config: AdapterConfig,
    ) -> Result<Arc<dyn TranscriptionAdapter>, AdapterError> {
        let constructor = self.constructors.get(&engine_type).ok_or_else(|| {
            AdapterError::Config(format!("unsupported engine type: {engine_type}"))
        })?;
        constructor(config)
    }

    pub fn for_channel(
        &self,
        channel: &Channel,
    ) -> Result<Arc<dyn TranscriptionAdapter>, AdapterError> {
        self.create(channel.engine_type, self.config_for(channel))
    }

    pub fn config_for(&self, channel: &Channel) -> AdapterConfig {
        let defaults = AdapterConfig::default();
        AdapterConfig {
            api_key: channel.credential.clone(),
            base_url: channel.base_url.clone(),
            region: channel.region.clone(),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_retries: self.max_retries,
            max_file_size: channel.max_file_size,
            max_duration: channel.max_duration,
            supported_formats: channel.supported_formats.clone(),
            supported_languages: channel.supported_languages.clone(),
            extra: defaults.extra,
        }
    }
}
