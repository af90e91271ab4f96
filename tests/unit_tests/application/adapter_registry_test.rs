use std::sync::Arc;
use std::time::Duration;

use scribeflow::application::ports::{AdapterConfig, AdapterError, TranscriptionAdapter};
use scribeflow::application::services::AdapterRegistry;
use scribeflow::domain::EngineType;

use crate::helpers::{FakeAdapter, FakeBehavior, sample_result, whisper_channel};

fn fake_constructor()
-> impl Fn(AdapterConfig) -> Result<Arc<dyn TranscriptionAdapter>, AdapterError> + Send + Sync + 'static
{
    |_| {
        let adapter: Arc<dyn TranscriptionAdapter> =
            Arc::new(FakeAdapter::new(FakeBehavior::Complete(sample_result())));
        Ok(adapter)
    }
}

#[test]
fn given_registered_engine_when_creating_for_channel_then_adapter_is_built() {
    let registry = AdapterRegistry::new().register(EngineType::Local, fake_constructor());

    let adapter = registry.for_channel(&whisper_channel("local", 1)).unwrap();

    assert_eq!(adapter.engine_type(), EngineType::Local);
    assert!(registry.is_registered(EngineType::Local));
}

#[test]
fn given_unregistered_engine_when_creating_then_config_error() {
    let registry = AdapterRegistry::new();
    let mut channel = whisper_channel("tencent", 1);
    channel.engine_type = EngineType::Tencent;

    let error = registry.for_channel(&channel).err().unwrap();

    assert_eq!(error.code(), "CONFIG_ERROR");
    assert!(error.to_string().contains("tencent"));
}

#[test]
fn given_several_engines_when_listing_then_sorted_by_code() {
    let registry = AdapterRegistry::new()
        .register(EngineType::Local, fake_constructor())
        .register(EngineType::Whisper, fake_constructor())
        .register(EngineType::Azure, fake_constructor());

    let types = registry.engine_types();

    let mut expected = vec![EngineType::Local, EngineType::Whisper, EngineType::Azure];
    expected.sort_by_key(|t| t.code());
    assert_eq!(types, expected);
}

#[test]
fn given_channel_when_building_config_then_channel_fields_and_defaults_flow_through() {
    let registry = AdapterRegistry::new().with_defaults(Duration::from_secs(45), 2);
    let mut channel = whisper_channel("remote", 1);
    channel.base_url = Some("https://api.example.com".to_string());
    channel.max_file_size = Some(25 * 1024 * 1024);

    let config = registry.config_for(&channel);

    assert_eq!(config.api_key, "secret");
    assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(config.timeout, Duration::from_secs(45));
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.max_file_size, Some(25 * 1024 * 1024));
    assert_eq!(config.supported_languages, vec!["auto"]);
}
