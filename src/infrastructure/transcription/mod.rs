mod azure_whisper_adapter;
mod default_registry;
mod openai_whisper_adapter;
mod whisper_api;

pub use azure_whisper_adapter::{
    AZURE_DEFAULT_API_VERSION, AZURE_DEFAULT_DEPLOYMENT, AzureWhisperAdapter, AzureWhisperConfig,
};
pub use default_registry::default_adapter_registry;
pub use openai_whisper_adapter::{
    OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL, OpenAiWhisperAdapter, OpenAiWhisperConfig,
};
pub use whisper_api::confidence_from_logprob;
