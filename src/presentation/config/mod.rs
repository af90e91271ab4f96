mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AdapterSettings, BillingSettings, DatabaseProvider, DatabaseSettings, LimitSettings,
    LoggingSettings, RetentionSettings, SeedBalance, SeedChannel, SeedSettings, ServerSettings,
    Settings, StorageProviderSetting, StorageSettings, WorkerSettings,
};
