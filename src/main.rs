use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use scribeflow::application::ports::{
    ChannelRepository, QuotaStore, StoredFileRepository, TaskRepository,
};
use scribeflow::application::services::{
    ChannelHealthService, FileRetentionSweeper, OrchestratorSettings, QuotaLedger,
    TaskOrchestrator, spawn_worker_pool,
};
use scribeflow::infrastructure::notification::TracingTaskNotifier;
use scribeflow::infrastructure::observability::{TracingConfig, init_tracing};
use scribeflow::infrastructure::persistence::{
    InMemoryChannelRepository, InMemoryQuotaStore, InMemoryStoredFileRepository,
    InMemoryTaskRepository, PgChannelRepository, PgQuotaStore, PgStoredFileRepository,
    PgTaskRepository, create_pool, run_migrations,
};
use scribeflow::infrastructure::storage::MediaStoreFactory;
use scribeflow::infrastructure::transcription::default_adapter_registry;
use scribeflow::presentation::config::DatabaseProvider;
use scribeflow::presentation::{AppState, Environment, Settings, create_router};

struct Repositories {
    tasks: Arc<dyn TaskRepository>,
    files: Arc<dyn StoredFileRepository>,
    channels: Arc<dyn ChannelRepository>,
    quotas: Arc<dyn QuotaStore>,
}

async fn build_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    match settings.database.provider {
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory repositories; state is lost on restart");
            let channels = settings.seed.channels().map_err(anyhow::Error::msg)?;
            let quotas = InMemoryQuotaStore::new();
            for (user_id, quota) in settings.seed.balances() {
                quotas.set_balance(user_id, quota);
            }
            tracing::info!(
                channels = channels.len(),
                balances = settings.seed.balances.len(),
                "Seeded in-memory repositories"
            );
            Ok(Repositories {
                tasks: Arc::new(InMemoryTaskRepository::new()),
                files: Arc::new(InMemoryStoredFileRepository::new()),
                channels: Arc::new(InMemoryChannelRepository::with_channels(channels)),
                quotas: Arc::new(quotas),
            })
        }
        DatabaseProvider::Postgres => {
            let pool =
                create_pool(&settings.database.url, settings.database.max_connections).await?;
            tracing::info!("Running database migrations...");
            run_migrations(&pool).await?;
            tracing::info!("Migrations complete.");
            Ok(Repositories {
                tasks: Arc::new(PgTaskRepository::new(pool.clone())),
                files: Arc::new(PgStoredFileRepository::new(pool.clone())),
                channels: Arc::new(PgChannelRepository::new(pool.clone())),
                quotas: Arc::new(PgQuotaStore::new(pool)),
            })
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        &TracingConfig::new(
            environment.as_str(),
            settings.logging.level.clone(),
            settings.logging.json || environment.is_production(),
        )
        .with_env_overrides(),
    )?;

    let repositories = build_repositories(&settings).await?;
    let media = MediaStoreFactory::create(&settings.storage)?;
    tracing::info!(backend = media.backend_name(), "Media store ready");

    let registry = Arc::new(default_adapter_registry(
        settings.adapters.timeout(),
        settings.adapters.max_retries,
    ));
    let ledger = Arc::new(QuotaLedger::new(
        Arc::clone(&repositories.quotas),
        settings.billing.rate_per_minute,
    ));

    let (job_sender, job_receiver) = mpsc::channel(settings.workers.queue_capacity.max(1));
    let orchestrator = Arc::new(TaskOrchestrator::new(
        Arc::clone(&repositories.tasks),
        Arc::clone(&repositories.files),
        Arc::clone(&repositories.channels),
        Arc::clone(&media),
        Arc::new(TracingTaskNotifier),
        Arc::clone(&registry),
        ledger,
        job_sender,
        OrchestratorSettings {
            max_file_size: settings.limits.max_file_size,
            max_duration: settings.limits.max_duration,
            retention: chrono::Duration::days(settings.storage.retention_days),
            poll_interval: settings.workers.poll_interval(),
        },
    ));
    let channel_health = Arc::new(ChannelHealthService::new(
        Arc::clone(&repositories.channels),
        registry,
    ));

    let shutdown = CancellationToken::new();
    let workers = spawn_worker_pool(
        settings.workers.count,
        job_receiver,
        Arc::clone(&orchestrator),
        shutdown.clone(),
    );
    tracing::info!(workers = workers.size(), "Worker pool started");

    let sweeper = FileRetentionSweeper::new(
        Arc::clone(&repositories.files),
        Arc::clone(&media),
        settings.retention.sweep_interval(),
    );
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(orchestrator, channel_health, settings);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    workers.join().await;
    if let Err(e) = sweeper_handle.await {
        tracing::error!(error = %e, "Retention sweeper panicked");
    }
    tracing::info!("Shutdown complete");

    Ok(())
}
