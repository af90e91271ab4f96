use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const CONNECT_ATTEMPTS: u32 = 6;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

/// Connects with back-off so the service can start alongside its database.
/// Sessions are tagged `scribeflow` in `pg_stat_activity`.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let options = PgConnectOptions::from_str(url)
        .map_err(|e| RepositoryError::ConnectionFailed(format!("invalid database url: {e}")))?
        .application_name("scribeflow");

    let mut delay = FIRST_RETRY_DELAY;
    for attempt in 1..=CONNECT_ATTEMPTS {
        let connected = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options.clone())
            .await;
        match connected {
            Ok(pool) => {
                info!(attempt, max_connections, "PostgreSQL pool ready");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "PostgreSQL not reachable yet"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            }
            Err(e) => return Err(RepositoryError::ConnectionFailed(e.to_string())),
        }
    }
    Err(RepositoryError::ConnectionFailed(
        "no connection attempts were made".to_string(),
    ))
}

/// Brings the task, file, channel and quota tables up to date.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(format!("migration failed: {e}")))?;
    info!(migrations = MIGRATOR.iter().count(), "Schema up to date");
    Ok(())
}
