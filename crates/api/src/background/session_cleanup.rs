//! Periodic deletion of dead refresh sessions.
//!
//! Every login and refresh inserts a `user_sessions` row. Expired rows and
//! rows revoked more than [`REVOKED_RETENTION_HOURS`] ago are removed here.

use std::time::Duration;

use chrono::Utc;
use mineruca_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

const REVOKED_RETENTION_HOURS: i64 = 24;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run one pass. Returns the number of rows removed.
pub async fn purge_once(pool: &PgPool) -> Result<u64, sqlx::Error> {
    SessionRepo::purge_dead(pool, Utc::now() - chrono::Duration::hours(REVOKED_RETENTION_HOURS)).await
}

pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => match purge_once(&pool).await {
                Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged dead sessions"),
                Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
            },
        }
    }
}
