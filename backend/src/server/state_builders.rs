//! Builders for HTTP state backed by the configured repository.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::DrawingService;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryDrawingRepository;
use crate::outbound::persistence::{
    DbPool, DieselDrawingRepository, MigrationError, PoolError, run_pending_migrations,
};
use crate::settings::DatabaseSettings;

/// Failures while preparing the storage adapter at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Handler state backed by the in-memory repository.
#[must_use]
pub fn in_memory_state() -> HttpState {
    let service = DrawingService::new(
        Arc::new(InMemoryDrawingRepository::new()),
        Arc::new(DefaultClock),
    );
    HttpState::from_service(Arc::new(service))
}

/// Handler state for the configured storage.
///
/// With database settings, pending migrations are applied first (when
/// enabled) and a pool is built; otherwise drawings are kept in memory.
///
/// # Errors
/// Returns [`StartupError`] when migrations fail or the pool cannot be built.
pub async fn build_http_state(
    database: Option<&DatabaseSettings>,
) -> Result<HttpState, StartupError> {
    let Some(database) = database else {
        warn!("DATABASE_URL not set; drawings are kept in memory and lost on restart");
        return Ok(in_memory_state());
    };

    if database.run_migrations {
        run_pending_migrations(database.pool.database_url()).await?;
    }
    let pool = DbPool::new(database.pool.clone()).await?;
    info!(url = %database.pool.redacted_url(), "connected to PostgreSQL");

    let service = DrawingService::new(
        Arc::new(DieselDrawingRepository::new(pool)),
        Arc::new(DefaultClock),
    );
    Ok(HttpState::from_service(Arc::new(service)))
}
