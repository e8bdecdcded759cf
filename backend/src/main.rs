//! Service entry-point: reads settings, installs logging, selects storage and
//! runs the HTTP server until a shutdown signal arrives.

use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use drawings::server::{ServerConfig, build_http_state, create_server};
use drawings::settings::{AppSettings, LogFormat, LoggingSettings};

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);
    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let settings = AppSettings::from_env(&DefaultEnv::new()).wrap_err("invalid configuration")?;
    init_tracing(&settings.logging);

    let state = build_http_state(settings.database.as_ref())
        .await
        .wrap_err("failed to prepare drawing storage")?;
    let server = create_server(state, ServerConfig::from(&settings))
        .wrap_err_with(|| format!("failed to bind {}", settings.server.bind_addr))?;

    server.await.wrap_err("HTTP server terminated abnormally")?;
    info!("server stopped");
    Ok(())
}
