//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use crate::inbound::http::drawings::DEFAULT_MAX_BODY_BYTES;
use crate::middleware::{AuthConfig, CorsConfig};
use crate::settings::AppSettings;

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) shutdown_timeout: Duration,
    pub(crate) workers: Option<usize>,
    pub(crate) max_body_bytes: usize,
    pub(crate) cors: CorsConfig,
    pub(crate) auth: AuthConfig,
}

impl ServerConfig {
    /// Defaults: CORS for the local dev origin, auth disabled, 10 second
    /// shutdown grace period, one worker per core, 32 MiB JSON bodies.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            workers: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors: CorsConfig::default(),
            auth: AuthConfig::disabled(),
        }
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

impl From<&AppSettings> for ServerConfig {
    fn from(settings: &AppSettings) -> Self {
        Self::new(settings.server.bind_addr)
            .with_shutdown_timeout(settings.server.shutdown_timeout)
            .with_workers(settings.server.workers)
            .with_max_body_bytes(settings.server.max_body_bytes)
            .with_cors(settings.cors.clone())
            .with_auth(settings.auth.clone())
    }
}
