//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::DrawingService;
use crate::domain::ports::{DrawingCommand, DrawingQuery, DrawingRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub drawings: Arc<dyn DrawingCommand>,
    pub drawings_query: Arc<dyn DrawingQuery>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(drawings: Arc<dyn DrawingCommand>, drawings_query: Arc<dyn DrawingQuery>) -> Self {
        Self {
            drawings,
            drawings_query,
        }
    }

    /// Serve both ports from one [`DrawingService`].
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use drawings::domain::DrawingService;
    /// use drawings::inbound::http::state::HttpState;
    /// use drawings::outbound::memory::InMemoryDrawingRepository;
    /// use mockable::DefaultClock;
    ///
    /// let service = DrawingService::new(
    ///     Arc::new(InMemoryDrawingRepository::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _state = HttpState::from_service(Arc::new(service));
    /// ```
    pub fn from_service<R>(service: Arc<DrawingService<R>>) -> Self
    where
        R: DrawingRepository + 'static,
    {
        let drawings: Arc<dyn DrawingCommand> = service.clone();
        let drawings_query: Arc<dyn DrawingQuery> = service;
        Self::new(drawings, drawings_query)
    }
}
