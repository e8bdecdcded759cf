//! Driven port for drawing persistence adapters and their errors.
//!
//! Adapters store the document opaquely and rehydrate rows through
//! [`Drawing::reconstruct`], reporting invalid stored rows as
//! [`DrawingRepositoryError::Corrupt`] rather than coercing them.
//!
//! No call here is bounded by a timeout. Dropping the returned future cancels
//! the in-flight operation, which is how an aborted request propagates.

use async_trait::async_trait;
use pagination::PageWindow;
use uuid::Uuid;

use crate::domain::{Drawing, DrawingId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by drawing repository adapters.
    pub enum DrawingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "drawing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "drawing repository query failed: {message}",
        /// A stored row failed aggregate validation.
        Corrupt { message: String } => "stored drawing is corrupt: {message}",
        /// The targeted row does not exist.
        NotFound { id: Uuid } => "drawing {id} not found",
    }
}

/// Storage contract for drawings.
///
/// Pages are ordered newest first by `created_at`. `count` is a separate read
/// and is not coordinated with `find_page`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawingRepository: Send + Sync {
    /// Insert a new drawing.
    async fn create(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError>;

    /// Fetch a drawing by identifier.
    async fn find_by_id(&self, id: &DrawingId) -> Result<Option<Drawing>, DrawingRepositoryError>;

    /// Fetch one page of drawings.
    async fn find_page(&self, window: PageWindow) -> Result<Vec<Drawing>, DrawingRepositoryError>;

    /// Overwrite name, data and `updated_at` of an existing drawing.
    ///
    /// Returns [`DrawingRepositoryError::NotFound`] when no row matched.
    async fn update(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError>;

    /// Delete a drawing.
    ///
    /// Returns [`DrawingRepositoryError::NotFound`] when no row matched.
    async fn delete(&self, id: &DrawingId) -> Result<(), DrawingRepositoryError>;

    /// Count all stored drawings.
    async fn count(&self) -> Result<u64, DrawingRepositoryError>;
}
