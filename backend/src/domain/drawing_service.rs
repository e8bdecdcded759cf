//! Drawing application service.
//!
//! Implements the drawing driving ports on top of a [`DrawingRepository`],
//! applying the pagination defaults and the merge-on-absence update policy,
//! and classifying every failure into the domain [`Error`] taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageWindow};
use tracing::{debug, error, info};

use crate::domain::ports::{
    CreateDrawingRequest, DeleteDrawingRequest, DrawingCommand, DrawingQuery, DrawingRepository,
    DrawingRepositoryError, GetDrawingRequest, ListDrawingsRequest, UpdateDrawingRequest,
};
use crate::domain::{Drawing, DrawingId, DrawingValidationError, DrawingView, Error, ErrorCode};

const NOT_FOUND_MESSAGE: &str = "Drawing not found";

fn map_validation_error(error: DrawingValidationError) -> Error {
    match error {
        DrawingValidationError::EmptyName => {
            Error::new(ErrorCode::EmptyName, "Drawing name cannot be empty")
        }
        DrawingValidationError::NameTooLong { .. } => Error::new(
            ErrorCode::NameTooLong,
            "Drawing name exceeds maximum length",
        ),
        DrawingValidationError::InvalidData { .. } => {
            Error::new(ErrorCode::InvalidData, "Invalid drawing data")
        }
    }
}

fn map_repository_error(operation: &'static str, err: DrawingRepositoryError) -> Error {
    match err {
        DrawingRepositoryError::NotFound { .. } => Error::not_found(NOT_FOUND_MESSAGE),
        other => {
            error!(operation, error = %other, "drawing repository failure");
            Error::internal(format!("failed to {operation} drawing: {other}"))
        }
    }
}

fn parse_id(raw: &str) -> Result<DrawingId, Error> {
    if raw.trim().is_empty() {
        return Err(Error::invalid_request("missing drawing ID"));
    }
    raw.parse()
        .map_err(|_| Error::invalid_request("invalid drawing ID"))
}

/// Drawing service implementing [`DrawingCommand`] and [`DrawingQuery`].
///
/// # Examples
/// ```
/// # use std::sync::Arc;
/// # use mockable::DefaultClock;
/// use drawings::domain::DrawingService;
/// use drawings::outbound::memory::InMemoryDrawingRepository;
///
/// let service = DrawingService::new(
///     Arc::new(InMemoryDrawingRepository::default()),
///     Arc::new(DefaultClock),
/// );
/// # let _ = service;
/// ```
#[derive(Clone)]
pub struct DrawingService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> DrawingService<R> {
    /// Create a service over `repo`, stamping timestamps from `clock`.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> DrawingService<R>
where
    R: DrawingRepository,
{
    async fn load(&self, id: &DrawingId) -> Result<Drawing, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|err| map_repository_error("load", err))?
            .ok_or_else(|| Error::not_found(NOT_FOUND_MESSAGE))
    }
}

#[async_trait]
impl<R> DrawingCommand for DrawingService<R>
where
    R: DrawingRepository,
{
    async fn create(&self, request: CreateDrawingRequest) -> Result<DrawingView, Error> {
        let CreateDrawingRequest { name, data } = request;
        let drawing = Drawing::new(name, data, self.clock.utc()).map_err(map_validation_error)?;

        self.repo
            .create(&drawing)
            .await
            .map_err(|err| map_repository_error("create", err))?;

        info!(drawing_id = %drawing.id(), "drawing created");
        Ok(DrawingView::from(drawing))
    }

    async fn update(&self, request: UpdateDrawingRequest) -> Result<DrawingView, Error> {
        let UpdateDrawingRequest { id, name, data } = request;
        let id = parse_id(&id)?;
        let mut drawing = self.load(&id).await?;

        let name = if name.is_empty() {
            drawing.name().to_owned()
        } else {
            name
        };
        let data = match data {
            Some(value) if !value.is_null() => value,
            _ => drawing.data_value(),
        };
        drawing
            .update(name, data, self.clock.utc())
            .map_err(map_validation_error)?;

        self.repo
            .update(&drawing)
            .await
            .map_err(|err| map_repository_error("update", err))?;

        info!(drawing_id = %id, "drawing updated");
        Ok(DrawingView::from(drawing))
    }

    async fn delete(&self, request: DeleteDrawingRequest) -> Result<(), Error> {
        let id = parse_id(&request.id)?;
        self.load(&id).await?;

        self.repo
            .delete(&id)
            .await
            .map_err(|err| map_repository_error("delete", err))?;

        info!(drawing_id = %id, "drawing deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> DrawingQuery for DrawingService<R>
where
    R: DrawingRepository,
{
    async fn get(&self, request: GetDrawingRequest) -> Result<DrawingView, Error> {
        let id = parse_id(&request.id)?;
        let drawing = self.load(&id).await?;
        Ok(DrawingView::from(drawing))
    }

    async fn list(&self, request: ListDrawingsRequest) -> Result<Page<DrawingView>, Error> {
        let window = PageWindow::from_parts(request.limit, request.offset);

        let drawings = self
            .repo
            .find_page(window)
            .await
            .map_err(|err| map_repository_error("list", err))?;
        let total = self
            .repo
            .count()
            .await
            .map_err(|err| map_repository_error("count", err))?;

        debug!(
            limit = window.limit(),
            offset = window.offset(),
            returned = drawings.len(),
            total,
            "drawings listed"
        );
        Ok(Page::new(drawings, total, window).map(DrawingView::from))
    }
}

#[cfg(test)]
#[path = "drawing_service_tests.rs"]
mod tests;
