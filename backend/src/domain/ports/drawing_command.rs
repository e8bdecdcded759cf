//! Driving port for drawing mutations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DrawingView, Error};

/// Request to create a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDrawingRequest {
    pub name: String,
    pub data: Value,
}

/// Partial update request.
///
/// An empty `name` keeps the stored name and an absent or `null` `data` keeps
/// the stored document. Any other value replaces the field outright, so this
/// request cannot rename a drawing to `""` or clear its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDrawingRequest {
    pub id: String,
    pub name: String,
    pub data: Option<Value>,
}

/// Request to delete a drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDrawingRequest {
    pub id: String,
}

/// Driving port for drawing mutations.
///
/// Identifiers arrive as raw strings; implementations reject malformed ones
/// with [`crate::domain::ErrorCode::InvalidRequest`] before touching storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawingCommand: Send + Sync {
    /// Validate and persist a new drawing.
    async fn create(&self, request: CreateDrawingRequest) -> Result<DrawingView, Error>;

    /// Apply a merge-on-absence update.
    async fn update(&self, request: UpdateDrawingRequest) -> Result<DrawingView, Error>;

    /// Delete an existing drawing; deleting a missing one is `NotFound`.
    async fn delete(&self, request: DeleteDrawingRequest) -> Result<(), Error>;
}
