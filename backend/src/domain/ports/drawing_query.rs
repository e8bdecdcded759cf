//! Driving port for drawing reads.

use async_trait::async_trait;
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::{DrawingView, Error};

/// Request to fetch one drawing by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDrawingRequest {
    pub id: String,
}

/// Request to list drawings.
///
/// Values are normalised by the implementation: a missing or non-positive
/// `limit` becomes 10 and a missing or negative `offset` becomes 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDrawingsRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Driving port for drawing reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawingQuery: Send + Sync {
    /// Fetch one drawing.
    async fn get(&self, request: GetDrawingRequest) -> Result<DrawingView, Error>;

    /// Fetch one page of drawings plus the collection total.
    async fn list(&self, request: ListDrawingsRequest) -> Result<Page<DrawingView>, Error>;
}
