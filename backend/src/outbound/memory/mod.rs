//! Process-local drawing repository.
//!
//! Drawings live in a `HashMap` behind a `RwLock`; nothing survives a restart.
//! The lock is never held across an `.await`, so every operation is a single
//! atomic step, matching the per-statement atomicity of the SQL adapter.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::ports::{DrawingRepository, DrawingRepositoryError};
use crate::domain::{Drawing, DrawingId};

/// In-memory implementation of the `DrawingRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryDrawingRepository {
    drawings: RwLock<HashMap<DrawingId, Drawing>>,
}

impl InMemoryDrawingRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> DrawingRepositoryError {
    DrawingRepositoryError::query("in-memory store lock poisoned")
}

#[async_trait]
impl DrawingRepository for InMemoryDrawingRepository {
    async fn create(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError> {
        let mut drawings = self.drawings.write().map_err(poisoned)?;
        if drawings.contains_key(&drawing.id()) {
            return Err(DrawingRepositoryError::query("duplicate drawing id"));
        }
        drawings.insert(drawing.id(), drawing.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DrawingId) -> Result<Option<Drawing>, DrawingRepositoryError> {
        let drawings = self.drawings.read().map_err(poisoned)?;
        Ok(drawings.get(id).cloned())
    }

    async fn find_page(&self, window: PageWindow) -> Result<Vec<Drawing>, DrawingRepositoryError> {
        let drawings = self.drawings.read().map_err(poisoned)?;
        let mut ordered: Vec<&Drawing> = drawings.values().collect();
        ordered.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        Ok(ordered
            .into_iter()
            .skip(window.offset_usize())
            .take(window.limit_usize())
            .cloned()
            .collect())
    }

    async fn update(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError> {
        let mut drawings = self.drawings.write().map_err(poisoned)?;
        match drawings.get_mut(&drawing.id()) {
            Some(slot) => {
                *slot = drawing.clone();
                Ok(())
            }
            None => Err(DrawingRepositoryError::not_found(*drawing.id().as_uuid())),
        }
    }

    async fn delete(&self, id: &DrawingId) -> Result<(), DrawingRepositoryError> {
        let mut drawings = self.drawings.write().map_err(poisoned)?;
        drawings
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DrawingRepositoryError::not_found(*id.as_uuid()))
    }

    async fn count(&self) -> Result<u64, DrawingRepositoryError> {
        let drawings = self.drawings.read().map_err(poisoned)?;
        Ok(drawings.len() as u64)
    }
}
