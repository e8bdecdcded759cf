//! PostgreSQL-backed `DrawingRepository` implementation using Diesel ORM.
//!
//! Each method is a single statement, so consistency relies on per-statement
//! atomicity. Rows are rehydrated through `Drawing::reconstruct`; a row that
//! fails validation is reported as corrupt instead of being coerced.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageWindow;
use tracing::warn;

use crate::domain::ports::{DrawingRepository, DrawingRepositoryError};
use crate::domain::{Drawing, DrawingId, DrawingRecord};

use super::models::{DrawingRow, DrawingUpdate, NewDrawingRow};
use super::pool::{DbPool, PoolError};
use super::schema::drawings;

/// Diesel-backed implementation of the `DrawingRepository` port.
#[derive(Clone)]
pub struct DieselDrawingRepository {
    pool: DbPool,
}

impl DieselDrawingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DrawingRepositoryError {
    DrawingRepositoryError::connection(error.into_message())
}

/// Keep the driver's own description in the port error so the boundary log
/// names the real cause. Client bodies never carry it.
fn map_diesel_error(error: diesel::result::Error) -> DrawingRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DrawingRepositoryError::connection(format!(
                "database connection closed: {}",
                info.message()
            ))
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DrawingRepositoryError::query(format!("duplicate drawing id: {}", info.message()))
        }
        DieselError::DatabaseError(kind, info) => {
            DrawingRepositoryError::query(format!("{kind:?}: {}", info.message()))
        }
        DieselError::DeserializationError(cause) => {
            DrawingRepositoryError::corrupt(format!("row could not be decoded: {cause}"))
        }
        other => DrawingRepositoryError::query(other.to_string()),
    }
}

fn row_to_drawing(row: DrawingRow) -> Result<Drawing, DrawingRepositoryError> {
    let id = row.id;
    Drawing::reconstruct(DrawingRecord::from(row)).map_err(|err| {
        warn!(drawing_id = %id, error = %err, "stored drawing failed validation");
        DrawingRepositoryError::corrupt(format!("drawing {id}: {err}"))
    })
}

#[async_trait]
impl DrawingRepository for DieselDrawingRepository {
    async fn create(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(drawings::table)
            .values(NewDrawingRow::from(drawing))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &DrawingId) -> Result<Option<Drawing>, DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DrawingRow> = drawings::table
            .find(*id.as_uuid())
            .select(DrawingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_drawing).transpose()
    }

    async fn find_page(&self, window: PageWindow) -> Result<Vec<Drawing>, DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DrawingRow> = drawings::table
            .order((drawings::created_at.desc(), drawings::id.desc()))
            .limit(window.limit())
            .offset(window.offset())
            .select(DrawingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_drawing).collect()
    }

    async fn update(&self, drawing: &Drawing) -> Result<(), DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(drawings::table.find(*drawing.id().as_uuid()))
            .set(DrawingUpdate::from(drawing))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if affected == 0 {
            return Err(DrawingRepositoryError::not_found(*drawing.id().as_uuid()));
        }
        Ok(())
    }

    async fn delete(&self, id: &DrawingId) -> Result<(), DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(drawings::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if affected == 0 {
            return Err(DrawingRepositoryError::not_found(*id.as_uuid()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DrawingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = drawings::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(total).map_err(|_| DrawingRepositoryError::query("negative row count"))
    }
}
