//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Drawing, DrawingRecord};

use super::schema::drawings;

/// Row struct for reading from the drawings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = drawings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DrawingRow {
    pub id: Uuid,
    pub name: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DrawingRow> for DrawingRecord {
    fn from(row: DrawingRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating new drawing records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = drawings)]
pub(crate) struct NewDrawingRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Drawing> for NewDrawingRow<'a> {
    fn from(drawing: &'a Drawing) -> Self {
        Self {
            id: *drawing.id().as_uuid(),
            name: drawing.name(),
            data: drawing.data_value(),
            created_at: drawing.created_at(),
            updated_at: drawing.updated_at(),
        }
    }
}

/// Changeset struct for updating existing drawing records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = drawings)]
pub(crate) struct DrawingUpdate<'a> {
    pub name: &'a str,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Drawing> for DrawingUpdate<'a> {
    fn from(drawing: &'a Drawing) -> Self {
        Self {
            name: drawing.name(),
            data: drawing.data_value(),
            updated_at: drawing.updated_at(),
        }
    }
}
