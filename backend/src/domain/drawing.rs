//! Drawing aggregate.
//!
//! A drawing is a display name plus an opaque JSON document. The document is
//! never interpreted; it only has to be a JSON object. Every constructor and
//! mutation re-runs the same validation, and mutations validate before they
//! commit, so a live `Drawing` is always valid.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum drawing name length in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Timestamps are kept at microsecond precision to match storage.
const TIMESTAMP_DIGITS: u16 = 6;

/// Validation errors returned by [`Drawing`] constructors and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawingValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidData { reason: &'static str },
}

impl fmt::Display for DrawingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "drawing name cannot be empty"),
            Self::NameTooLong { max } => {
                write!(f, "drawing name exceeds maximum length of {max} characters")
            }
            Self::InvalidData { reason } => write!(f, "invalid drawing data: {reason}"),
        }
    }
}

impl std::error::Error for DrawingValidationError {}

/// Stable drawing identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(Uuid);

impl DrawingId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for DrawingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Check a candidate name.
///
/// Emptiness is judged on the trimmed value; length is judged on the value as
/// given, so surrounding whitespace counts toward the limit.
///
/// # Examples
/// ```
/// use drawings::domain::{DrawingValidationError, validate_name};
///
/// assert!(validate_name("Floor plan").is_ok());
/// assert_eq!(validate_name("   "), Err(DrawingValidationError::EmptyName));
/// ```
pub fn validate_name(name: &str) -> Result<(), DrawingValidationError> {
    if name.trim().is_empty() {
        return Err(DrawingValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DrawingValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Check a candidate document, returning its object map.
pub fn validate_data(data: Value) -> Result<Map<String, Value>, DrawingValidationError> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Err(DrawingValidationError::InvalidData {
            reason: "data cannot be null",
        }),
        _ => Err(DrawingValidationError::InvalidData {
            reason: "data must be a JSON object",
        }),
    }
}

fn storage_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(TIMESTAMP_DIGITS)
}

/// Persisted field set used to rehydrate a [`Drawing`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingRecord {
    pub id: Uuid,
    pub name: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Drawing aggregate root.
///
/// ## Invariants
/// - `name` is non-blank and at most [`MAX_NAME_LENGTH`] characters.
/// - `data` is a JSON object.
/// - `created_at == updated_at` on construction; `updated_at` strictly
///   advances on every successful update.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use drawings::domain::Drawing;
/// use serde_json::json;
///
/// let drawing = Drawing::new("Sketch", json!({"elements": []}), Utc::now())
///     .expect("valid drawing");
/// assert_eq!(drawing.created_at(), drawing.updated_at());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    id: DrawingId,
    name: String,
    data: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Drawing {
    /// Create a drawing with a fresh identity stamped at `now`.
    pub fn new(
        name: impl Into<String>,
        data: Value,
        now: DateTime<Utc>,
    ) -> Result<Self, DrawingValidationError> {
        let name = name.into();
        validate_name(&name)?;
        let data = validate_data(data)?;
        let now = storage_precision(now);
        Ok(Self {
            id: DrawingId::random(),
            name,
            data,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a stored drawing, re-running construction validation.
    pub fn reconstruct(record: DrawingRecord) -> Result<Self, DrawingValidationError> {
        let DrawingRecord {
            id,
            name,
            data,
            created_at,
            updated_at,
        } = record;
        validate_name(&name)?;
        let data = validate_data(data)?;
        Ok(Self {
            id: DrawingId::from_uuid(id),
            name,
            data,
            created_at,
            updated_at,
        })
    }

    /// Replace name and document.
    ///
    /// Both inputs are validated before anything is written, so a rejected
    /// update leaves the drawing untouched.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        data: Value,
        now: DateTime<Utc>,
    ) -> Result<(), DrawingValidationError> {
        let name = name.into();
        validate_name(&name)?;
        let data = validate_data(data)?;

        let now = storage_precision(now);
        let floor = self.updated_at + TimeDelta::microseconds(1);
        self.name = name;
        self.data = data;
        self.updated_at = now.max(floor);
        Ok(())
    }

    pub fn id(&self) -> DrawingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Document as a JSON value, for adapters that store it whole.
    pub fn data_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Client-facing projection of a [`Drawing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DrawingView {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Floor plan")]
    pub name: String,
    #[schema(value_type = Object)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Drawing> for DrawingView {
    fn from(drawing: &Drawing) -> Self {
        Self {
            id: drawing.id.to_string(),
            name: drawing.name.clone(),
            data: drawing.data_value(),
            created_at: drawing.created_at,
            updated_at: drawing.updated_at,
        }
    }
}

impl From<Drawing> for DrawingView {
    fn from(drawing: Drawing) -> Self {
        Self {
            id: drawing.id.to_string(),
            name: drawing.name,
            data: Value::Object(drawing.data),
            created_at: drawing.created_at,
            updated_at: drawing.updated_at,
        }
    }
}
