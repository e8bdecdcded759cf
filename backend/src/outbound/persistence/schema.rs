//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! When a migration changes the schema, regenerate with `diesel print-schema`
//! or update by hand.

diesel::table! {
    /// Stored drawings.
    ///
    /// `data` holds the client document verbatim as JSONB; key order is not
    /// preserved across a round trip.
    drawings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 255 characters).
        name -> Varchar,
        /// Opaque JSON object document.
        data -> Jsonb,
        /// Creation timestamp, microsecond precision.
        created_at -> Timestamptz,
        /// Last modification timestamp, microsecond precision.
        updated_at -> Timestamptz,
    }
}
