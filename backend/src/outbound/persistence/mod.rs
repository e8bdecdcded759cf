//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Provides the `DrawingRepository` port backed by PostgreSQL via Diesel with
//! async support through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository only translates between Diesel rows and
//!   the drawing aggregate. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and the table definition
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel errors are mapped to
//!   `DrawingRepositoryError`.
//!
//! # Example
//!
//! ```ignore
//! use drawings::outbound::persistence::{DbPool, DieselDrawingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/drawings")).await?;
//! let repo = DieselDrawingRepository::new(pool);
//! ```

mod diesel_drawing_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_drawing_repository::DieselDrawingRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
