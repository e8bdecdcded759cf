//! Outbound adapters implementing domain ports for storage.
//!
//! - **persistence**: PostgreSQL-backed repository using Diesel ORM.
//! - **memory**: process-local repository used when no database is
//!   configured and by the test suites.
//!
//! Adapters are thin translators that convert between domain types and
//! storage representations. They contain no business logic.

pub mod memory;
pub mod persistence;
