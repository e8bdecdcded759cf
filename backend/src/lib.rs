//! Drawing persistence service.
//!
//! Hexagonal layout: `domain` owns the drawing aggregate, its service and
//! ports; `inbound::http` adapts the ports to actix handlers; `outbound`
//! provides PostgreSQL and in-memory repositories; `middleware`, `server`
//! and `settings` assemble the running process.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::RequestId;
