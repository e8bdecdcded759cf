//! Request middleware.
//!
//! Purpose: cross-cutting request concerns composed around the routed
//! handlers. Outermost first the chain is [`Recover`], [`RequestIdMiddleware`],
//! [`AccessLog`], [`Cors`] and [`Auth`]; `server::build_app` wraps them in
//! the reverse order because actix treats the last `wrap` as outermost.

pub mod access_log;
pub mod auth;
pub mod cors;
pub mod recover;
pub mod request_id;

pub use access_log::AccessLog;
pub use auth::{Auth, AuthConfig, AuthMode};
pub use cors::{Cors, CorsConfig};
pub use recover::Recover;
pub use request_id::RequestIdMiddleware;
