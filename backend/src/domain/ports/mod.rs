//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod drawing_command;
mod drawing_query;
mod drawing_repository;

#[cfg(test)]
pub use drawing_command::MockDrawingCommand;
pub use drawing_command::{
    CreateDrawingRequest, DeleteDrawingRequest, DrawingCommand, UpdateDrawingRequest,
};
#[cfg(test)]
pub use drawing_query::MockDrawingQuery;
pub use drawing_query::{DrawingQuery, GetDrawingRequest, ListDrawingsRequest};
#[cfg(test)]
pub use drawing_repository::MockDrawingRepository;
pub use drawing_repository::{DrawingRepository, DrawingRepositoryError};
