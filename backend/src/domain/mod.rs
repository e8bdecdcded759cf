//! Domain primitives, aggregates and application services.
//!
//! Purpose: define the drawing aggregate, its validation rules, the error
//! taxonomy shared by every adapter, and the service that expresses the
//! drawing lifecycle against the persistence port.
//!
//! Public surface:
//! - Drawing, DrawingId, DrawingView: aggregate, identity and projection.
//! - DrawingService: implements the driving ports in `ports`.
//! - Error, ErrorCode: transport-agnostic failure taxonomy.
//! - RequestId: task-local request correlation identifier.
//! - AccessKey, AuthFailure: shared-secret authentication primitives.

pub mod access_key;
pub mod drawing;
pub mod drawing_service;
pub mod error;
pub mod ports;
pub mod request_id;

pub use self::access_key::{AccessKey, AccessKeyError, AuthFailure};
pub use self::drawing::{
    Drawing, DrawingId, DrawingRecord, DrawingValidationError, DrawingView, MAX_NAME_LENGTH,
    validate_data, validate_name,
};
pub use self::drawing_service::DrawingService;
pub use self::error::{Error, ErrorBody, ErrorCode, ErrorValidationError};
pub use self::request_id::{REQUEST_ID_HEADER, RequestId};
