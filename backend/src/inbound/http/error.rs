//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Every error rendered here is logged once with its status and
//! classified message; `internal_error` bodies are replaced with a generic
//! message before they leave the process.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, info};

use crate::domain::{Error, ErrorCode, REQUEST_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest
        | ErrorCode::EmptyName
        | ErrorCode::NameTooLong
        | ErrorCode::InvalidData
        | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(REDACTED_MESSAGE);
        if let Some(id) = error.request_id() {
            redacted = redacted.with_request_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

fn log_boundary_error(error: &Error, status: StatusCode) {
    let request_id = error.request_id().unwrap_or("-");
    if status.is_server_error() {
        error!(
            status = status.as_u16(),
            code = ?error.code(),
            cause = error.message(),
            request_id,
            "request failed"
        );
    } else {
        info!(
            status = status.as_u16(),
            code = ?error.code(),
            message = error.message(),
            request_id,
            "request rejected"
        );
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        log_boundary_error(self, status);

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.request_id() {
            builder.insert_header((REQUEST_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}
