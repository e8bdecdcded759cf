//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] to a status and renders the payload as the response body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{AuthFailure, RequestId};

/// Stable machine-readable error code describing the failure category.
///
/// Serialised on the wire as the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed identifier, missing path parameter or unreadable body.
    InvalidRequest,
    /// Drawing name is blank after trimming.
    EmptyName,
    /// Drawing name exceeds the maximum length.
    NameTooLong,
    /// Drawing document is absent or not a JSON object.
    InvalidData,
    /// One or more request fields failed validation; see `details`.
    ValidationError,
    /// Credential missing, malformed or incorrect.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// Anything unclassified, including persistence failures.
    InternalError,
}

/// Error payload returned by services and rendered by inbound adapters.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// The request identifier is captured from [`RequestId::current`] at
/// construction and travels as a response header, not in the body.
///
/// # Examples
/// ```
/// use drawings::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "Drawing not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorBody", into = "ErrorBody")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    reason: Option<AuthFailure>,
    request_id: Option<String>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// Only call with literal or formatted messages known to be non-empty.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
            reason: None,
            request_id: RequestId::current().map(|id| id.to_string()),
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Authentication failure reason, if any.
    pub fn reason(&self) -> Option<AuthFailure> {
        self.reason
    }

    /// Correlation identifier captured when the error was created.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use drawings::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::validation(json!({ "name": "name cannot be empty" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a correlation identifier explicitly.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::ValidationError`] carrying a `{field: reason}` map.
    pub fn validation(details: Value) -> Self {
        Self::new(ErrorCode::ValidationError, "Invalid request data").with_details(details)
    }

    /// [`ErrorCode::Unauthorized`] tagged with the failure reason.
    pub fn unauthorized(reason: AuthFailure) -> Self {
        let mut error = Self::new(ErrorCode::Unauthorized, reason.message());
        error.reason = Some(reason);
        error
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape of [`Error`]: `{error, message, details?, code?}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "not_found")]
    error: ErrorCode,
    #[schema(example = "Drawing not found")]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<AuthFailure>,
}

impl From<Error> for ErrorBody {
    fn from(value: Error) -> Self {
        Self {
            error: value.code,
            message: value.message,
            details: value.details,
            code: value.reason,
        }
    }
}

impl TryFrom<ErrorBody> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorBody) -> Result<Self, Self::Error> {
        let ErrorBody {
            error,
            message,
            details,
            code,
        } = value;
        let mut out = Error::try_new(error, message)?;
        out.details = details;
        out.reason = code;
        out.request_id = None;
        Ok(out)
    }
}
