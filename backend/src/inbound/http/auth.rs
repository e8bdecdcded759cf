//! Credential probe for clients.
//!
//! The handler itself performs no check: it is reachable only when the
//! authentication middleware admitted the request, so a 200 confirms the
//! presented access key.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ErrorBody;

/// Body returned by `GET /auth/validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthValidationResponse {
    pub authenticated: bool,
}

/// Confirm that the presented access key is accepted.
#[utoipa::path(
    get,
    path = "/auth/validate",
    tags = ["auth"],
    responses(
        (status = 200, description = "Credential accepted", body = AuthValidationResponse),
        (status = 401, description = "Credential missing or rejected", body = ErrorBody)
    ),
    operation_id = "validateAccessKey"
)]
#[get("/auth/validate")]
pub async fn validate_access_key() -> web::Json<AuthValidationResponse> {
    web::Json(AuthValidationResponse {
        authenticated: true,
    })
}
