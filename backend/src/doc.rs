//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every handler in the inbound HTTP layer (drawings, health,
//!   auth probe)
//! - **Schemas**: request and response bodies, including the shared error
//!   envelope [`ErrorBody`]
//! - **Security**: bearer access key scheme
//!
//! The generated document is served by Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AuthFailure, DrawingView, ErrorBody, ErrorCode};
use crate::inbound::http::auth::AuthValidationResponse;
use crate::inbound::http::drawings::{DrawingListResponse, DrawingRequest};
use crate::inbound::http::health::HealthResponse;

/// Enrich the generated document with the bearer access key scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessKey",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Drawings API",
        description = "Create, list, fetch, update and delete drawing documents."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessKey" = [])),
    paths(
        crate::inbound::http::drawings::create_drawing,
        crate::inbound::http::drawings::list_drawings,
        crate::inbound::http::drawings::get_drawing,
        crate::inbound::http::drawings::update_drawing,
        crate::inbound::http::drawings::delete_drawing,
        crate::inbound::http::health::health,
        crate::inbound::http::auth::validate_access_key,
    ),
    components(schemas(
        DrawingView,
        DrawingRequest,
        DrawingListResponse,
        ErrorBody,
        ErrorCode,
        AuthFailure,
        HealthResponse,
        AuthValidationResponse
    )),
    tags(
        (name = "drawings", description = "Drawing document storage"),
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Access key validation")
    )
)]
pub struct ApiDoc;
