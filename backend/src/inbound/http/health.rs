//! Liveness endpoint for load balancers and uptime checks.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
        }
    }
}

/// Report that the process is serving requests. Never requires a credential
/// under the default public path set.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[get("/health")]
pub async fn health() -> web::Json<HealthResponse> {
    web::Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn reports_ok() {
        let app = actix_test::init_service(App::new().service(health)).await;
        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "ok"}));
    }
}
