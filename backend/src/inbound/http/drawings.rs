//! Drawing HTTP handlers.
//!
//! ```text
//! POST   /drawings
//! GET    /drawings?limit&offset
//! GET    /drawings/{id}
//! PUT    /drawings/{id}
//! DELETE /drawings/{id}
//! ```
//!
//! The `{id}` segment is captured verbatim, including the empty string, and
//! handed to the service, which owns identifier validation.

use actix_web::{HttpRequest, HttpResponse, delete, error::JsonPayloadError, get, post, put, web};
use pagination::{Page, PageWindow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreateDrawingRequest, DeleteDrawingRequest, GetDrawingRequest, ListDrawingsRequest,
    UpdateDrawingRequest,
};
use crate::domain::{DrawingView, Error, ErrorBody};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{validate_create, validate_update};

/// Request payload for creating or updating a drawing.
///
/// On update an empty `name` or a missing/null `data` keeps the stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DrawingRequest {
    #[schema(example = "Floor plan")]
    pub name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// Query string for listing drawings. Unparseable values fall back to the
/// defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDrawingsQuery {
    /// Page size; defaults to 10 when absent or not positive.
    pub limit: Option<String>,
    /// Rows to skip; defaults to 0 when absent or negative.
    pub offset: Option<String>,
}

/// Paginated list of drawings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrawingListResponse {
    pub drawings: Vec<DrawingView>,
    /// Size of the whole collection, counted independently of the page.
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
}

impl From<Page<DrawingView>> for DrawingListResponse {
    fn from(page: Page<DrawingView>) -> Self {
        let window = page.window();
        let total = page.total();
        Self {
            drawings: page.into_items(),
            total,
            limit: window.limit(),
            offset: window.offset(),
        }
    }
}

/// Default cap on JSON request bodies. Documents routinely embed images, so
/// this sits far above the extractor's 2 MiB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// JSON extractor configuration accepting bodies up to `limit` bytes and
/// turning unreadable or oversized bodies into `invalid_request` responses.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            debug!(error = %err, "rejecting unreadable JSON body");
            match err {
                JsonPayloadError::Overflow { limit }
                | JsonPayloadError::OverflowKnownLength { limit, .. } => {
                    Error::invalid_request(format!("request body exceeds the {limit} byte limit"))
                        .into()
                }
                _ => Error::invalid_request("invalid JSON format").into(),
            }
        })
}

/// Create a drawing.
#[utoipa::path(
    post,
    path = "/drawings",
    request_body = DrawingRequest,
    responses(
        (status = 201, description = "Drawing created", body = DrawingView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["drawings"],
    operation_id = "createDrawing"
)]
#[post("/drawings")]
pub async fn create_drawing(
    state: web::Data<HttpState>,
    payload: web::Json<DrawingRequest>,
) -> ApiResult<HttpResponse> {
    let DrawingRequest { name, data } = payload.into_inner();
    validate_create(name.as_deref(), data.as_ref())?;

    let view = state
        .drawings
        .create(CreateDrawingRequest {
            name: name.unwrap_or_default(),
            data: data.unwrap_or_default(),
        })
        .await?;
    Ok(HttpResponse::Created().json(view))
}

/// List drawings, newest first.
#[utoipa::path(
    get,
    path = "/drawings",
    params(ListDrawingsQuery),
    responses(
        (status = 200, description = "Page of drawings", body = DrawingListResponse),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["drawings"],
    operation_id = "listDrawings"
)]
#[get("/drawings")]
pub async fn list_drawings(
    state: web::Data<HttpState>,
    query: web::Query<ListDrawingsQuery>,
) -> ApiResult<web::Json<DrawingListResponse>> {
    let window = PageWindow::from_query(query.limit.as_deref(), query.offset.as_deref());
    let page = state
        .drawings_query
        .list(ListDrawingsRequest {
            limit: Some(window.limit()),
            offset: Some(window.offset()),
        })
        .await?;
    Ok(web::Json(DrawingListResponse::from(page)))
}

/// Fetch one drawing.
#[utoipa::path(
    get,
    path = "/drawings/{id}",
    params(("id" = String, Path, description = "Drawing identifier (UUID)")),
    responses(
        (status = 200, description = "Drawing", body = DrawingView),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Drawing not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["drawings"],
    operation_id = "getDrawing"
)]
#[get("/drawings/{id:[^/]*}")]
pub async fn get_drawing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DrawingView>> {
    let view = state
        .drawings_query
        .get(GetDrawingRequest {
            id: path.into_inner(),
        })
        .await?;
    Ok(web::Json(view))
}

/// Partially update a drawing.
#[utoipa::path(
    put,
    path = "/drawings/{id}",
    params(("id" = String, Path, description = "Drawing identifier (UUID)")),
    request_body = DrawingRequest,
    responses(
        (status = 200, description = "Updated drawing", body = DrawingView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Drawing not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["drawings"],
    operation_id = "updateDrawing"
)]
#[put("/drawings/{id:[^/]*}")]
pub async fn update_drawing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DrawingRequest>,
) -> ApiResult<web::Json<DrawingView>> {
    let DrawingRequest { name, data } = payload.into_inner();
    validate_update(name.as_deref())?;

    let view = state
        .drawings
        .update(UpdateDrawingRequest {
            id: path.into_inner(),
            name: name.unwrap_or_default(),
            data: data.filter(|value| !value.is_null()),
        })
        .await?;
    Ok(web::Json(view))
}

/// Delete a drawing.
#[utoipa::path(
    delete,
    path = "/drawings/{id}",
    params(("id" = String, Path, description = "Drawing identifier (UUID)")),
    responses(
        (status = 204, description = "Drawing deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Drawing not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["drawings"],
    operation_id = "deleteDrawing"
)]
#[delete("/drawings/{id:[^/]*}")]
pub async fn delete_drawing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .drawings
        .delete(DeleteDrawingRequest {
            id: path.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "drawings_tests.rs"]
mod tests;
