//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{StartupError, build_http_state, in_memory_state};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::validate_access_key;
use crate::inbound::http::drawings::{
    DEFAULT_MAX_BODY_BYTES, create_drawing, delete_drawing, get_drawing, json_config,
    list_drawings, update_drawing,
};
use crate::inbound::http::health::health;
use crate::inbound::http::state::HttpState;
use crate::middleware::{
    AccessLog, Auth, AuthConfig, Cors, CorsConfig, Recover, RequestIdMiddleware,
};

async fn route_not_found() -> ApiResult<()> {
    Err(Error::not_found("Route not found"))
}

/// Assemble the application: routes, extractor configuration and the
/// middleware chain.
///
/// Outermost first the chain is panic isolation, request correlation, access
/// log, CORS and authentication, so preflights are answered before any
/// credential check and every response, including a recovered panic, carries
/// `X-Request-ID`.
///
/// # Examples
/// ```
/// use actix_web::test;
/// use drawings::middleware::{AuthConfig, CorsConfig};
/// use drawings::server::{build_app, in_memory_state};
///
/// # actix_web::rt::System::new().block_on(async {
/// let app = test::init_service(build_app(
///     in_memory_state(),
///     CorsConfig::default(),
///     AuthConfig::disabled(),
/// ))
/// .await;
/// let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
/// assert!(res.status().is_success());
/// # });
/// ```
pub fn build_app(
    state: HttpState,
    cors: CorsConfig,
    auth: AuthConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    build_app_with_body_limit(state, cors, auth, DEFAULT_MAX_BODY_BYTES)
}

/// [`build_app`] with an explicit cap on JSON request bodies.
pub fn build_app_with_body_limit(
    state: HttpState,
    cors: CorsConfig,
    auth: AuthConfig,
    max_body_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config(max_body_bytes))
        .wrap(Auth::new(auth))
        .wrap(Cors::new(cors))
        .wrap(AccessLog)
        .wrap(RequestIdMiddleware)
        .wrap(Recover)
        .service(health)
        .service(validate_access_key)
        .service(create_drawing)
        .service(list_drawings)
        .service(get_drawing)
        .service(update_drawing)
        .service(delete_drawing)
        .default_service(web::to(route_not_found));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server for `state` using `config`.
///
/// Actix installs SIGINT/SIGTERM handlers: on a signal the listener stops
/// accepting connections and in-flight requests get the configured shutdown
/// timeout to finish.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(state: HttpState, config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        shutdown_timeout,
        workers,
        max_body_bytes,
        cors,
        auth,
    } = config;
    info!(
        %bind_addr,
        auth_enabled = auth.is_enabled(),
        origins = ?cors.allowed_origins(),
        "starting HTTP server"
    );

    let server = HttpServer::new(move || {
        build_app_with_body_limit(state.clone(), cors.clone(), auth.clone(), max_body_bytes)
    })
    .shutdown_timeout(shutdown_timeout.as_secs());
    let server = match workers {
        Some(workers) => server.workers(workers),
        None => server,
    };

    Ok(server.bind(bind_addr)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    use crate::domain::{AccessKey, REQUEST_ID_HEADER};

    #[actix_web::test]
    async fn routed_requests_reach_their_handlers() {
        let app = actix_test::init_service(build_app(
            in_memory_state(),
            CorsConfig::default(),
            AuthConfig::disabled(),
        ))
        .await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = actix_test::TestRequest::post()
            .uri("/drawings")
            .set_json(json!({"name": "A", "data": {"elements": []}}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        let path = format!("/drawings/{}", created["id"].as_str().expect("id"));

        let req = actix_test::TestRequest::get().uri(&path).to_request();
        let fetched: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        let req = actix_test::TestRequest::put()
            .uri(&path)
            .set_json(json!({"name": "B", "data": null}))
            .to_request();
        let updated: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["name"], "B");
        assert_eq!(updated["data"], created["data"]);

        let req = actix_test::TestRequest::delete().uri(&path).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let req = actix_test::TestRequest::get().uri(&path).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_routes_return_json_not_found_with_request_id() {
        let app = actix_test::init_service(build_app(
            in_memory_state(),
            CorsConfig::default(),
            AuthConfig::disabled(),
        ))
        .await;

        let req = actix_test::TestRequest::get().uri("/nope").to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "not_found");
    }

    #[rstest]
    #[case("/health", StatusCode::OK)]
    #[case("/drawings", StatusCode::UNAUTHORIZED)]
    #[case("/auth/validate", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn auth_guards_everything_but_public_paths(
        #[case] path: &str,
        #[case] status: StatusCode,
    ) {
        let key = AccessKey::new("s3cret".to_owned()).expect("non-empty key");
        let app = actix_test::init_service(build_app(
            in_memory_state(),
            CorsConfig::default(),
            AuthConfig::enabled(key),
        ))
        .await;

        let req = actix_test::TestRequest::get().uri(path).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), status);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[actix_web::test]
    async fn preflight_is_answered_before_authentication() {
        let key = AccessKey::new("s3cret".to_owned()).expect("non-empty key");
        let app = actix_test::init_service(build_app(
            in_memory_state(),
            CorsConfig::default(),
            AuthConfig::enabled(key),
        ))
        .await;

        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/drawings")
            .insert_header(("Origin", "http://localhost:5173"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("http://localhost:5173")
        );
    }

    #[rstest]
    fn server_config_defaults() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("valid address");
        let config = ServerConfig::new(addr);
        assert_eq!(config.bind_addr(), addr);
        assert_eq!(config.shutdown_timeout.as_secs(), 10);
        assert_eq!(config.workers, None);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(!config.auth.is_enabled());
    }
}
