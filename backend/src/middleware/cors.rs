//! CORS headers and preflight short-circuit.
//!
//! Allowed methods, allowed headers and max-age are attached to every
//! response. `Access-Control-Allow-Origin` echoes the request `Origin` only
//! when the allow-list names it or contains `*`. An `OPTIONS` request is
//! answered here with 204 and never reaches the routed handlers.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, HeaderMap, HeaderValue, ORIGIN,
};
use actix_web::http::Method;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

/// Default origin allow-list.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173"];
/// Default allowed methods.
pub const DEFAULT_ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "OPTIONS"];
/// Default allowed request headers.
pub const DEFAULT_ALLOWED_HEADERS: &[&str] = &["Content-Type", "Authorization"];
/// Default preflight cache lifetime in seconds.
pub const DEFAULT_MAX_AGE_SECS: u32 = 3600;

const WILDCARD: &str = "*";

/// Immutable CORS policy.
///
/// # Examples
/// ```
/// use drawings::middleware::CorsConfig;
///
/// let config = CorsConfig::default().with_allowed_origins(["https://app.example"]);
/// assert!(config.allows_origin("https://app.example"));
/// assert!(!config.allows_origin("https://evil.example"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
    max_age_secs: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: owned(DEFAULT_ALLOWED_ORIGINS),
            allowed_methods: owned(DEFAULT_ALLOWED_METHODS),
            allowed_headers: owned(DEFAULT_ALLOWED_HEADERS),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

impl CorsConfig {
    #[must_use]
    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_age_secs(mut self, max_age_secs: u32) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    pub fn max_age_secs(&self) -> u32 {
        self.max_age_secs
    }

    /// Whether `origin` may be echoed back.
    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == WILDCARD || allowed == origin)
    }
}

/// Header values rendered once per worker.
struct CorsHeaders {
    config: Arc<CorsConfig>,
    methods: Option<HeaderValue>,
    headers: Option<HeaderValue>,
    max_age: HeaderValue,
}

impl CorsHeaders {
    fn new(config: Arc<CorsConfig>) -> Self {
        let methods = joined(config.allowed_methods(), "allowed methods");
        let headers = joined(config.allowed_headers(), "allowed headers");
        let max_age = HeaderValue::from(config.max_age_secs());
        Self {
            config,
            methods,
            headers,
            max_age,
        }
    }

    fn apply(&self, origin: Option<&HeaderValue>, target: &mut HeaderMap) {
        let echoed = origin.filter(|value| {
            value
                .to_str()
                .is_ok_and(|origin| self.config.allows_origin(origin))
        });
        if let Some(origin) = echoed {
            target.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        if let Some(methods) = &self.methods {
            target.insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }
        if let Some(headers) = &self.headers {
            target.insert(ACCESS_CONTROL_ALLOW_HEADERS, headers.clone());
        }
        target.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
    }
}

fn joined(values: &[String], label: &'static str) -> Option<HeaderValue> {
    match HeaderValue::from_str(&values.join(", ")) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%error, list = label, "CORS list is not a valid header value; omitting");
            None
        }
    }
}

/// CORS middleware factory.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use drawings::middleware::{Cors, CorsConfig};
///
/// let _app = App::new().wrap(Cors::new(CorsConfig::default()));
/// ```
#[derive(Clone)]
pub struct Cors {
    config: Arc<CorsConfig>,
}

impl Cors {
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            headers: Rc::new(CorsHeaders::new(Arc::clone(&self.config))),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: S,
    headers: Rc<CorsHeaders>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req.headers().get(ORIGIN).cloned();
        let headers = Rc::clone(&self.headers);

        if req.method() == Method::OPTIONS {
            debug!(path = %req.path(), "answering CORS preflight");
            let mut response = HttpResponse::NoContent().finish();
            headers.apply(origin.as_ref(), response.headers_mut());
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(ready(Ok(res)));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            headers.apply(origin.as_ref(), res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
