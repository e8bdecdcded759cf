//! Bearer access-key gate.
//!
//! Requests to a public path, and every request while authentication is
//! disabled, pass straight through. Otherwise the `Authorization` header must
//! carry `Bearer <key>` matching the configured [`AccessKey`]. Each failure is
//! answered with 401 and a distinct [`AuthFailure`] code.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error as ActixError, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{AccessKey, AuthFailure, Error};

const BEARER_PREFIX: &[u8] = b"Bearer ";

/// Paths that never require a credential unless configured otherwise.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/health"];

/// Whether requests must present the access key.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Every request passes.
    Disabled,
    /// Non-public requests must present this key.
    Enabled(AccessKey),
}

/// Immutable authentication policy.
///
/// # Examples
/// ```
/// use drawings::domain::AccessKey;
/// use drawings::middleware::AuthConfig;
///
/// let key = AccessKey::new("s3cret".to_owned()).expect("non-empty key");
/// let config = AuthConfig::enabled(key);
/// assert!(config.is_public("/health"));
/// assert!(!config.is_public("/health/extra"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    mode: AuthMode,
    public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl AuthConfig {
    /// Authentication turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(AuthMode::Disabled)
    }

    /// Authentication required for non-public paths.
    #[must_use]
    pub fn enabled(key: AccessKey) -> Self {
        Self::new(AuthMode::Enabled(key))
    }

    fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            public_paths: DEFAULT_PUBLIC_PATHS
                .iter()
                .map(|path| (*path).to_owned())
                .collect(),
        }
    }

    /// Replace the public path set. Matching is exact.
    #[must_use]
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.mode, AuthMode::Enabled(_))
    }

    /// Whether `path` bypasses authentication.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| public == path)
    }

    /// Decide whether a request may proceed.
    ///
    /// `authorization` holds the raw header bytes, `None` when absent. Bytes
    /// outside visible ASCII are compared as they are.
    ///
    /// # Errors
    /// Returns the [`AuthFailure`] describing why the request is rejected.
    pub fn check(&self, path: &str, authorization: Option<&[u8]>) -> Result<(), AuthFailure> {
        let AuthMode::Enabled(key) = &self.mode else {
            return Ok(());
        };
        if self.is_public(path) {
            return Ok(());
        }
        let header = authorization
            .filter(|value| !value.is_empty())
            .ok_or(AuthFailure::AuthRequired)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthFailure::InvalidAuthFormat)?;
        if key.verify(token) {
            Ok(())
        } else {
            Err(AuthFailure::InvalidAccessKey)
        }
    }
}

/// Authentication middleware factory.
#[derive(Clone)]
pub struct Auth {
    config: Arc<AuthConfig>,
}

impl Auth {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Auth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = AuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service: Rc::new(service),
            config: Arc::clone(&self.config),
        }))
    }
}

/// Service wrapper produced by [`Auth`].
pub struct AuthMiddleware<S> {
    service: Rc<S>,
    config: Arc<AuthConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.as_bytes());

        match self.config.check(req.path(), authorization) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(reason) => {
                debug!(path = %req.path(), code = ?reason, "rejecting unauthenticated request");
                let response = Error::unauthorized(reason).error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}
