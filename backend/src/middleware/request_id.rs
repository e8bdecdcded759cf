//! Correlation middleware attaching a [`RequestId`] to every request.
//!
//! A well-formed inbound `X-Request-ID` is reused, otherwise a UUID v4 is
//! generated. The identifier is placed in request extensions, in task-local
//! storage for the rest of the chain, and on a `request` tracing span that
//! encloses all downstream log lines. Every response echoes it back.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::HttpMessage;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info_span};

use crate::domain::{REQUEST_ID_HEADER, RequestId};

/// The identifier already attached to `req`, or one derived from its header.
pub(crate) fn resolve_request_id(req: &ServiceRequest) -> RequestId {
    if let Some(existing) = req.extensions().get::<RequestId>().cloned() {
        return existing;
    }
    let inbound = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    RequestId::from_header_or_generate(inbound)
}

/// Correlation middleware factory.
///
/// Handlers can read the identifier via [`RequestId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use drawings::middleware::RequestIdMiddleware;
///
/// let _app = App::new().wrap(RequestIdMiddleware);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { service }))
    }
}

/// Service wrapper produced by [`RequestIdMiddleware`].
pub struct RequestIdService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = resolve_request_id(&req);
        req.extensions_mut().insert(request_id.clone());

        let span = info_span!("request", request_id = %request_id);
        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };

        let scoped_id = request_id.clone();
        Box::pin(
            RequestId::scope(scoped_id, async move {
                let mut res = fut.await?;
                match HeaderValue::from_str(request_id.as_str()) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(%error, "failed to encode request identifier header");
                    }
                }
                Ok(res)
            })
            .instrument(span),
        )
    }
}
