//! Panic isolation for the whole middleware chain.
//!
//! Both the synchronous `call` of the inner service and every poll of the
//! future it returns run under `catch_unwind`. A panic is logged with its
//! payload, the request method and path, and a backtrace captured at the panic
//! site, then surfaced as the redacted `internal_error` so the dispatcher
//! renders it. The worker keeps serving.
//!
//! The middleware never holds an `HttpRequest` clone across the inner call:
//! the router needs sole ownership of the request to record path parameters.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::OnceLock;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Ready, poll_fn, ready};
use tracing::error;

use super::request_id::resolve_request_id;
use crate::domain::{Error, RequestId};

const REDACTED_MESSAGE: &str = "Internal server error";

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Details recorded by the panic hook on the panicking thread.
struct PanicReport {
    location: String,
    backtrace: String,
}

/// Marks the current thread as running code that `Recover` will catch.
struct RecoverGuard;

impl RecoverGuard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }

    fn active() -> bool {
        GUARD_DEPTH.try_with(Cell::get).unwrap_or(0) > 0
    }
}

impl Drop for RecoverGuard {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Install a process-wide hook that records panics raised under a
/// [`RecoverGuard`]. Other panics go to the previous hook.
fn install_panic_hook_once() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if !RecoverGuard::active() {
                previous_hook(info);
                return;
            }
            let location = info.location().map_or_else(
                || "unknown".to_owned(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
            let report = PanicReport {
                location,
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
        }));
    });
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Owned request facts kept for the panic report.
struct RequestSummary {
    request_id: RequestId,
    method: Method,
    path: String,
}

fn recovered(summary: &RequestSummary, payload: &(dyn Any + Send)) -> ActixError {
    let report = LAST_PANIC.with(|slot| slot.borrow_mut().take());
    let (location, backtrace) = report.map_or_else(
        || ("unknown".to_owned(), "unavailable".to_owned()),
        |report| (report.location, report.backtrace),
    );

    error!(
        request_id = %summary.request_id,
        method = %summary.method,
        path = %summary.path,
        panic = payload_text(payload),
        location = %location,
        backtrace = %backtrace,
        "request handler panicked"
    );

    Error::internal(REDACTED_MESSAGE)
        .with_request_id(summary.request_id.as_str())
        .into()
}

/// Panic isolation middleware factory. Wrap it last so it is outermost.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use drawings::middleware::{Recover, RequestIdMiddleware};
///
/// let _app = App::new().wrap(RequestIdMiddleware).wrap(Recover);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl<S, B> Transform<S, ServiceRequest> for Recover
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RecoverMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        install_panic_hook_once();
        ready(Ok(RecoverMiddleware { service }))
    }
}

/// Service wrapper produced by [`Recover`].
pub struct RecoverMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RecoverMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Resolved here so a panic report carries the same id the client sees.
        let request_id = resolve_request_id(&req);
        req.extensions_mut().insert(request_id.clone());
        let summary = RequestSummary {
            request_id,
            method: req.method().clone(),
            path: req.path().to_owned(),
        };

        let called = {
            let _guard = RecoverGuard::enter();
            panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req)))
        };
        match called {
            Ok(fut) => {
                let mut fut = Box::pin(fut);
                let guarded = poll_fn(move |cx| {
                    let _guard = RecoverGuard::enter();
                    fut.as_mut().poll(cx)
                });
                Box::pin(async move {
                    match AssertUnwindSafe(guarded).catch_unwind().await {
                        Ok(result) => result,
                        Err(payload) => Err(recovered(&summary, payload.as_ref())),
                    }
                })
            }
            Err(payload) => Box::pin(ready(Err(recovered(&summary, payload.as_ref())))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::dev::Service as _;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::REQUEST_ID_HEADER;
    use crate::middleware::RequestIdMiddleware;

    #[rstest]
    #[case(Box::new("static str") as Box<dyn Any + Send>, "static str")]
    #[case(Box::new(String::from("owned")) as Box<dyn Any + Send>, "owned")]
    #[case(Box::new(7_u8) as Box<dyn Any + Send>, "non-string panic payload")]
    fn payload_text_handles_common_payloads(
        #[case] payload: Box<dyn Any + Send>,
        #[case] expected: &str,
    ) {
        assert_eq!(payload_text(payload.as_ref()), expected);
    }

    fn guarded_panic() {
        let _guard = RecoverGuard::enter();
        panic!("guarded");
    }

    #[rstest]
    fn guarded_panics_record_their_location() {
        install_panic_hook_once();
        let result = panic::catch_unwind(guarded_panic);
        assert!(result.is_err());
        assert!(!RecoverGuard::active());

        let report = LAST_PANIC
            .with(|slot| slot.borrow_mut().take())
            .expect("panic report recorded");
        assert!(report.location.contains("recover.rs"), "{}", report.location);
    }

    async fn explode() -> HttpResponse {
        panic!("database password is hunter2")
    }

    async fn redacted_body(err: &ActixError) -> (StatusCode, Option<String>, Value) {
        let res = err.error_response();
        let status = res.status();
        let id = res
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = to_bytes(res.into_body()).await.expect("body bytes");
        let body = serde_json::from_slice(&bytes).expect("JSON body");
        (status, id, body)
    }

    #[actix_web::test]
    async fn routed_requests_pass_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .wrap(Recover)
                .route(
                    "/items/{id}",
                    web::get().to(|path: web::Path<String>| async move {
                        HttpResponse::Ok().body(path.into_inner())
                    }),
                ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/items/42").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(actix_test::read_body(res).await.as_ref(), b"42");
    }

    #[actix_web::test]
    async fn handler_panics_become_redacted_internal_errors() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .wrap(Recover)
                .route("/boom", web::get().to(explode))
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/boom")
            .insert_header((REQUEST_ID_HEADER, "panic-1"))
            .to_request();
        let err = actix_test::try_call_service(&app, req)
            .await
            .expect_err("panic surfaces as an error");
        let (status, id, body) = redacted_body(&err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(id.as_deref(), Some("panic-1"));
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], REDACTED_MESSAGE);
        assert!(!body.to_string().contains("hunter2"));

        let req = actix_test::TestRequest::get().uri("/ok").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn synchronous_middleware_panics_are_caught() {
        let app = actix_test::init_service(
            App::new()
                .wrap_fn(|req, srv| {
                    if req.path() == "/sync" {
                        panic!("middleware failed");
                    }
                    srv.call(req)
                })
                .wrap(RequestIdMiddleware)
                .wrap(Recover)
                .route("/sync", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/sync")
            .insert_header((REQUEST_ID_HEADER, "sync-1"))
            .to_request();
        let err = actix_test::try_call_service(&app, req)
            .await
            .expect_err("panic surfaces as an error");
        let (status, id, body) = redacted_body(&err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(id.as_deref(), Some("sync-1"));
        assert_eq!(body["error"], "internal_error");
    }
}
