//! One structured log line per completed request.
//!
//! The line is written after the inner service resolves, so it reports the
//! final status even when a handler relied on the implicit 200 or when an
//! inner stage produced an error instead of a response.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::info;

/// Access log middleware factory.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogMiddleware { service }))
    }
}

/// Service wrapper produced by [`AccessLog`].
pub struct AccessLogMiddleware<S> {
    service: S,
}

/// Request attributes captured before the request is handed downstream.
struct AccessEntry {
    method: String,
    path: String,
    remote_addr: String,
    started: Instant,
}

impl AccessEntry {
    fn finish(&self, status: StatusCode) {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            duration_ms,
            remote_addr = %self.remote_addr,
            "request completed"
        );
    }
}

impl<S, B> Service<ServiceRequest> for AccessLogMiddleware<S>
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
        let entry = AccessEntry {
            method: req.method().to_string(),
            path: req.path().to_owned(),
            remote_addr: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("-")
                .to_owned(),
            started: Instant::now(),
        };
        let fut = self.service.call(req);
        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            entry.finish(status);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::Error as DomainError;

    /// Shared buffer receiving formatted log lines.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn completed_lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().expect("capture lock").clone();
            String::from_utf8(bytes)
                .expect("utf-8 log output")
                .lines()
                .filter_map(|line| serde_json::from_str::<Value>(line).ok())
                .filter(|event| event["fields"]["message"] == "request completed")
                .collect()
        }
    }

    async fn explicit_created() -> HttpResponse {
        HttpResponse::Created().finish()
    }

    async fn missing() -> Result<HttpResponse, DomainError> {
        Err(DomainError::not_found("gone"))
    }

    #[rstest]
    #[case("/implicit", 200)]
    #[case("/created", 201)]
    #[case("/missing", 404)]
    #[actix_web::test]
    async fn logs_the_final_status(#[case] path: &str, #[case] status: u16) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let app = actix_test::init_service(
            App::new()
                .wrap(AccessLog)
                .route("/implicit", web::get().to(|| async { "implicit ok" }))
                .route("/created", web::get().to(explicit_created))
                .route("/missing", web::get().to(missing)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri(path).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), status);

        let lines = captured.completed_lines();
        assert_eq!(lines.len(), 1, "one access line per request");
        let fields = &lines[0]["fields"];
        assert_eq!(fields["status"], status);
        assert_eq!(fields["method"], "GET");
        assert_eq!(fields["path"], path);
        assert!(fields["duration_ms"].is_u64());
    }
}
