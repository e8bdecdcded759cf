//! Request-scoped correlation identifier.
//!
//! `RequestId` follows a request through the system. It lives in task-local
//! storage so the service and persistence layers can tag log lines and errors
//! without threading the value through every call.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`RequestId::scope`] when spawning new tasks or moving work onto blocking
//! threads.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Header carrying the correlation identifier on requests and responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound identifier accepted verbatim.
pub const REQUEST_ID_MAX_LEN: usize = 128;

task_local! {
    static REQUEST_ID: RequestId;
}

/// Per-request correlation identifier exposed via task-local storage.
///
/// ## Invariants
/// - 1 to [`REQUEST_ID_MAX_LEN`] characters.
/// - Only ASCII alphanumerics and `-`, `_`, `.`, `:`, so the value is always a
///   valid header value and safe to echo into logs.
///
/// # Examples
/// ```
/// use drawings::RequestId;
///
/// async fn handler() {
///     if let Some(id) = RequestId::current() {
///         println!("request id: {id}");
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept an inbound header value when it is well-formed.
    ///
    /// # Examples
    /// ```
    /// use drawings::RequestId;
    ///
    /// assert!(RequestId::parse("abc-123").is_some());
    /// assert!(RequestId::parse("has space").is_none());
    /// assert!(RequestId::parse("").is_none());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = !value.is_empty()
            && value.len() <= REQUEST_ID_MAX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'));
        well_formed.then(|| Self(value.to_owned()))
    }

    /// Reuse the inbound value when well-formed, otherwise generate one.
    #[must_use]
    pub fn from_header_or_generate(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_else(Self::generate)
    }

    /// Returns the current identifier if one is in scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_ID.try_with(Clone::clone).ok()
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Execute the provided future with the supplied identifier in scope.
    ///
    /// # Examples
    /// ```
    /// use drawings::RequestId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id = RequestId::parse("req-1").expect("well-formed");
    /// let observed = RequestId::scope(id.clone(), async { RequestId::current() }).await;
    /// assert_eq!(observed, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(request_id: RequestId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_ID.scope(request_id, fut).await
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
