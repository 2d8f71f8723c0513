use std::future::Future;
use std::pin::Pin;

use crate::error::RenewalFailure;

/// HTTP transport the client sends fully decorated requests through.
///
/// Implemented for [`reqwest::Client`]. Wrap it to add metrics, fault
/// injection in tests, or a different connection pool.
///
/// # Example
///
/// ```rust,ignore
/// struct Counting { inner: reqwest::Client, sent: AtomicUsize }
///
/// impl Transport for Counting {
///     fn execute(
///         &self,
///         request: reqwest::Request,
///     ) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
///         self.sent.fetch_add(1, Ordering::SeqCst);
///         self.inner.execute(request)
///     }
/// }
/// ```
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: reqwest::Request,
    ) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send;
}

impl Transport for reqwest::Client {
    fn execute(
        &self,
        request: reqwest::Request,
    ) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
        reqwest::Client::execute(self, request)
    }
}

/// Notified when the session cannot be renewed and the user must sign in again.
///
/// Fired once per failed renewal, however many requests were waiting on it.
/// The hosting application decides what "go to sign-in" means: a route
/// change, a redirect response, a CLI prompt.
pub trait SessionListener: Send + Sync + 'static {
    fn session_expired(&self, event: &SessionExpired);
}

/// Payload of [`SessionListener::session_expired`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct SessionExpired {
    /// Configured sign-in route (e.g. `/login`).
    pub login_path: String,
    pub failure: RenewalFailure,
}

/// Default listener: logs the expiry and leaves navigation to the caller's error handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSessionExpiry;

impl SessionListener for LogSessionExpiry {
    fn session_expired(&self, event: &SessionExpired) {
        tracing::warn!(
            login_path = %event.login_path,
            failure = %event.failure,
            "Session expired, sign-in required"
        );
    }
}

impl<F> SessionListener for F
where
    F: Fn(&SessionExpired) + Send + Sync + 'static,
{
    fn session_expired(&self, event: &SessionExpired) {
        self(event);
    }
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe wrapper for Transport (needed for the shared renewal future).
pub(crate) trait TransportDyn: Send + Sync {
    fn execute_dyn(
        &self,
        request: reqwest::Request,
    ) -> BoxFuture<'_, Result<reqwest::Response, reqwest::Error>>;
}

impl<T: Transport> TransportDyn for T {
    fn execute_dyn(
        &self,
        request: reqwest::Request,
    ) -> BoxFuture<'_, Result<reqwest::Response, reqwest::Error>> {
        Box::pin(self.execute(request))
    }
}
