//! Authenticated HTTP client for the EstateHub REST API.
//!
//! Every request is decorated with a fresh `X-Request-ID`; state-changing
//! requests also mirror the CSRF cookie into `X-CSRF-Token`. A `401` on the
//! first attempt triggers one session renewal (shared by every request that
//! hits the same expiry) followed by exactly one retry.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use estatehub_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::builder(ClientConfig::from_env()?)
//!     .session_listener(|event: &SessionExpired| router.navigate(&event.login_path))
//!     .build()?;
//!
//! let me = client.auth().me().await?;
//! ```

mod config;
mod cookies;
mod renewal;
mod request;
mod traits;


use std::sync::Arc;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;

pub use config::{ClientConfig, RequestCategory, Timeouts};
pub use cookies::{CookieSource, StaticCookies};
pub use request::{ApiRequest, Attempt, is_state_changing};
pub use traits::{LogSessionExpiry, SessionExpired, SessionListener, Transport};

use self::renewal::{RenewalOutcome, RenewalSlot};
use self::traits::{BoxFuture, TransportDyn};
use crate::error::{Error, RenewalFailure};
use crate::types::RequestId;

/// Correlation header sent on every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Anti-CSRF header sent on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// EstateHub API client.
///
/// Cheap to clone; clones share the cookie store and the renewal slot, so
/// concurrent requests from any clone coalesce into one renewal.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientState>,
}

struct ClientState {
    config: ClientConfig,
    transport: Box<dyn TransportDyn>,
    cookies: Arc<dyn CookieSource>,
    listener: Arc<dyn SessionListener>,
    renewal: RenewalSlot,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    jar: Option<Arc<Jar>>,
    transport: Option<Box<dyn TransportDyn>>,
    cookies: Option<Arc<dyn CookieSource>>,
    listener: Arc<dyn SessionListener>,
}

impl ApiClientBuilder {
    /// Share an existing cookie jar (e.g. one pre-seeded from a saved session).
    #[must_use]
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Use a custom transport. Requires [`cookie_source`](Self::cookie_source)
    /// unless a [`cookie_jar`](Self::cookie_jar) is also given.
    #[must_use]
    pub fn transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    #[must_use]
    pub fn cookie_source<C: CookieSource>(mut self, cookies: C) -> Self {
        self.cookies = Some(Arc::new(cookies));
        self
    }

    #[must_use]
    pub fn session_listener<L: SessionListener>(mut self, listener: L) -> Self {
        self.listener = Arc::new(listener);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeouts are inconsistent or a custom
    /// transport has no cookie source, and [`Error::Http`] if the default
    /// transport cannot be built.
    pub fn build(self) -> Result<ApiClient, Error> {
        self.config.timeouts.validate()?;

        let (transport, cookies): (Box<dyn TransportDyn>, Arc<dyn CookieSource>) =
            match (self.transport, self.cookies, self.jar) {
                (Some(transport), Some(cookies), _) => (transport, cookies),
                (Some(transport), None, Some(jar)) => (transport, jar as Arc<dyn CookieSource>),
                (Some(_), None, None) => {
                    return Err(Error::Config(
                        "a custom transport needs a cookie source to read the CSRF cookie".into(),
                    ));
                }
                (None, cookies, jar) => {
                    let jar = jar.unwrap_or_default();
                    let http = reqwest::Client::builder()
                        .cookie_provider(Arc::clone(&jar))
                        .build()?;
                    let cookies: Arc<dyn CookieSource> = match cookies {
                        Some(cookies) => cookies,
                        None => jar,
                    };
                    (Box::new(http) as Box<dyn TransportDyn>, cookies)
                }
            };

        Ok(ApiClient {
            inner: Arc::new(ClientState {
                config: self.config,
                transport,
                cookies,
                listener: self.listener,
                renewal: RenewalSlot::default(),
            }),
        })
    }
}

impl ApiClient {
    /// Client with a fresh cookie jar and the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// See [`ApiClientBuilder::build`].
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            jar: None,
            transport: None,
            cookies: None,
            listener: Arc::new(LogSessionExpiry),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Whether a session renewal is currently in flight.
    #[must_use]
    pub fn renewal_in_flight(&self) -> bool {
        self.inner.renewal.in_flight()
    }

    /// Send a request, renewing the session once if it has expired.
    ///
    /// Cancel by dropping the returned future; a renewal it started keeps
    /// running for the other requests waiting on it.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] on network failure or timeout
    /// - [`Error::Status`] for any non-success status, including a `401` on
    ///   the retried attempt
    /// - [`Error::SessionExpired`] if the session could not be renewed
    pub async fn send(&self, request: ApiRequest) -> Result<reqwest::Response, Error> {
        let mut attempt = Attempt::Initial;
        loop {
            let response = self.inner.dispatch(&request, attempt).await?;
            let expired = response.status() == StatusCode::UNAUTHORIZED;

            if !(expired && request.renew_on_expiry && attempt.may_renew()) {
                if expired && attempt == Attempt::Retry {
                    tracing::warn!(
                        method = %request.method,
                        path = %request.path,
                        "Request rejected again after session renewal"
                    );
                }
                return ensure_success(&request, response).await;
            }

            self.join_renewal().await.map_err(Error::SessionExpired)?;
            attempt = Attempt::Retry;
        }
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus [`Error::Http`] if the body is not valid JSON for `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, Error> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request and discard the response body.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send).
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), Error> {
        self.send(request).await.map(|_| ())
    }

    /// GET `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// As [`send_json`](Self::send_json).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Renew the session now, joining a renewal already in flight.
    ///
    /// Useful at start-up to establish whether a stored session is still usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionExpired`] if the backend refuses the renewal.
    pub async fn renew_session(&self) -> Result<(), Error> {
        self.join_renewal().await.map_err(Error::SessionExpired)
    }

    async fn join_renewal(&self) -> RenewalOutcome {
        let state = Arc::clone(&self.inner);
        let (renewal, started) = self
            .inner
            .renewal
            .join_or_start(move || -> BoxFuture<'static, RenewalOutcome> {
                Box::pin(renew(state))
            });
        if !started {
            tracing::debug!("Joining session renewal already in flight");
        }
        renewal.await
    }
}

/// The shared renewal: one refresh call, then clear the slot, then notify.
async fn renew(state: Arc<ClientState>) -> RenewalOutcome {
    let outcome = state.request_renewal().await;
    state.renewal.clear();

    match &outcome {
        Ok(()) => tracing::info!("Session renewed"),
        Err(failure) => {
            tracing::warn!(failure = %failure, "Session renewal failed");
            state.listener.session_expired(&SessionExpired {
                login_path: state.config.login_path.clone(),
                failure: failure.clone(),
            });
        }
    }
    outcome
}

impl ClientState {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        attempt: Attempt,
    ) -> Result<reqwest::Response, Error> {
        let request_id = RequestId::generate();
        let http = self.build_request(request, request_id)?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            request_id = %request_id,
            attempt = attempt.as_str(),
            "Dispatching API request"
        );

        Ok(self.transport.execute_dyn(http).await?)
    }

    fn build_request(
        &self,
        request: &ApiRequest,
        request_id: RequestId,
    ) -> Result<reqwest::Request, Error> {
        let mut url = self.config.endpoint(&request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }

        let mut http = reqwest::Request::new(request.method.clone(), url);
        *http.timeout_mut() = Some(self.config.timeouts.for_category(request.category));

        if let Some(body) = &request.body {
            let content_type = HeaderValue::from_str(&body.content_type)
                .map_err(|e| Error::Config(format!("content type {:?}: {e}", body.content_type)))?;
            http.headers_mut().insert(CONTENT_TYPE, content_type);
            *http.body_mut() = Some(body.bytes.clone().into());
        }

        self.decorate(&mut http, request_id);
        Ok(http)
    }

    /// Correlation ID on everything; CSRF token, re-read now, on state-changing methods.
    fn decorate(&self, http: &mut reqwest::Request, request_id: RequestId) {
        let csrf_token = if is_state_changing(http.method()) {
            self.cookies.cookie(http.url(), &self.config.csrf_cookie_name)
        } else {
            None
        };

        let headers = http.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        if let Some(value) = csrf_token.and_then(|t| HeaderValue::from_str(&t).ok()) {
            headers.insert(CSRF_HEADER, value);
        }
    }

    async fn request_renewal(&self) -> RenewalOutcome {
        let url = self
            .config
            .endpoint(&self.config.refresh_path)
            .map_err(|e| RenewalFailure::unreachable(e.to_string()))?;

        let request_id = RequestId::generate();
        let mut http = reqwest::Request::new(Method::POST, url);
        *http.timeout_mut() = Some(self.config.timeouts.renewal);
        self.decorate(&mut http, request_id);

        tracing::info!(request_id = %request_id, "Renewing session");

        let response = self
            .transport
            .execute_dyn(http)
            .await
            .map_err(|e| RenewalFailure::unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RenewalFailure::rejected(status.as_u16(), body))
    }
}

/// Checks HTTP response status; returns the response on success or an error with details.
async fn ensure_success(
    request: &ApiRequest,
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        method: request.method.to_string(),
        path: request.path.clone(),
        status,
        body,
    })
}
