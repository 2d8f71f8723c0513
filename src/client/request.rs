use reqwest::Method;
use serde::Serialize;

use super::config::RequestCategory;
use crate::error::Error;

/// Which attempt of a logical request is being sent.
///
/// Travels alongside the request instead of being stored on it, so two
/// concurrent retries never share a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    /// Re-sent once after a successful session renewal. Never renews again.
    Retry,
}

impl Attempt {
    #[must_use]
    pub fn may_renew(self) -> bool {
        matches!(self, Self::Initial)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Retry => "retry",
        }
    }
}

/// True for methods with create/update/delete semantics.
#[must_use]
pub fn is_state_changing(method: &Method) -> bool {
    ![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method)
}

#[derive(Debug, Clone)]
pub(crate) struct RequestBody {
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// A logical API request, rebuilt into a transport request for each attempt.
///
/// ```rust,ignore
/// let request = ApiRequest::patch(format!("leads/{id}"))
///     .json(&serde_json::json!({ "status": "contacted" }))?;
/// let response = client.send(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) category: RequestCategory,
    pub(crate) renew_on_expiry: bool,
}

impl ApiRequest {
    /// `path` is relative to the API base URL.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            category: RequestCategory::Interactive,
            renew_on_expiry: true,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(RequestBody {
            content_type: "application/json".into(),
            bytes: serde_json::to_vec(body)?,
        });
        Ok(self)
    }

    /// Raw request body with an explicit content type.
    #[must_use]
    pub fn bytes(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody {
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    #[must_use]
    pub fn category(mut self, category: RequestCategory) -> Self {
        self.category = category;
        self
    }

    /// Surface a 401 directly instead of renewing the session.
    ///
    /// For endpoints where 401 means "wrong credentials", not "session expired".
    #[must_use]
    pub fn without_session_renewal(mut self) -> Self {
        self.renew_on_expiry = false;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn request_category(&self) -> RequestCategory {
        self.category
    }
}
