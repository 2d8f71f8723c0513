use std::fmt;

/// Why a session renewal did not succeed.
///
/// Shared by every request that was waiting on the same renewal, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RenewalFailure {
    /// HTTP status returned by the renewal endpoint, if it answered at all.
    pub status: Option<u16>,
    pub detail: String,
}

impl RenewalFailure {
    pub(crate) fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub(crate) fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for RenewalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "renewal rejected with status {status}: {}", self.detail),
            None => write!(f, "renewal request failed: {}", self.detail),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} failed with status {status}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// The session expired and could not be renewed; the user must sign in again.
    #[error("Session expired: {0}")]
    SessionExpired(RenewalFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid lead status: {0}")]
    InvalidLeadStatus(String),
}

impl Error {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired(failure) => failure.status,
            #[cfg(feature = "client")]
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// True when the transport gave up waiting on the backend.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            #[cfg(feature = "client")]
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_exposes_code() {
        let err = Error::Status {
            method: "GET".into(),
            path: "leads".into(),
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_session_expired());
        assert_eq!(err.to_string(), "GET leads failed with status 404");
    }

    #[test]
    fn test_session_expired_display() {
        let err = Error::SessionExpired(RenewalFailure::rejected(401, "refresh token revoked"));
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "Session expired: renewal rejected with status 401: refresh token revoked"
        );
    }

    #[test]
    fn test_unreachable_renewal_has_no_status() {
        let failure = RenewalFailure::unreachable("connection refused");
        assert_eq!(failure.status, None);
        assert_eq!(failure.to_string(), "renewal request failed: connection refused");
    }
}
