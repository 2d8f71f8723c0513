use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Timeout class of a request.
///
/// Each category has its own ceiling in [`Timeouts`]; the category is chosen
/// per request, not per endpoint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestCategory {
    /// Ordinary dashboard calls.
    #[default]
    Interactive,
    /// Long-running AI content generation.
    Generation,
    /// Kicking off a background job (MLS sync, campaign send).
    Queue,
    /// File and photo uploads.
    Upload,
}

/// Per-category request timeouts, plus the session renewal timeout.
///
/// Renewal sits in the critical path of every request during an expiry,
/// so it must be strictly shorter than every category ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub interactive: Duration,
    pub generation: Duration,
    pub queue: Duration,
    pub upload: Duration,
    pub renewal: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            interactive: Duration::from_secs(30),
            generation: Duration::from_secs(120),
            queue: Duration::from_secs(15),
            upload: Duration::from_secs(300),
            renewal: Duration::from_secs(10),
        }
    }
}

impl Timeouts {
    #[must_use]
    pub fn for_category(&self, category: RequestCategory) -> Duration {
        match category {
            RequestCategory::Interactive => self.interactive,
            RequestCategory::Generation => self.generation,
            RequestCategory::Queue => self.queue,
            RequestCategory::Upload => self.upload,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if any timeout is zero, or if the renewal
    /// timeout is not shorter than every category timeout.
    pub fn validate(&self) -> Result<(), Error> {
        let categories = [
            ("interactive", self.interactive),
            ("generation", self.generation),
            ("queue", self.queue),
            ("upload", self.upload),
        ];
        if self.renewal.is_zero() {
            return Err(Error::Config("renewal timeout must be non-zero".into()));
        }
        for (name, ceiling) in categories {
            if ceiling.is_zero() {
                return Err(Error::Config(format!("{name} timeout must be non-zero")));
            }
            if self.renewal >= ceiling {
                return Err(Error::Config(format!(
                    "renewal timeout ({:?}) must be shorter than the {name} timeout ({ceiling:?})",
                    self.renewal
                )));
            }
        }
        Ok(())
    }
}

/// Client configuration.
///
/// The API base URL is the only required field; everything else defaults to
/// what the EstateHub backend serves.
///
/// ```rust,ignore
/// use estatehub_client::ClientConfig;
///
/// let config = ClientConfig::new("https://app.estatehub.io/api/v1".parse()?)
///     .with_login_path("/signin");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) refresh_path: String,
    pub(crate) login_path: String,
    pub(crate) csrf_cookie_name: String,
    pub(crate) timeouts: Timeouts,
}

impl ClientConfig {
    /// Create a configuration for the given API base URL (e.g. `https://host/api/v1`).
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            refresh_path: "auth/refresh".into(),
            login_path: "/login".into(),
            csrf_cookie_name: "csrf_token".into(),
            timeouts: Timeouts::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `ESTATEHUB_API_URL`: API base URL (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `ESTATEHUB_LOGIN_PATH`: sign-in route reported on session expiry
    /// - `ESTATEHUB_CSRF_COOKIE`: name of the readable CSRF cookie
    /// - `ESTATEHUB_TIMEOUT_INTERACTIVE_SECS`, `ESTATEHUB_TIMEOUT_GENERATION_SECS`,
    ///   `ESTATEHUB_TIMEOUT_QUEUE_SECS`, `ESTATEHUB_TIMEOUT_UPLOAD_SECS`,
    ///   `ESTATEHUB_TIMEOUT_RENEWAL_SECS`: timeout overrides in whole seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or invalid, a timeout
    /// is not a number, or the resulting timeouts are inconsistent.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let url_str = lookup("ESTATEHUB_API_URL")
            .ok_or_else(|| Error::Config("ESTATEHUB_API_URL is required".into()))?;
        let base_url: Url = url_str
            .parse()
            .map_err(|e| Error::Config(format!("ESTATEHUB_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Some(path) = lookup("ESTATEHUB_LOGIN_PATH") {
            config = config.with_login_path(path);
        }
        if let Some(name) = lookup("ESTATEHUB_CSRF_COOKIE") {
            config = config.with_csrf_cookie_name(name);
        }

        let mut timeouts = Timeouts::default();
        let overrides = [
            ("ESTATEHUB_TIMEOUT_INTERACTIVE_SECS", &mut timeouts.interactive),
            ("ESTATEHUB_TIMEOUT_GENERATION_SECS", &mut timeouts.generation),
            ("ESTATEHUB_TIMEOUT_QUEUE_SECS", &mut timeouts.queue),
            ("ESTATEHUB_TIMEOUT_UPLOAD_SECS", &mut timeouts.upload),
            ("ESTATEHUB_TIMEOUT_RENEWAL_SECS", &mut timeouts.renewal),
        ];
        for (key, slot) in overrides {
            if let Some(raw) = lookup(key) {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| Error::Config(format!("{key}: {e}")))?;
                *slot = Duration::from_secs(secs);
            }
        }
        timeouts.validate()?;

        Ok(config.with_timeouts(timeouts))
    }

    /// Override the renewal endpoint, relative to the base URL (default: `auth/refresh`).
    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Override the sign-in route reported on unrecoverable expiry (default: `/login`).
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_csrf_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.csrf_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn csrf_cookie_name(&self) -> &str {
        &self.csrf_cookie_name
    }

    #[must_use]
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Resolve an API path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sign-in location with an optional return path, e.g. `/login?next=%2Fleads`.
    #[must_use]
    pub fn login_location(&self, return_to: Option<&str>) -> String {
        match return_to {
            Some(next) if !next.is_empty() => {
                format!("{}?next={}", self.login_path, urlencoding::encode(next))
            }
            _ => self.login_path.clone(),
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig::new("https://app.example.com/api/v1".parse().unwrap())
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = test_config();
        assert_eq!(config.base_url().as_str(), "https://app.example.com/api/v1/");
        assert_eq!(config.refresh_path(), "auth/refresh");
        assert_eq!(config.login_path(), "/login");
        assert_eq!(config.csrf_cookie_name(), "csrf_token");
        assert_eq!(config.timeouts(), &Timeouts::default());
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let config = test_config();
        assert_eq!(
            config.endpoint("/leads").unwrap().as_str(),
            "https://app.example.com/api/v1/leads"
        );
        assert_eq!(
            config.endpoint("auth/refresh").unwrap().as_str(),
            "https://app.example.com/api/v1/auth/refresh"
        );
    }

    #[test]
    fn test_login_location_encodes_return_path() {
        let config = test_config();
        assert_eq!(config.login_location(None), "/login");
        assert_eq!(config.login_location(Some("")), "/login");
        assert_eq!(
            config.login_location(Some("/leads?status=new")),
            "/login?next=%2Fleads%3Fstatus%3Dnew"
        );
    }

    #[test]
    fn test_default_timeouts_are_consistent() {
        let timeouts = Timeouts::default();
        timeouts.validate().unwrap();
        assert!(timeouts.renewal < timeouts.for_category(RequestCategory::Queue));
        assert_eq!(
            timeouts.for_category(RequestCategory::default()),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_renewal_timeout_must_be_shortest() {
        let timeouts = Timeouts {
            renewal: Duration::from_secs(15),
            ..Timeouts::default()
        };
        let err = timeouts.validate().unwrap_err();
        assert!(err.to_string().contains("queue"), "{err}");
    }

    #[test]
    fn test_from_lookup_requires_api_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("ESTATEHUB_API_URL")));
    }

    #[test]
    fn test_from_lookup_rejects_invalid_url() {
        let err = ClientConfig::from_lookup(lookup(&[("ESTATEHUB_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ESTATEHUB_API_URL", "https://api.example.com/api/v1/"),
            ("ESTATEHUB_LOGIN_PATH", "/signin"),
            ("ESTATEHUB_CSRF_COOKIE", "xsrf"),
            ("ESTATEHUB_TIMEOUT_GENERATION_SECS", "240"),
            ("ESTATEHUB_TIMEOUT_RENEWAL_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.login_path(), "/signin");
        assert_eq!(config.csrf_cookie_name(), "xsrf");
        assert_eq!(config.timeouts().generation, Duration::from_secs(240));
        assert_eq!(config.timeouts().renewal, Duration::from_secs(5));
        assert_eq!(config.base_url().as_str(), "https://api.example.com/api/v1/");
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("ESTATEHUB_API_URL", "https://api.example.com/api/v1"),
            ("ESTATEHUB_TIMEOUT_UPLOAD_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("UPLOAD")));
    }
}
