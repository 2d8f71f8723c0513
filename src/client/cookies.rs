use std::collections::HashMap;

use cookie::Cookie;
use parking_lot::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

/// Read access to the cookies the backend has set for a URL.
///
/// The client only ever reads the CSRF cookie through this trait; the
/// session cookie is HttpOnly and stays inside the transport's jar.
/// Implementations must never log cookie values.
pub trait CookieSource: Send + Sync + 'static {
    /// Current value of cookie `name` as it would be sent to `url`.
    fn cookie(&self, url: &Url, name: &str) -> Option<String>;
}

impl CookieSource for Jar {
    fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.cookies(url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name)
    }
}

/// Fixed cookie values, independent of URL.
///
/// For hosts that manage cookies themselves (e.g. a server-side renderer
/// forwarding the browser's cookies).
#[derive(Debug, Default)]
pub struct StaticCookies {
    values: RwLock<HashMap<String, String>>,
}

impl StaticCookies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.values.write().remove(name);
    }
}

impl CookieSource for StaticCookies {
    fn cookie(&self, _url: &Url, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }
}

/// Find `name` in a `Cookie` request header value (`a=1; b=2`).
pub(crate) fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header.to_string())
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
