//! Marketing attribution for public landing pages.
//!
//! UTM parameters from the landing URL and a per-visit identifier are kept
//! in a [`KeyValueStore`] so a lead submitted several pages later can still
//! be credited to the campaign that brought the visitor in.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::error::Error;
use crate::storage::KeyValueStore;
use crate::types::VisitId;

const ATTRIBUTION_KEY: &str = "estatehub.attribution";
const VISIT_ID_KEY: &str = "estatehub.visit_id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UtmParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UtmParams {
    /// Extract `utm_*` parameters; blank values are ignored.
    ///
    /// Returns `None` when the URL carries no usable UTM parameter.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "utm_source" => &mut params.source,
                "utm_medium" => &mut params.medium,
                "utm_campaign" => &mut params.campaign,
                "utm_term" => &mut params.term,
                "utm_content" => &mut params.content,
                _ => continue,
            };
            *slot = Some(value.to_owned());
        }
        (!params.is_empty()).then_some(params)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }
}

/// A captured marketing touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Attribution {
    pub utm: UtmParams,
    /// Path of the page the visitor landed on, without the query string.
    pub landing_page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
}

/// Captures and recalls attribution through a [`KeyValueStore`].
pub struct AttributionTracker<S> {
    store: S,
}

impl<S: KeyValueStore> AttributionTracker<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record the UTM parameters of `url` if it has any; the latest touch wins.
    ///
    /// A URL without UTM parameters leaves any earlier capture in place and
    /// returns `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] or [`Error::Json`] if the capture cannot be persisted.
    pub fn capture(&self, url: &Url, referrer: Option<&str>) -> Result<Option<Attribution>, Error> {
        let Some(utm) = UtmParams::from_url(url) else {
            return Ok(None);
        };
        let attribution = Attribution {
            utm,
            landing_page: url.path().to_owned(),
            referrer: referrer
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_owned),
            captured_at: OffsetDateTime::now_utc(),
        };
        self.store
            .set(ATTRIBUTION_KEY, &serde_json::to_string(&attribution)?)?;
        tracing::debug!(
            source = attribution.utm.source.as_deref().unwrap_or(""),
            campaign = attribution.utm.campaign.as_deref().unwrap_or(""),
            "Captured attribution"
        );
        Ok(Some(attribution))
    }

    /// The stored attribution, if any. An unreadable entry counts as none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read.
    pub fn current(&self) -> Result<Option<Attribution>, Error> {
        let Some(raw) = self.store.get(ATTRIBUTION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(attribution) => Ok(Some(attribution)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable stored attribution");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be written.
    pub fn clear(&self) -> Result<(), Error> {
        self.store.remove(ATTRIBUTION_KEY)
    }

    /// The visit's identifier, created and stored on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read or written.
    pub fn visit_id(&self) -> Result<VisitId, Error> {
        if let Some(existing) = self
            .store
            .get(VISIT_ID_KEY)?
            .and_then(|raw| raw.parse::<VisitId>().ok())
        {
            return Ok(existing);
        }
        let visit_id = VisitId::generate();
        self.store.set(VISIT_ID_KEY, &visit_id.to_string())?;
        Ok(visit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn test_utm_from_url() {
        let utm = UtmParams::from_url(&url(
            "https://homes.example.com/l/123?utm_source=facebook&utm_campaign=spring%20open%20house&ref=x",
        ))
        .unwrap();
        assert_eq!(utm.source.as_deref(), Some("facebook"));
        assert_eq!(utm.campaign.as_deref(), Some("spring open house"));
        assert_eq!(utm.medium, None);
    }

    #[test]
    fn test_utm_ignores_blank_values() {
        assert_eq!(
            UtmParams::from_url(&url("https://homes.example.com/?utm_source=&utm_medium=%20")),
            None
        );
        assert_eq!(UtmParams::from_url(&url("https://homes.example.com/")), None);
    }

    #[test]
    fn test_capture_and_recall() {
        let tracker = AttributionTracker::new(MemoryStore::new());
        let captured = tracker
            .capture(
                &url("https://homes.example.com/l/42?utm_source=google&utm_medium=cpc"),
                Some("https://www.google.com/"),
            )
            .unwrap()
            .unwrap();

        assert_eq!(captured.landing_page, "/l/42");
        assert_eq!(captured.referrer.as_deref(), Some("https://www.google.com/"));
        let current = tracker.current().unwrap().unwrap();
        assert_eq!(current.utm, captured.utm);
        assert_eq!(current.landing_page, captured.landing_page);
        assert_eq!(current.captured_at.unix_timestamp(), captured.captured_at.unix_timestamp());
    }

    #[test]
    fn test_page_without_utm_keeps_earlier_capture() {
        let tracker = AttributionTracker::new(MemoryStore::new());
        tracker
            .capture(&url("https://homes.example.com/?utm_source=newsletter"), None)
            .unwrap();

        let result = tracker
            .capture(&url("https://homes.example.com/listings/7"), Some(""))
            .unwrap();

        assert_eq!(result, None);
        let current = tracker.current().unwrap().unwrap();
        assert_eq!(current.utm.source.as_deref(), Some("newsletter"));
        assert_eq!(current.referrer, None);
    }

    #[test]
    fn test_latest_touch_wins() {
        let tracker = AttributionTracker::new(MemoryStore::new());
        tracker
            .capture(&url("https://homes.example.com/?utm_source=newsletter"), None)
            .unwrap();
        tracker
            .capture(&url("https://homes.example.com/?utm_source=instagram"), None)
            .unwrap();

        let current = tracker.current().unwrap().unwrap();
        assert_eq!(current.utm.source.as_deref(), Some("instagram"));
    }

    #[test]
    fn test_clear() {
        let tracker = AttributionTracker::new(MemoryStore::new());
        tracker
            .capture(&url("https://homes.example.com/?utm_source=x"), None)
            .unwrap();
        tracker.clear().unwrap();
        assert_eq!(tracker.current().unwrap(), None);
    }

    #[test]
    fn test_unreadable_attribution_is_ignored() {
        let store = MemoryStore::new();
        store.set(ATTRIBUTION_KEY, "garbage").unwrap();
        let tracker = AttributionTracker::new(store);
        assert_eq!(tracker.current().unwrap(), None);
    }

    #[test]
    fn test_visit_id_is_stable_within_store() {
        let tracker = AttributionTracker::new(MemoryStore::new());
        let first = tracker.visit_id().unwrap();
        let second = tracker.visit_id().unwrap();
        assert_eq!(first, second);

        let other = AttributionTracker::new(MemoryStore::new());
        assert_ne!(other.visit_id().unwrap(), first);
    }

    #[test]
    fn test_corrupt_visit_id_is_replaced() {
        let store = MemoryStore::new();
        store.set(VISIT_ID_KEY, "not-a-ulid").unwrap();
        let tracker = AttributionTracker::new(store);
        let id = tracker.visit_id().unwrap();
        assert_eq!(tracker.visit_id().unwrap(), id);
    }
}
