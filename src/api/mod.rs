//! Typed wrappers over the EstateHub endpoints.
//!
//! Each wrapper borrows an [`ApiClient`], so every call gets the same
//! decoration and session renewal as raw [`ApiClient::send`] calls.

mod auth;
mod leads;
mod listings;


pub use auth::{AuthApi, CurrentUser, Role};
pub use leads::LeadsApi;
pub use listings::{GenerateOptions, GeneratedContent, ListingsApi, Photo, SyncJob};

use crate::client::ApiClient;

impl ApiClient {
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    #[must_use]
    pub fn leads(&self) -> LeadsApi<'_> {
        LeadsApi::new(self)
    }

    #[must_use]
    pub fn listings(&self) -> ListingsApi<'_> {
        ListingsApi::new(self)
    }
}

/// Percent-encode an identifier for use as a single path segment.
fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
