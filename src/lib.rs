#![doc = include_str!("../README.md")]

#[cfg(feature = "client")]
pub mod api;
pub mod attribution;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod leads;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "client")]
pub use api::{
    AuthApi, CurrentUser, GenerateOptions, GeneratedContent, LeadsApi, ListingsApi, Photo, Role,
    SyncJob,
};
pub use attribution::{Attribution, AttributionTracker, UtmParams};
#[cfg(feature = "client")]
pub use client::{
    ApiClient, ApiClientBuilder, ApiRequest, Attempt, CSRF_HEADER, ClientConfig, CookieSource,
    LogSessionExpiry, REQUEST_ID_HEADER, RequestCategory, SessionExpired, SessionListener,
    StaticCookies, Timeouts, Transport,
};
pub use error::{Error, RenewalFailure};
pub use leads::{Lead, LeadCapture, LeadQuery, LeadStatus, Page};
pub use pipeline::{Column, Pipeline};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, Preferences};
pub use types::{LeadId, ListingId, OrganizationId, RequestId, UserId, VisitId};
