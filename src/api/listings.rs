use serde::{Deserialize, Serialize};

use super::segment;
use crate::client::{ApiClient, ApiRequest, RequestCategory};
use crate::error::Error;
use crate::types::ListingId;

/// Background MLS sync job accepted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct SyncJob {
    pub job_id: String,
    pub status: String,
}

/// Options for AI listing descriptions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOptions {
    /// e.g. `"luxury"`, `"friendly"`, `"concise"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct GeneratedContent {
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Photo {
    pub id: String,
    pub url: String,
}

/// Listing endpoints: MLS sync, AI content, media.
pub struct ListingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ListingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Queue an MLS sync for the brokerage. Returns as soon as the job is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] with status 409 if a sync is already running.
    pub async fn sync(&self) -> Result<SyncJob, Error> {
        let request = ApiRequest::post("listings/sync").category(RequestCategory::Queue);
        let job: SyncJob = self.client.send_json(request).await?;
        tracing::info!(job_id = %job.job_id, "MLS sync queued");
        Ok(job)
    }

    /// Generate a marketing description for a listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if generation exceeds the generation timeout.
    pub async fn generate_description(
        &self,
        id: &ListingId,
        options: &GenerateOptions,
    ) -> Result<GeneratedContent, Error> {
        let request = ApiRequest::post(format!("listings/{}/generate", segment(id.as_str())))
            .json(options)?
            .category(RequestCategory::Generation);
        self.client.send_json(request).await
    }

    /// Upload a listing photo as a raw body; the file name travels as a query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] with status 413 if the file is too large.
    pub async fn upload_photo(
        &self,
        id: &ListingId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Photo, Error> {
        let request = ApiRequest::post(format!("listings/{}/photos", segment(id.as_str())))
            .query("file_name", file_name)
            .bytes(content_type, bytes)
            .category(RequestCategory::Upload);
        self.client.send_json(request).await
    }
}
