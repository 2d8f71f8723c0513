use serde::Serialize;

use super::segment;
use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;
use crate::leads::{Lead, LeadCapture, LeadQuery, LeadStatus, Page};
use crate::pipeline::Pipeline;
use crate::types::LeadId;

#[derive(Serialize)]
struct StatusUpdate {
    status: LeadStatus,
}

/// Lead management endpoints.
pub struct LeadsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LeadsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or an undecodable body, or
    /// [`Error::Status`] if the backend rejects the query.
    pub async fn list(&self, query: &LeadQuery) -> Result<Page<Lead>, Error> {
        let request = query
            .to_pairs()
            .into_iter()
            .fold(ApiRequest::get("leads"), |request, (key, value)| {
                request.query(key, value)
            });
        self.client.send_json(request).await
    }

    /// Fetch one page of leads and group it into a pipeline board.
    ///
    /// # Errors
    ///
    /// As [`list`](Self::list).
    pub async fn pipeline(&self, query: &LeadQuery) -> Result<Pipeline, Error> {
        let page = self.list(query).await?;
        Ok(Pipeline::from_leads(page.items))
    }

    /// # Errors
    ///
    /// Returns [`Error::Status`] with status 404 if the lead does not exist.
    pub async fn get(&self, id: &LeadId) -> Result<Lead, Error> {
        self.client
            .get_json(&format!("leads/{}", segment(id.as_str())))
            .await
    }

    /// Move a lead to another pipeline stage; returns the updated lead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] if the backend refuses the transition.
    pub async fn update_status(&self, id: &LeadId, status: LeadStatus) -> Result<Lead, Error> {
        let request = ApiRequest::patch(format!("leads/{}", segment(id.as_str())))
            .json(&StatusUpdate { status })?;
        self.client.send_json(request).await
    }

    /// Submit a lead from a public landing page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] with status 422 if the backend rejects the form.
    pub async fn capture(&self, capture: &LeadCapture) -> Result<Lead, Error> {
        let request = ApiRequest::post("public/leads").json(capture)?;
        let lead: Lead = self.client.send_json(request).await?;
        tracing::info!(lead_id = %lead.id, "Lead captured");
        Ok(lead)
    }
}
