use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;
use crate::types::{OrganizationId, UserId};

/// Role of a team member within their brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Agent,
    /// A role this client version does not know about.
    #[serde(other)]
    Other,
}

/// The signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub organization_id: OrganizationId,
    pub role: Role,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Sign-in, sign-out and session bootstrap.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password. The backend sets the session and
    /// CSRF cookies on success.
    ///
    /// A `401` here means bad credentials and is returned as
    /// [`Error::Status`]; it never triggers a session renewal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::Status`] if the backend rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, Error> {
        let request = ApiRequest::post("auth/login")
            .json(&Credentials { email, password })?
            .without_session_renewal();
        let user: CurrentUser = self.client.send_json(request).await?;
        tracing::info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Sign out and let the backend clear the session cookie.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::Status`] if the backend refuses.
    pub async fn logout(&self) -> Result<(), Error> {
        self.client.send_empty(ApiRequest::post("auth/logout")).await
    }

    /// The signed-in user, renewing the session first if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionExpired`] when there is no session to renew.
    pub async fn me(&self) -> Result<CurrentUser, Error> {
        self.client.get_json("auth/me").await
    }
}
