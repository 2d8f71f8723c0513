use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Correlation identifier sent as `X-Request-ID` on every outgoing request.
///
/// Generated fresh per attempt: a retried request does not reuse the ID of
/// the attempt that was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, From, Into)]
pub struct RequestId(pub Ulid);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

/// Per-visit identifier linking a captured lead to the browsing session it came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct VisitId(pub Ulid);

impl VisitId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

/// Backend lead identifier (opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl From<&str> for LeadId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl LeadId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Backend listing identifier (opaque string, usually the MLS number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl ListingId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Backend user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Tenant (brokerage) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct OrganizationId(pub String);
