use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A staff account that can sign in to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A certification specification. Each specification owns its own
/// certificate-number sequence; `last_certificate_number` is the most
/// recently issued number under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    pub id: String,
    pub name: String,
    pub last_certificate_number: i64,
    pub created_at: DateTime<Utc>,
}

/// A certified client company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub company_name: String,
    pub email: String,
    pub specification_id: String,
    pub certificate_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A client joined with the name of its specification, for listings
/// and export.
#[derive(Debug, Clone, Serialize)]
pub struct ClientDetails {
    #[serde(flatten)]
    pub client: Client,
    pub specification_name: String,
}

/// A browser session. The cookie holds the raw token; only its hash and
/// a lookup prefix are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Fields for a client about to be created. The certificate number is
/// not part of this type; the store assigns it when the record commits.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub company_name: String,
    pub email: String,
    pub specification_id: String,
    pub grant_date: Option<NaiveDate>,
}
