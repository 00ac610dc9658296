//! # Wire types shared by the GraphQL operations
//!
//! Field names follow the server's GraphQL schema, which is camelCase on
//! the wire (`apiKey`, `createdAt`, `accessToken`). [`User`] is read-only
//! from the client's perspective and lives only in the in-memory session;
//! [`TokenPair`] is what the session layer persists into the token store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record as returned by the `me` query and the auth mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    /// Ingestion key for the REST tracking endpoint.
    pub api_key: String,
    #[serde(with = "graphql_datetime")]
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    /// Display name, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Bearer credentials returned by the auth mutations.
///
/// Both tokens are persisted together; the access token is attached to
/// every outbound operation, the refresh token is used only by the refresh
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The server serialises naive UTC datetimes without an offset; accept
/// those alongside RFC 3339.
mod graphql_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}
