//! # EventFlow client — session lifecycle and GraphQL transport
//!
//! This crate is the client-side core of the EventFlow dashboard: it owns
//! the authenticated session, the GraphQL transport pipeline, and the REST
//! event-ingestion call. Presentation is someone else's problem; everything
//! here is state and wire protocol.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`session`] | [`SessionManager`]: login, registration, logout, token refresh, startup restore. |
//! | [`transport`] | Ordered middleware pipeline (auth header, error interception, HTTP terminal). |
//! | [`operations`] | GraphQL documents and typed response envelopes. |
//! | [`models`] | [`User`] and [`TokenPair`] wire types. |
//! | [`cache`] | Query cache backing the cache-and-network read policy. |
//! | [`track`] | REST ingestion client for `/api/track`. |
//! | [`error`] | [`ClientError`] — the transport-fault taxonomy. |
//!
//! ## Credential flow
//!
//! Tokens live in a [`store::TokenStore`] injected at construction; the
//! session manager and the transport's 401 stage are the only writers. A
//! 401 anywhere clears both tokens and navigates to login; callers that
//! want to survive an expired access token invoke
//! [`SessionManager::refresh_token`] explicitly — the pipeline never
//! retries transparently.

pub mod cache;
pub mod error;
pub mod models;
pub mod operations;
pub mod session;
pub mod track;
pub mod transport;

pub use error::ClientError;
pub use models::{TokenPair, User};
pub use session::{AuthOutcome, Session, SessionManager};
pub use track::{TrackAck, TrackClient, TrackEvent};
pub use transport::{LogNavigator, Navigate, Request, Transport};

/// Where the client points its requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Scheme, host, and port of the EventFlow backend.
    pub base_url: String,
    /// Path of the GraphQL endpoint.
    pub graphql_path: String,
    /// Path of the REST ingestion endpoint.
    pub track_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6543".to_string(),
            graphql_path: "/graphql".to_string(),
            track_path: "/api/track".to_string(),
        }
    }
}

impl ClientOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the GraphQL endpoint.
    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.graphql_path)
    }

    /// Full URL of the ingestion endpoint.
    pub fn track_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.track_path)
    }
}
