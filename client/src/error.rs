//! Error types for the transport pipeline and session operations.
//!
//! Business-level failures (a rejected login, an unknown refresh token) are
//! **not** errors here — the server reports them inside a successful
//! envelope and the session layer returns them as data. These variants
//! cover the transport below that envelope.

use thiserror::Error;

use crate::transport::GraphQlError;

/// Errors produced by the transport pipeline and session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure below the GraphQL envelope.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response outside the GraphQL envelope.
    #[error("server returned status {status}")]
    Status { status: u16 },

    /// GraphQL-level errors returned inside a successful response.
    #[error("graphql errors: {}", join_messages(.0))]
    Graphql(Vec<GraphQlError>),

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether this is the distinguished forced-logout case.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Status { status: 401 })
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
