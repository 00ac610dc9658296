//! # Transport pipeline — GraphQL over HTTP with ordered middleware
//!
//! A [`Request`] flows through an explicit, ordered list of [`Middleware`]
//! stages and ends at a [`Terminal`] that performs the HTTP exchange. Each
//! stage receives the in-flight request plus a [`Next`] handle and may
//! short-circuit, mutate headers, or delegate onward — there are no hidden
//! ordering dependencies between stages.
//!
//! The standard pipeline is:
//!
//! 1. [`AuthStage`] — attaches the `Authorization` header. The header is
//!    present on every request; its value is the empty string when no
//!    access token is stored (the server's auth parsing expects that).
//! 2. [`ErrorStage`] — on a 401 clears both tokens and forces navigation
//!    to the login view; logs GraphQL-level errors without touching
//!    session state. Everything is propagated onward either way.
//! 3. [`HttpTerminal`] — POSTs the operation and parses the response
//!    envelope. Swappable, so tests run the full pipeline against a
//!    scripted terminal.
//!
//! Read operations can go through
//! [`Transport::query_cache_and_network`], which hands back the cached
//! value immediately and revalidates against the network concurrently.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use store::TokenStore;

use crate::cache::QueryCache;
use crate::error::ClientError;
use crate::ClientOptions;

/// A GraphQL operation in flight: document, variables, and the headers
/// accumulated by earlier stages.
#[derive(Debug, Clone)]
pub struct Request {
    pub query: String,
    pub operation_name: Option<&'static str>,
    pub variables: Value,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(document: impl Into<String>, variables: Value) -> Self {
        Self {
            query: document.into(),
            operation_name: None,
            variables,
            headers: Vec::new(),
        }
    }

    /// Set the operation name sent alongside the document.
    pub fn operation(mut self, name: &'static str) -> Self {
        self.operation_name = Some(name);
        self
    }
}

/// One error entry from the GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// The GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

/// A pipeline stage.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response, ClientError>;
}

/// The stage that performs the actual exchange.
#[async_trait]
pub trait Terminal: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;
}

/// The remaining pipeline after the current stage.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn Terminal,
}

impl<'a> Next<'a> {
    /// Hand the request to the next stage, or to the terminal when none
    /// remain.
    pub async fn run(self, request: Request) -> Result<Response, ClientError> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                stage
                    .handle(
                        request,
                        Next {
                            stages: rest,
                            terminal: self.terminal,
                        },
                    )
                    .await
            }
            None => self.terminal.execute(request).await,
        }
    }
}

/// Client-side navigation hook, invoked when the session must end.
pub trait Navigate: Send + Sync {
    fn to_login(&self);
}

/// Navigator that only notes the redirect in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigate for LogNavigator {
    fn to_login(&self) {
        tracing::info!("redirecting to login");
    }
}

/// Attaches the bearer access token to every outbound operation.
pub struct AuthStage {
    tokens: Arc<dyn TokenStore>,
}

impl AuthStage {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Middleware for AuthStage {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response, ClientError> {
        // The server expects the header present even when no token is stored
        let value = match self.tokens.access_token() {
            Some(token) => format!("Bearer {token}"),
            None => String::new(),
        };
        request.headers.push(("authorization".to_string(), value));
        next.run(request).await
    }
}

/// Intercepts failures on the way back out of the pipeline.
pub struct ErrorStage {
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigate>,
}

impl ErrorStage {
    pub fn new(tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigate>) -> Self {
        Self { tokens, navigator }
    }
}

#[async_trait]
impl Middleware for ErrorStage {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response, ClientError> {
        let result = next.run(request).await;
        match &result {
            Err(error) if error.is_unauthorized() => {
                // An invalid credential ends the session outright
                self.tokens.clear_tokens();
                self.navigator.to_login();
            }
            Err(error) => {
                tracing::warn!(%error, "transport error");
            }
            Ok(response) => {
                if let Some(errors) = &response.errors {
                    for error in errors {
                        tracing::warn!(message = %error.message, "graphql error");
                    }
                }
            }
        }
        result
    }
}

/// Performs the HTTP POST against the GraphQL endpoint.
pub struct HttpTerminal {
    http: reqwest::Client,
    url: String,
}

impl HttpTerminal {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Terminal for HttpTerminal {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let payload = json!({
            "query": request.query,
            "variables": request.variables,
            "operationName": request.operation_name,
        });

        let mut builder = self.http.post(&self.url).json(&payload);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Response>().await?)
    }
}

/// The assembled pipeline plus the query cache.
///
/// Cloning shares the stages, the terminal, and the cache.
#[derive(Clone)]
pub struct Transport {
    stages: Arc<Vec<Arc<dyn Middleware>>>,
    terminal: Arc<dyn Terminal>,
    cache: QueryCache,
}

impl Transport {
    /// Standard pipeline: auth stage, error stage, HTTP terminal.
    pub fn new(
        options: &ClientOptions,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigate>,
    ) -> Self {
        let terminal = Arc::new(HttpTerminal::new(options.graphql_url()));
        Self::with_terminal(tokens, navigator, terminal)
    }

    /// Standard stages over an arbitrary terminal.
    pub fn with_terminal(
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigate>,
        terminal: Arc<dyn Terminal>,
    ) -> Self {
        let stages: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(AuthStage::new(tokens.clone())),
            Arc::new(ErrorStage::new(tokens, navigator)),
        ];
        Self {
            stages: Arc::new(stages),
            terminal,
            cache: QueryCache::new(),
        }
    }

    /// Run a request through every stage and return the raw envelope.
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        Next {
            stages: self.stages.as_slice(),
            terminal: self.terminal.as_ref(),
        }
        .run(request)
        .await
    }

    /// Run a request and decode its `data` into `T`.
    ///
    /// A missing or null `data` becomes [`ClientError::Graphql`] carrying
    /// whatever the `errors` array held.
    pub async fn request<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        let data = data_or_errors(response)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Cache-and-network read: the cached value (if any) is returned
    /// immediately; awaiting the second element revalidates against the
    /// network and updates the cache.
    pub fn query_cache_and_network(
        &self,
        request: Request,
    ) -> (
        Option<Value>,
        impl Future<Output = Result<Value, ClientError>> + '_,
    ) {
        let cached = self.cache.get(&request);
        let fresh = async move {
            let response = self.execute(request.clone()).await?;
            let data = data_or_errors(response)?;
            self.cache.insert(&request, data.clone());
            Ok(data)
        };
        (cached, fresh)
    }

    /// Drop every cached query result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn data_or_errors(response: Response) -> Result<Value, ClientError> {
    match response.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(ClientError::Graphql(response.errors.unwrap_or_default())),
    }
}
