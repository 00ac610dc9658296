//! # Session manager — the authenticated-session lifecycle
//!
//! One [`SessionManager`] is created per application instance and injected
//! into whatever needs it; there is no ambient global. Clones share the
//! same session state, token store, and transport.
//!
//! The manager is the only writer of session state and (together with the
//! transport's 401 stage) the only component allowed to touch the token
//! store. Business failures from the server come back as
//! [`AuthOutcome::Denied`] with the server's message; `Err` is reserved for
//! transport faults.

use std::sync::{Arc, Mutex};

use serde_json::json;

use store::TokenStore;
use telemetry::Telemetry;

use crate::error::ClientError;
use crate::models::User;
use crate::operations::{
    AuthResult, LoginData, MeData, RefreshData, RegisterData, LOGIN, ME, REFRESH_TOKEN, REGISTER,
};
use crate::transport::{Navigate, Request, Transport};
use crate::ClientOptions;

/// Authenticated-session state.
///
/// `loading` starts true and resolves to false exactly once, when
/// [`SessionManager::initialize`] finishes — on every branch, including the
/// one where no token is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl Session {
    /// Derived: a session is authenticated exactly when a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Outcome of a login or registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials accepted; the session now holds this user.
    Granted(User),
    /// The server rejected the attempt with this message. Nothing was
    /// persisted and the session is unchanged.
    Denied(String),
}

impl AuthOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthOutcome::Granted(_))
    }
}

/// Orchestrates login, registration, logout, and token refresh.
#[derive(Clone)]
pub struct SessionManager {
    transport: Transport,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigate>,
    telemetry: Telemetry,
    state: Arc<Mutex<Session>>,
}

impl SessionManager {
    /// Build a manager with the standard HTTP pipeline.
    pub fn new(
        options: &ClientOptions,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigate>,
        telemetry: Telemetry,
    ) -> Self {
        let transport = Transport::new(options, tokens.clone(), navigator.clone());
        Self::with_transport(transport, tokens, navigator, telemetry)
    }

    /// Build a manager over an already-assembled transport.
    pub fn with_transport(
        transport: Transport,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigate>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            transport,
            tokens,
            navigator,
            telemetry,
            state: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Restore a session from a previously stored access token.
    ///
    /// Makes no network call when no token is stored. A stored token that
    /// the server no longer accepts clears the whole pair.
    pub async fn initialize(&self) {
        if self.tokens.access_token().is_some() {
            let result = self
                .telemetry
                .with_span(
                    "session.initialize",
                    &[],
                    self.transport
                        .request::<MeData>(Request::new(ME, json!({})).operation("Me")),
                )
                .await;

            match result {
                Ok(MeData { me: Some(user) }) => {
                    self.state.lock().unwrap().user = Some(user);
                }
                Ok(MeData { me: None }) | Err(_) => {
                    // The stored token no longer identifies anyone
                    self.tokens.clear_tokens();
                }
            }
        }
        // Resolves exactly once, whichever branch ran
        self.state.lock().unwrap().loading = false;
    }

    /// Authenticate with email and password.
    ///
    /// On [`AuthOutcome::Granted`] the returned token pair has been
    /// persisted and the session user set. On [`AuthOutcome::Denied`] and
    /// on `Err`, neither the store nor the session was touched.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, ClientError> {
        let request = Request::new(
            LOGIN,
            json!({ "email": email, "password": password }),
        )
        .operation("Login");

        let data = self
            .telemetry
            .with_span(
                "session.login",
                &[("user.email", email)],
                self.transport.request::<LoginData>(request),
            )
            .await?;

        Ok(self.complete_auth(data.login, "session.login"))
    }

    /// Create an account and sign in as it.
    ///
    /// Same atomicity and failure contract as [`login`](Self::login).
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthOutcome, ClientError> {
        let request = Request::new(
            REGISTER,
            json!({ "email": email, "password": password, "name": name }),
        )
        .operation("Register");

        let data = self
            .telemetry
            .with_span(
                "session.register",
                &[("user.email", email)],
                self.transport.request::<RegisterData>(request),
            )
            .await?;

        Ok(self.complete_auth(data.register, "session.register"))
    }

    /// End the session: clear both tokens, drop cached query data, reset
    /// the user, and navigate to login. Idempotent.
    pub fn logout(&self) {
        self.tokens.clear_tokens();
        self.transport.clear_cache();
        self.state.lock().unwrap().user = None;
        self.telemetry.record_event("session.logout", &[]);
        self.navigator.to_login();
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns false without a network call when no refresh token is
    /// stored. Any failure ends the session via [`logout`](Self::logout),
    /// so a rejected refresh token is never left behind.
    pub async fn refresh_token(&self) -> bool {
        let Some(refresh) = self.tokens.refresh_token() else {
            return false;
        };

        let request = Request::new(REFRESH_TOKEN, json!({ "refreshToken": refresh }))
            .operation("RefreshToken");

        let result = self
            .telemetry
            .with_span(
                "session.refresh",
                &[],
                self.transport.request::<RefreshData>(request),
            )
            .await;

        match result {
            Ok(data) if data.refresh_token.success => match data.refresh_token.tokens {
                Some(tokens) => {
                    self.tokens
                        .set_tokens(&tokens.access_token, &tokens.refresh_token);
                    true
                }
                None => {
                    self.logout();
                    false
                }
            },
            Ok(_) | Err(_) => {
                self.logout();
                false
            }
        }
    }

    /// Snapshot of the current session state.
    pub fn session(&self) -> Session {
        self.state.lock().unwrap().clone()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.state.lock().unwrap().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().loading
    }

    fn complete_auth(&self, result: AuthResult, event: &str) -> AuthOutcome {
        if !result.success {
            let message = result
                .error
                .unwrap_or_else(|| "request rejected".to_string());
            return AuthOutcome::Denied(message);
        }
        match (result.user, result.tokens) {
            (Some(user), Some(tokens)) => {
                // Both halves persist together, then the session flips
                self.tokens
                    .set_tokens(&tokens.access_token, &tokens.refresh_token);
                self.state.lock().unwrap().user = Some(user.clone());
                self.telemetry
                    .record_event(event, &[("user.id", user.id.as_str())]);
                AuthOutcome::Granted(user)
            }
            _ => AuthOutcome::Denied("incomplete auth response".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::MemoryTokenStore;

    use super::*;
    use crate::transport::testing::{RecordingNavigator, ScriptedTerminal};
    use crate::transport::Terminal;

    fn manager() -> (
        SessionManager,
        Arc<MemoryTokenStore>,
        Arc<RecordingNavigator>,
        Arc<ScriptedTerminal>,
    ) {
        let tokens = Arc::new(MemoryTokenStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let terminal = Arc::new(ScriptedTerminal::new());
        let transport = Transport::with_terminal(
            tokens.clone() as Arc<dyn TokenStore>,
            navigator.clone() as Arc<dyn Navigate>,
            terminal.clone() as Arc<dyn Terminal>,
        );
        let manager = SessionManager::with_transport(
            transport,
            tokens.clone(),
            navigator.clone(),
            Telemetry::disabled(),
        );
        (manager, tokens, navigator, terminal)
    }

    fn user_json(id: &str, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": email,
            "name": "Ada",
            "apiKey": "api-key",
            "createdAt": "2024-01-15T08:00:00",
            "isActive": true,
        })
    }

    fn granted_login(id: &str, email: &str) -> serde_json::Value {
        json!({
            "login": {
                "success": true,
                "error": null,
                "user": user_json(id, email),
                "tokens": {
                    "accessToken": "new-access",
                    "refreshToken": "new-refresh",
                    "tokenType": "Bearer",
                    "expiresIn": 3600,
                },
            }
        })
    }

    #[tokio::test]
    async fn test_login_persists_pair_and_user() {
        let (manager, tokens, _navigator, terminal) = manager();
        terminal.push_data(granted_login("7", "ada@example.com"));

        let outcome = manager.login("ada@example.com", "pw").await.unwrap();

        assert!(outcome.is_granted());
        assert_eq!(tokens.access_token().as_deref(), Some("new-access"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("new-refresh"));
        assert_eq!(
            manager.current_user().unwrap().email,
            "ada@example.com"
        );
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_denied_touches_nothing() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("old-access", "old-refresh");
        terminal.push_data(json!({
            "login": {
                "success": false,
                "error": "Invalid email or password",
                "user": null,
                "tokens": null,
            }
        }));

        let outcome = manager.login("ada@example.com", "wrong").await.unwrap();

        assert_eq!(
            outcome,
            AuthOutcome::Denied("Invalid email or password".to_string())
        );
        assert_eq!(tokens.access_token().as_deref(), Some("old-access"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("old-refresh"));
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_network_error_touches_nothing() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("old-access", "old-refresh");
        terminal.push_status(503);

        let result = manager.login("ada@example.com", "pw").await;

        assert!(matches!(result, Err(ClientError::Status { status: 503 })));
        assert_eq!(tokens.access_token().as_deref(), Some("old-access"));
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_register_symmetric_to_login() {
        let (manager, tokens, _navigator, terminal) = manager();
        terminal.push_data(json!({
            "register": {
                "success": true,
                "error": null,
                "user": user_json("8", "new@example.com"),
                "tokens": {
                    "accessToken": "reg-access",
                    "refreshToken": "reg-refresh",
                    "tokenType": "Bearer",
                    "expiresIn": 3600,
                },
            }
        }));

        let outcome = manager
            .register("new@example.com", "password123", Some("Ada"))
            .await
            .unwrap();

        assert!(outcome.is_granted());
        assert_eq!(tokens.access_token().as_deref(), Some("reg-access"));
        assert_eq!(manager.current_user().unwrap().id, "8");
    }

    #[tokio::test]
    async fn test_refresh_without_token_makes_no_request() {
        let (manager, _tokens, _navigator, terminal) = manager();

        assert!(!manager.refresh_token().await);
        assert_eq!(terminal.request_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_rejected_equals_logged_out() {
        let (manager, tokens, navigator, terminal) = manager();
        tokens.set_tokens("access", "rejected-refresh");
        terminal.push_data(json!({
            "refreshToken": {
                "success": false,
                "error": "Invalid token type",
                "tokens": null,
            }
        }));

        assert!(!manager.refresh_token().await);
        assert!(tokens.access_token().is_none());
        assert!(tokens.refresh_token().is_none());
        assert!(manager.current_user().is_none());
        assert_eq!(navigator.redirects(), 1);
    }

    #[tokio::test]
    async fn test_refresh_network_error_equals_logged_out() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("access", "refresh");
        terminal.push_status(500);

        assert!(!manager.refresh_token().await);
        assert!(tokens.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_refresh_success_rotates_pair() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("old-access", "old-refresh");
        terminal.push_data(json!({
            "refreshToken": {
                "success": true,
                "error": null,
                "tokens": {
                    "accessToken": "rotated-access",
                    "refreshToken": "rotated-refresh",
                    "tokenType": "Bearer",
                    "expiresIn": 3600,
                },
            }
        }));

        assert!(manager.refresh_token().await);
        assert_eq!(tokens.access_token().as_deref(), Some("rotated-access"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("rotated-refresh"));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (manager, tokens, navigator, terminal) = manager();
        terminal.push_data(granted_login("7", "ada@example.com"));
        manager.login("ada@example.com", "pw").await.unwrap();

        manager.logout();
        let after_first = (
            tokens.access_token(),
            tokens.refresh_token(),
            manager.session(),
        );

        manager.logout();
        let after_second = (
            tokens.access_token(),
            tokens.refresh_token(),
            manager.session(),
        );

        assert_eq!(after_first, after_second);
        assert!(after_second.0.is_none());
        assert!(!manager.is_authenticated());
        assert_eq!(navigator.redirects(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_during_any_operation_forces_logout() {
        let (manager, tokens, navigator, terminal) = manager();
        tokens.set_tokens("expired", "expired-refresh");
        terminal.push_status(401);

        let result = manager.login("ada@example.com", "pw").await;

        assert!(result.is_err());
        assert!(tokens.access_token().is_none());
        assert!(tokens.refresh_token().is_none());
        assert_eq!(navigator.redirects(), 1);
    }

    #[tokio::test]
    async fn test_initialize_without_tokens_skips_network() {
        let (manager, _tokens, _navigator, terminal) = manager();

        assert!(manager.is_loading());
        manager.initialize().await;

        assert!(!manager.is_loading());
        assert!(manager.current_user().is_none());
        assert_eq!(terminal.request_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_with_valid_token_restores_user() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("stored-access", "stored-refresh");
        terminal.push_data(json!({ "me": user_json("7", "ada@example.com") }));

        manager.initialize().await;

        assert!(!manager.is_loading());
        assert_eq!(manager.current_user().unwrap().id, "7");
        assert_eq!(tokens.access_token().as_deref(), Some("stored-access"));
    }

    #[tokio::test]
    async fn test_initialize_with_stale_token_clears_pair() {
        let (manager, tokens, _navigator, terminal) = manager();
        tokens.set_tokens("stale-access", "stale-refresh");
        terminal.push_data(json!({ "me": null }));

        manager.initialize().await;

        assert!(!manager.is_loading());
        assert!(manager.current_user().is_none());
        assert!(tokens.access_token().is_none());
        assert!(tokens.refresh_token().is_none());
    }
}
