//! GraphQL documents and typed response envelopes for the auth operations.
//!
//! Auth mutations never signal business failure through the `errors` array;
//! they return `success: false` plus a human-readable `error` string inside
//! the data envelope. The envelopes here mirror that shape.

use serde::Deserialize;

use crate::models::{TokenPair, User};

pub const LOGIN: &str = r#"
mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    success
    error
    user { id email name apiKey createdAt isActive }
    tokens { accessToken refreshToken tokenType expiresIn }
  }
}
"#;

pub const REGISTER: &str = r#"
mutation Register($email: String!, $password: String!, $name: String) {
  register(email: $email, password: $password, name: $name) {
    success
    error
    user { id email name apiKey createdAt isActive }
    tokens { accessToken refreshToken tokenType expiresIn }
  }
}
"#;

pub const REFRESH_TOKEN: &str = r#"
mutation RefreshToken($refreshToken: String!) {
  refreshToken(refreshToken: $refreshToken) {
    success
    error
    tokens { accessToken refreshToken tokenType expiresIn }
  }
}
"#;

pub const ME: &str = r#"
query Me {
  me { id email name apiKey createdAt isActive }
}
"#;

/// Result envelope shared by the `login` and `register` mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub tokens: Option<TokenPair>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result envelope of the `refreshToken` mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResult {
    pub success: bool,
    #[serde(default)]
    pub tokens: Option<TokenPair>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub login: AuthResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub register: AuthResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub refresh_token: RefreshResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeData {
    #[serde(default)]
    pub me: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_envelope_success() {
        let data: LoginData = serde_json::from_value(serde_json::json!({
            "login": {
                "success": true,
                "error": null,
                "user": {
                    "id": "7",
                    "email": "ada@example.com",
                    "name": "Ada",
                    "apiKey": "key",
                    "createdAt": "2024-01-15T08:00:00",
                    "isActive": true,
                },
                "tokens": {
                    "accessToken": "at",
                    "refreshToken": "rt",
                    "tokenType": "Bearer",
                    "expiresIn": 3600,
                },
            }
        }))
        .unwrap();

        assert!(data.login.success);
        assert_eq!(data.login.user.unwrap().email, "ada@example.com");
        assert_eq!(data.login.tokens.unwrap().access_token, "at");
    }

    #[test]
    fn test_login_envelope_denied_has_no_user_or_tokens() {
        let data: LoginData = serde_json::from_value(serde_json::json!({
            "login": {
                "success": false,
                "error": "Invalid email or password",
                "user": null,
                "tokens": null,
            }
        }))
        .unwrap();

        assert!(!data.login.success);
        assert!(data.login.user.is_none());
        assert!(data.login.tokens.is_none());
        assert_eq!(
            data.login.error.as_deref(),
            Some("Invalid email or password")
        );
    }

    #[test]
    fn test_refresh_envelope_uses_camel_case_root() {
        let data: RefreshData = serde_json::from_value(serde_json::json!({
            "refreshToken": {
                "success": true,
                "error": null,
                "tokens": {
                    "accessToken": "new-at",
                    "refreshToken": "new-rt",
                    "tokenType": "Bearer",
                    "expiresIn": 3600,
                },
            }
        }))
        .unwrap();

        assert!(data.refresh_token.success);
        assert_eq!(data.refresh_token.tokens.unwrap().refresh_token, "new-rt");
    }

    #[test]
    fn test_me_envelope_null_user() {
        let data: MeData = serde_json::from_value(serde_json::json!({ "me": null })).unwrap();
        assert!(data.me.is_none());
    }
}
