//! Sign-in and registration.
//!
//! Identity is owned by the backend. A successful call returns the token and
//! user that make up a [`UserSession`]; signing out is purely local.

use maison_core::{AccessToken, AuthProvider, Email, UserId, UserSession};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{ApiClient, ApiError};

/// Sign-in credentials, one variant per identity provider.
#[derive(Debug)]
pub enum Credentials {
    /// Email and password.
    Local { email: Email, password: SecretString },
    /// Google ID token from Google Identity Services.
    Google { id_token: SecretString },
    /// Apple identity token from Sign in with Apple.
    Apple {
        identity_token: SecretString,
        authorization_code: Option<SecretString>,
    },
}

impl Credentials {
    /// The provider these credentials belong to.
    #[must_use]
    pub const fn provider(&self) -> AuthProvider {
        match self {
            Self::Local { .. } => AuthProvider::Local,
            Self::Google { .. } => AuthProvider::Google,
            Self::Apple { .. } => AuthProvider::Apple,
        }
    }

    const fn path(&self) -> &'static str {
        match self {
            Self::Local { .. } => "/api/auth/login",
            Self::Google { .. } => "/api/auth/google",
            Self::Apple { .. } => "/api/auth/apple",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Local { email, password } => serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }),
            Self::Google { id_token } => serde_json::json!({
                "idToken": id_token.expose_secret(),
            }),
            Self::Apple {
                identity_token,
                authorization_code,
            } => serde_json::json!({
                "identityToken": identity_token.expose_secret(),
                "authorizationCode": authorization_code.as_ref().map(|c| c.expose_secret()),
            }),
        }
    }
}

/// A new local account.
#[derive(Debug)]
pub struct Registration {
    pub email: Email,
    pub password: SecretString,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: AccessToken,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthUser {
    id: UserId,
    email: Email,
    display_name: String,
}

impl AuthResponse {
    fn into_session(self, provider: AuthProvider) -> UserSession {
        UserSession {
            id: self.user.id,
            email: self.user.email,
            display_name: self.user.display_name,
            auth_provider: provider,
            token: self.token,
        }
    }
}

impl ApiClient {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for rejected credentials, or error if
    /// the API request fails.
    #[instrument(skip(self, credentials), fields(provider = credentials.provider().as_str()))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserSession, ApiError> {
        let response: AuthResponse = self
            .post(credentials.path(), &credentials.body(), None)
            .await?;
        let session = response.into_session(credentials.provider());
        info!(user_id = %session.id, "Signed in");
        Ok(session)
    }

    /// Create a local account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration.
    #[instrument(skip(self, registration), fields(email_domain = registration.email.domain()))]
    pub async fn register(&self, registration: &Registration) -> Result<UserSession, ApiError> {
        if registration.display_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("display name is required".to_string()));
        }
        let body = serde_json::json!({
            "email": registration.email.as_str(),
            "password": registration.password.expose_secret(),
            "displayName": registration.display_name.trim(),
        });
        let response: AuthResponse = self.post("/api/auth/register", &body, None).await?;
        let session = response.into_session(AuthProvider::Local);
        info!(user_id = %session.id, "Registered");
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;
    use crate::test_support::client_for;

    async fn login(Json(body): Json<serde_json::Value>) -> Result<Json<serde_json::Value>, StatusCode> {
        if body["password"] != "correct horse" {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Json(serde_json::json!({
            "token": "tok_1",
            "user": { "id": 7, "email": body["email"], "displayName": "Camille" }
        })))
    }

    async fn google(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        assert_eq!(body["idToken"], "g-id-token");
        Json(serde_json::json!({
            "token": "tok_g",
            "user": { "id": 8, "email": "g@maison.shop", "displayName": "G" }
        }))
    }

    fn router() -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/google", post(google))
    }

    #[tokio::test]
    async fn test_local_sign_in() {
        let client = client_for(router()).await;
        let credentials = Credentials::Local {
            email: Email::parse("camille@maison.shop").unwrap(),
            password: SecretString::from("correct horse".to_string()),
        };
        let session = client.sign_in(&credentials).await.unwrap();
        assert_eq!(session.id, UserId::new(7));
        assert_eq!(session.auth_provider, AuthProvider::Local);
        assert_eq!(session.token.expose(), "tok_1");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_unauthorized() {
        let client = client_for(router()).await;
        let credentials = Credentials::Local {
            email: Email::parse("camille@maison.shop").unwrap(),
            password: SecretString::from("wrong".to_string()),
        };
        let err = client.sign_in(&credentials).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_google_sign_in_tags_provider() {
        let client = client_for(router()).await;
        let credentials = Credentials::Google {
            id_token: SecretString::from("g-id-token".to_string()),
        };
        let session = client.sign_in(&credentials).await.unwrap();
        assert_eq!(session.auth_provider, AuthProvider::Google);
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = Credentials::Google {
            id_token: SecretString::from("g-id-token".to_string()),
        };
        assert!(!format!("{credentials:?}").contains("g-id-token"));
    }
}
