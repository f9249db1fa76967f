//! Signed-in user session.
//!
//! A session is created from a successful sign-in response, persisted with
//! the rest of the client state, and dropped on sign-out or when the backend
//! rejects its token.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// Identity provider used to sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Local,
    Google,
    Apple,
}

impl AuthProvider {
    /// Lowercase provider name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Apple => "apple",
        }
    }
}

/// Bearer token issued by the backend.
///
/// `Debug` output is redacted so sessions can be logged safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub auth_provider: AuthProvider,
    pub token: AccessToken,
}
