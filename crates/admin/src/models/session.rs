//! Session-stored operator identity.

use maison_core::{AccessToken, Email, UserId, UserSession};
use serde::{Deserialize, Serialize};

/// The signed-in operator.
///
/// Holds the backend token every admin call is made with. The token never
/// leaves the server-side session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub token: AccessToken,
}

impl From<UserSession> for CurrentAdmin {
    fn from(session: UserSession) -> Self {
        Self {
            id: session.id,
            email: session.email,
            name: session.display_name,
            token: session.token,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maison_core::AuthProvider;

    use super::*;

    #[test]
    fn test_from_user_session_keeps_token() {
        let admin = CurrentAdmin::from(UserSession {
            id: UserId::new(2),
            email: Email::parse("ops@maison.shop").unwrap(),
            display_name: "Inès".to_string(),
            auth_provider: AuthProvider::Local,
            token: AccessToken::new("op_tok"),
        });
        assert_eq!(admin.name, "Inès");
        assert_eq!(admin.token.expose(), "op_tok");
        assert!(!format!("{admin:?}").contains("op_tok"));
    }
}
