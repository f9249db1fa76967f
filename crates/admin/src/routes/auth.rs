//! Authentication route handlers for admin.
//!
//! Operators sign in with their backend account. The returned token is kept in
//! the server-side session and used for every admin call; the backend decides
//! whether the account may use the admin endpoints.

use axum::{Json, extract::State};
use maison_client::Credentials;
use maison_core::{Email, Toast, UserId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Operator sign-in form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Operator display data. Never includes the token.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.as_str().to_string(),
            name: admin.name.clone(),
        }
    }
}

/// Sign-in screen data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub signed_in: bool,
}

/// Result of a sign-in.
#[derive(Debug, Serialize)]
pub struct SignedInView {
    pub admin: AdminView,
    pub toast: Toast,
}

/// Result of a sign-out.
#[derive(Debug, Serialize)]
pub struct SignedOutView {
    pub toast: Toast,
}

/// Current operator, if any.
#[derive(Debug, Serialize)]
pub struct MeView {
    pub admin: Option<AdminView>,
}

/// Sign-in screen.
///
/// GET /auth/login
pub async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth) -> Json<LoginView> {
    Json(LoginView {
        signed_in: admin.is_some(),
    })
}

/// Sign in with email and password.
///
/// POST /auth/login
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SignedInView>> {
    let email = Email::parse(&request.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let credentials = Credentials::Local {
        email,
        password: SecretString::from(request.password),
    };

    // A rejected password is a toast on the login screen, not a forced logout
    let user = state.api().sign_in(&credentials).await.map_err(|e| {
        if e.is_unauthorized() {
            AppError::InvalidCredentials
        } else {
            AppError::Api(e)
        }
    })?;

    let admin = CurrentAdmin::from(user);
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));
    info!(admin_id = %admin.id, "Operator signed in");

    Ok(Json(SignedInView {
        toast: Toast::success(format!("Signed in as {}", admin.name)),
        admin: AdminView::from(&admin),
    }))
}

/// Logout and clear session.
///
/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<SignedOutView>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Json(SignedOutView {
        toast: Toast::success("Signed out"),
    }))
}

/// The signed-in operator.
///
/// GET /auth/me
pub async fn me(OptionalAdminAuth(admin): OptionalAdminAuth) -> Json<MeView> {
    Json(MeView {
        admin: admin.as_ref().map(AdminView::from),
    })
}
