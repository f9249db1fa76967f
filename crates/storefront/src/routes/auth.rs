//! Authentication route handlers.
//!
//! Identity belongs to the backend. A successful sign-in (local, Google or
//! Apple) stores the returned [`UserSession`] in the visitor's client state;
//! signing out drops it locally. The bag is kept either way.
//!
//! A rejected sign-in is an ordinary error toast, not a forced logout.

use axum::{Json, extract::State};
use maison_client::{ApiError, Credentials, Registration};
use maison_core::{AuthProvider, Email, SessionAction, Toast, UserId, UserSession};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{ClientStore, OptionalSession};
use crate::state::AppState;

/// Providers offered on the sign-in screen.
const PROVIDERS: [AuthProvider; 3] = [
    AuthProvider::Local,
    AuthProvider::Google,
    AuthProvider::Apple,
];

// =============================================================================
// Request Types
// =============================================================================

/// Email and password sign-in.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google Identity Services sign-in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    pub id_token: String,
}

/// Sign in with Apple.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleRequest {
    pub identity_token: String,
    #[serde(default)]
    pub authorization_code: Option<String>,
}

/// New local account.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

// =============================================================================
// Views
// =============================================================================

/// Signed-in user display data. Never includes the token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub provider: AuthProvider,
}

impl From<&UserSession> for UserView {
    fn from(user: &UserSession) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            display_name: user.display_name.clone(),
            provider: user.auth_provider,
        }
    }
}

/// Sign-in screen data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub signed_in: bool,
    pub providers: Vec<&'static str>,
}

/// Result of a sign-in or registration.
#[derive(Debug, Serialize)]
pub struct SignedInView {
    pub user: UserView,
    pub toast: Toast,
}

/// Current user, if any.
#[derive(Debug, Serialize)]
pub struct MeView {
    pub user: Option<UserView>,
}

/// Result of signing out.
#[derive(Debug, Serialize)]
pub struct SignedOutView {
    pub toast: Toast,
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign-in screen.
pub async fn login_page(OptionalSession(user): OptionalSession) -> Json<LoginView> {
    Json(LoginView {
        signed_in: user.is_some(),
        providers: PROVIDERS.iter().map(|p| p.as_str()).collect(),
    })
}

/// Sign in with email and password.
#[instrument(skip(state, store, request))]
pub async fn login(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SignedInView>> {
    let credentials = Credentials::Local {
        email: parse_email(&request.email)?,
        password: SecretString::from(request.password),
    };
    sign_in(&state, &mut store, &credentials).await
}

/// Sign in with a Google ID token.
#[instrument(skip(state, store, request))]
pub async fn google(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<GoogleRequest>,
) -> Result<Json<SignedInView>> {
    let credentials = Credentials::Google {
        id_token: SecretString::from(request.id_token),
    };
    sign_in(&state, &mut store, &credentials).await
}

/// Sign in with an Apple identity token.
#[instrument(skip(state, store, request))]
pub async fn apple(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<AppleRequest>,
) -> Result<Json<SignedInView>> {
    let credentials = Credentials::Apple {
        identity_token: SecretString::from(request.identity_token),
        authorization_code: request.authorization_code.map(SecretString::from),
    };
    sign_in(&state, &mut store, &credentials).await
}

/// Create a local account and sign it in.
#[instrument(skip(state, store, request))]
pub async fn register(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SignedInView>> {
    let registration = Registration {
        email: parse_email(&request.email)?,
        password: SecretString::from(request.password),
        display_name: request.display_name,
    };
    let user = state
        .api()
        .register(&registration)
        .await
        .map_err(credentials_error)?;
    let toast = Toast::success(format!("Welcome to Maison, {}", user.display_name));
    start_session(&mut store, user, toast).await
}

/// Sign out. Local only; the bag is kept.
#[instrument(skip(store))]
pub async fn logout(mut store: ClientStore) -> Result<Json<SignedOutView>> {
    store.sign_out().await?;
    clear_sentry_user();
    info!("Signed out");
    Ok(Json(SignedOutView {
        toast: Toast::success("You have been signed out"),
    }))
}

/// The signed-in user.
pub async fn me(OptionalSession(user): OptionalSession) -> Json<MeView> {
    Json(MeView {
        user: user.as_ref().map(UserView::from),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// A `401` while signing in means the credentials were refused, not that a
/// session expired.
fn credentials_error(e: ApiError) -> AppError {
    if e.is_unauthorized() {
        AppError::InvalidCredentials
    } else {
        AppError::Api(e)
    }
}

async fn sign_in(
    state: &AppState,
    store: &mut ClientStore,
    credentials: &Credentials,
) -> Result<Json<SignedInView>> {
    let user = state
        .api()
        .sign_in(credentials)
        .await
        .map_err(credentials_error)?;
    let toast = Toast::success(format!("Welcome back, {}", user.display_name));
    start_session(store, user, toast).await
}

async fn start_session(
    store: &mut ClientStore,
    user: UserSession,
    toast: Toast,
) -> Result<Json<SignedInView>> {
    // New identity, new session id
    store.http_session().cycle_id().await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let view = UserView::from(&user);
    store.dispatch(SessionAction::SignIn(user)).await?;
    Ok(Json(SignedInView { user: view, toast }))
}
