//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors never reach the visitor
//! verbatim:
//!
//! - A backend `401` is a forced logout. The response is
//!   `401 {"redirect": "/auth/login"}` and carries a [`ForcedLogout`]
//!   extension; [`crate::middleware::forced_logout_middleware`] then drops the
//!   visitor's session.
//! - Everything else is an error toast with the generic message.
//!
//! Server-side failures are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maison_client::ApiError;
use maison_core::{StoreError, Toast};
use serde::Serialize;
use thiserror::Error;

/// Where the visitor is sent when they need to sign in.
pub const LOGIN_PATH: &str = "/auth/login";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Client state could not be persisted.
    #[error("Client state error: {0}")]
    Store(#[from] StoreError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The route needs a signed-in visitor and there is none.
    #[error("Sign-in required")]
    SignInRequired,

    /// The stored session is no longer valid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend rejected sign-in credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Response extension marking a forced logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedLogout;

#[derive(Serialize)]
struct RedirectBody {
    redirect: &'static str,
}

#[derive(Serialize)]
struct ToastBody {
    toast: Toast,
}

impl AppError {
    /// Whether this error ends the visitor's session.
    #[must_use]
    pub fn is_forced_logout(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Api(err) => err.is_unauthorized(),
            _ => false,
        }
    }

    fn is_server_error(&self) -> bool {
        match self {
            Self::Store(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Api(err) => err.is_server_error(),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => api_status(err),
            Self::Store(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SignInRequired | Self::Unauthorized(_) | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn api_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::Status { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        ApiError::Shared(inner) => api_status(inner),
        ApiError::Http(_) | ApiError::Parse(_) | ApiError::Status { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        if self.is_forced_logout() {
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Json(RedirectBody {
                    redirect: LOGIN_PATH,
                }),
            )
                .into_response();
            response.extensions_mut().insert(ForcedLogout);
            return response;
        }

        if matches!(self, Self::SignInRequired) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(RedirectBody {
                    redirect: LOGIN_PATH,
                }),
            )
                .into_response();
        }

        // Don't expose error details to clients
        let body = ToastBody {
            toast: Toast::generic_error(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for visitor actions.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use maison_core::toast::GENERIC_ERROR_MESSAGE;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::RateLimited(5))),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 503,
                message: "down".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 409,
                message: "conflict".to_string()
            })),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_backend_unauthorized_forces_logout() {
        let response = AppError::Api(ApiError::Shared(Arc::new(ApiError::Unauthorized)))
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<ForcedLogout>().is_some());
        assert_eq!(body_json(response).await["redirect"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_sign_in_required_redirects_without_logout() {
        let response = AppError::SignInRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<ForcedLogout>().is_none());
        assert_eq!(body_json(response).await["redirect"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_other_errors_are_generic_toasts() {
        let response = AppError::Api(ApiError::Status {
            status: 500,
            message: "stack trace with secrets".to_string(),
        })
        .into_response();
        assert!(response.extensions().get::<ForcedLogout>().is_none());
        let body = body_json(response).await;
        assert_eq!(body["toast"]["kind"], "error");
        assert_eq!(body["toast"]["message"], GENERIC_ERROR_MESSAGE);

        let body = body_json(AppError::InvalidCredentials.into_response()).await;
        assert_eq!(body["toast"]["message"], GENERIC_ERROR_MESSAGE);
    }
}
