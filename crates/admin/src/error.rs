//! Unified error handling for admin.
//!
//! A backend `401` means the operator's token is gone: the response is
//! `401 {"redirect": "/auth/login"}` tagged with [`ForcedLogout`], and
//! [`crate::middleware::forced_logout_middleware`] clears the session. Any
//! other failure is a generic error toast.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maison_client::ApiError;
use maison_core::Toast;
use serde::Serialize;
use thiserror::Error;

/// Where operators are sent when they need to sign in.
pub const LOGIN_PATH: &str = "/auth/login";

/// Application-level error type for the admin dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No operator is signed in.
    #[error("Sign-in required")]
    SignInRequired,

    /// The backend rejected the sign-in credentials.
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
    fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::Unauthorized) | Self::SignInRequired | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(ApiError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Api(ApiError::InvalidRequest(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Api(ApiError::Status { status, .. }) if (400..500).contains(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::Api(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let server_error = match &self {
            Self::Session(_) | Self::Internal(_) => true,
            Self::Api(err) => err.is_server_error(),
            _ => false,
        };
        if server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::debug!(error = %self, "Admin request rejected");
        }

        match &self {
            Self::Api(err) if err.is_unauthorized() => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(RedirectBody {
                        redirect: LOGIN_PATH,
                    }),
                )
                    .into_response();
                response.extensions_mut().insert(ForcedLogout);
                response
            }
            Self::SignInRequired => (
                StatusCode::UNAUTHORIZED,
                Json(RedirectBody {
                    redirect: LOGIN_PATH,
                }),
            )
                .into_response(),
            // Don't expose error details to clients
            _ => (
                self.status(),
                Json(ToastBody {
                    toast: Toast::generic_error(),
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the signed-in operator.
pub fn set_sentry_user(admin_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use maison_core::toast::GENERIC_ERROR_MESSAGE;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("alert-9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::InvalidRequest("zero".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 403,
                message: "not an operator".to_string()
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 502,
                message: "upstream".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_backend_unauthorized_forces_logout() {
        let response = AppError::Api(ApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<ForcedLogout>().is_some());
        assert_eq!(body_json(response).await["redirect"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_forbidden_is_a_toast_not_a_logout() {
        let response = AppError::Api(ApiError::Status {
            status: 403,
            message: "not an operator".to_string(),
        })
        .into_response();
        assert!(response.extensions().get::<ForcedLogout>().is_none());
        let body = body_json(response).await;
        assert_eq!(body["toast"]["kind"], "error");
        assert_eq!(body["toast"]["message"], GENERIC_ERROR_MESSAGE);
    }
}
