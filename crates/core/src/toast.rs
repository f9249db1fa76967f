//! User-facing notification messages.
//!
//! Every operation outcome the customer or operator sees is a toast. Failures
//! carry a generic message; the cause is logged, never shown.

use serde::{Deserialize, Serialize};

/// Generic failure message shown for every non-auth error.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Toast flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

/// A short message displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    /// A success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    /// An error toast with the given message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    /// The error toast used for every unexpected failure.
    #[must_use]
    pub fn generic_error() -> Self {
        Self::error(GENERIC_ERROR_MESSAGE)
    }
}
