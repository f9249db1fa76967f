//! Admin domain models.
//!
//! Everything the dashboard displays comes from `maison_core`; the only local
//! model is the operator identity kept in the session.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
