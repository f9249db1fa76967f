//! Admin endpoints: inventory and push-notification campaigns.
//!
//! Every call needs an operator token. Mutations return the updated entity;
//! callers re-fetch lists themselves.

mod inventory;
mod notifications;
