//! HTTP route handlers for the storefront.
//!
//! Every route answers JSON view models for the rendering shell.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                          - Home page (featured, new arrivals)
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (backend reachable)
//!
//! # Products
//! GET    /products                  - Listing (?category&line&search&sort&colors&materials&all)
//! GET    /products/instant          - Provisional local search over the last listing
//! GET    /products/{id}             - Product detail with related products
//!
//! # Bag
//! GET    /bag                       - Bag contents
//! POST   /bag/items                 - Add a product in a size
//! PATCH  /bag/items                 - Change a line's quantity (<= 0 removes)
//! DELETE /bag/items                 - Remove a line
//! GET    /bag/count                 - Badge count
//!
//! # Checkout
//! POST   /checkout                  - Hand the bag to the payment processor
//!
//! # Auth (rate limited)
//! GET    /auth/login                - Sign-in screen data
//! POST   /auth/login                - Email and password
//! POST   /auth/google               - Google ID token
//! POST   /auth/apple                - Apple identity token
//! POST   /auth/register             - New local account
//! POST   /auth/logout               - Sign out (bag kept)
//! GET    /auth/me                   - Current user
//!
//! # Account (requires sign-in)
//! GET    /account                   - Profile
//! PATCH  /account/profile           - Update profile
//! GET    /account/orders            - Order history
//! GET    /account/addresses         - Address book
//! POST   /account/addresses         - Add address
//! PUT    /account/addresses/{id}    - Replace address
//! DELETE /account/addresses/{id}    - Delete address
//! GET    /account/saved-items       - Wishlist
//! POST   /account/saved-items       - Save for later
//! DELETE /account/saved-items/{id}  - Remove saved item
//! PATCH  /account/saved-items/{id}/status - Change saved item status
//! ```

pub mod account;
pub mod auth;
pub mod bag;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/instant", get(products::instant))
        .route("/{id}", get(products::show))
}

/// Create the bag routes router.
pub fn bag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bag::show))
        .route("/items", post(bag::add).patch(bag::update).delete(bag::remove))
        .route("/count", get(bag::count))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/google", post(auth::google))
        .route("/apple", post(auth::apple))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/profile", patch(account::update_profile))
        .route("/orders", get(account::orders))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route(
            "/saved-items",
            get(account::saved_items).post(account::save_item),
        )
        .route("/saved-items/{id}", delete(account::remove_saved_item))
        .route(
            "/saved-items/{id}/status",
            patch(account::set_saved_item_status),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/bag", bag_routes().layer(api_rate_limiter()))
        .route("/checkout", post(checkout::start).layer(api_rate_limiter()))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
}
