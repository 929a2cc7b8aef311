//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Pages
//! GET  /                            - Home / dashboard
//!
//! # Auth
//! GET  /login                       - Login page
//! POST /login                       - Login action
//! GET  /signup                      - Signup page
//! POST /signup                      - Signup action
//! POST /logout                      - Logout action
//!
//! # Password reset
//! GET  /password/new                - Forgot-password form
//! POST /password                    - Send reset email
//! GET  /password/edit               - New-password form (tokenized link)
//! POST /password/update             - Set the new password
//!
//! # Restaurants
//! GET  /restaurants                 - Listing with status counts (admin)
//! GET  /restaurants/new             - Registration form
//! POST /restaurants                 - Register a restaurant
//! GET  /restaurants/{id}            - Restaurant detail
//! GET  /restaurants/{id}/edit       - Edit form
//! POST /restaurants/{id}            - Update a restaurant
//! POST /restaurants/{id}/delete     - Delete a restaurant
//! POST /restaurants/{id}/approve    - Approve (admin)
//! POST /restaurants/{id}/suspend    - Suspend (admin)
//! ```

pub mod auth;
pub mod health;
pub mod pages;
pub mod passwords;
pub mod restaurants;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters for flash-style notices carried across redirects.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub notice: Option<String>,
    pub alert: Option<String>,
}

/// Build a redirect target carrying a flash notice.
#[must_use]
pub fn with_notice(path: &str, notice: &str) -> String {
    format!("{path}?notice={}", urlencoding::encode(notice))
}

/// Build a redirect target carrying a flash alert.
#[must_use]
pub fn with_alert(path: &str, alert: &str) -> String {
    format!("{path}?alert={}", urlencoding::encode(alert))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the password-reset routes router.
pub fn password_routes() -> Router<AppState> {
    Router::new()
        .route("/new", get(passwords::forgot_page))
        .route("/", post(passwords::send_reset))
        .route("/edit", get(passwords::edit_page))
        .route("/update", post(passwords::update))
}

/// Create the restaurant routes router.
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurants::index).post(restaurants::create))
        .route("/new", get(restaurants::new))
        .route("/{id}", get(restaurants::show).post(restaurants::update))
        .route("/{id}/edit", get(restaurants::edit))
        .route("/{id}/delete", post(restaurants::destroy))
        .route("/{id}/approve", post(restaurants::approve))
        .route("/{id}/suspend", post(restaurants::suspend))
}

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::ready))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_notice_encodes() {
        assert_eq!(
            with_notice("/restaurants/3", "Restaurant approved."),
            "/restaurants/3?notice=Restaurant%20approved."
        );
    }

    #[test]
    fn test_with_alert_encodes() {
        assert_eq!(
            with_alert("/", "You don't have permission to access this restaurant."),
            "/?alert=You%20don%27t%20have%20permission%20to%20access%20this%20restaurant."
        );
    }
}
