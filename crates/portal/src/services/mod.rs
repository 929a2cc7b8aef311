//! Business logic services.

pub mod auth;
pub mod email;
pub mod reset_token;
pub mod restaurants;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use restaurants::RestaurantService;
