//! Domain types for the portal.
//!
//! These types represent validated domain objects separate from database row
//! types and from raw form input.

pub mod restaurant;
pub mod session;
pub mod user;

pub use restaurant::{Restaurant, RestaurantForm, RestaurantProfile};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
