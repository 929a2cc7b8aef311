//! Home page and dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::OptionalUser;
use crate::routes::MessageQuery;
use crate::routes::restaurants::RestaurantView;
use crate::services::RestaurantService;
use crate::state::AppState;

/// Home page template.
///
/// Guests get the landing copy; a logged-in owner sees their restaurant (or
/// a registration prompt).
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub notice: Option<String>,
    pub alert: Option<String>,
    pub logged_in: bool,
    pub user_email: String,
    pub restaurant: Option<RestaurantView>,
}

/// Home page handler.
///
/// Admins land on the moderation listing instead.
pub async fn home(
    OptionalUser(user): OptionalUser,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(HomeTemplate {
            notice: query.notice,
            alert: query.alert,
            logged_in: false,
            user_email: String::new(),
            restaurant: None,
        }
        .into_response());
    };

    if user.is_admin() {
        return Ok(Redirect::to("/restaurants").into_response());
    }

    let service = RestaurantService::new(state.pool());
    let restaurant = service.owned_by(user.id).await?;

    Ok(HomeTemplate {
        notice: query.notice,
        alert: query.alert,
        logged_in: true,
        user_email: user.email.to_string(),
        restaurant: restaurant.as_ref().map(RestaurantView::from),
    }
    .into_response())
}
