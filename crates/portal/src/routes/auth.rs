//! Authentication route handlers: login, signup, logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::{MessageQuery, with_alert, with_notice};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub notice: Option<String>,
    pub alert: Option<String>,
    pub email: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub errors: Vec<String>,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        notice: query.notice,
        alert: query.alert,
        email: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email,
                role: user.role,
            };
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to(&with_alert("/login", "Something went wrong. Please try again."))
                    .into_response();
            }
            set_sentry_user(current.id.as_i32(), Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "user logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            LoginTemplate {
                notice: None,
                alert: Some("Invalid email or password.".to_owned()),
                email: form.email,
            }
            .into_response()
        }
    }
}

/// Display the signup page.
pub async fn signup_page() -> impl IntoResponse {
    SignupTemplate {
        errors: Vec::new(),
        email: String::new(),
    }
}

/// Handle signup form submission.
///
/// New accounts are restaurant owners; admins are provisioned out of band.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth
        .signup(&form.email, &form.password, &form.password_confirmation)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email,
                role: user.role,
            };
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to(&with_alert("/login", "Account created. Please log in."))
                    .into_response();
            }
            set_sentry_user(current.id.as_i32(), Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "user signed up");
            Redirect::to(&with_notice("/", "Welcome! Your account has been created."))
                .into_response()
        }
        Err(e) => SignupTemplate {
            errors: e.form_messages(),
            email: form.email,
        }
        .into_response(),
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    Redirect::to(&with_notice("/login", "You have been logged out.")).into_response()
}
