//! Password reset route handlers.
//!
//! The forgot-password flow is enumeration-safe: submitting any email shows
//! the same notice whether or not an account exists.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::db::users::UserRepository;
use crate::filters;
use crate::routes::{MessageQuery, with_alert, with_notice};
use crate::services::{AuthService, reset_token};
use crate::state::AppState;

const SENT_NOTICE: &str =
    "If an account exists for that email, password reset instructions have been sent.";

// =============================================================================
// Form and Query Types
// =============================================================================

/// Forgot-password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    #[serde(default)]
    pub email: String,
}

/// Tokenized link query.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: String,
}

/// New-password form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Forgot-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "passwords/new.html")]
pub struct ForgotPasswordTemplate {
    pub notice: Option<String>,
    pub alert: Option<String>,
}

/// New-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "passwords/edit.html")]
pub struct EditPasswordTemplate {
    pub token: String,
    pub errors: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the forgot-password form.
pub async fn forgot_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        notice: query.notice,
        alert: query.alert,
    }
}

/// Send a password reset email.
///
/// Responds with the same notice whether or not the account exists.
pub async fn send_reset(
    State(state): State<AppState>,
    Form(form): Form<ForgotForm>,
) -> Response {
    let users = UserRepository::new(state.pool());

    let Ok(email) = tabledesk_core::Email::parse(&form.email) else {
        return Redirect::to(&with_notice("/password/new", SENT_NOTICE)).into_response();
    };

    match users.get_by_email(&email).await {
        Ok(Some(user)) => {
            let secret = state.config().session_secret.expose_secret().as_bytes();
            let token = reset_token::issue(secret, user.id, Utc::now());
            let reset_url = format!(
                "{}/password/edit?token={}",
                state.config().base_url,
                urlencoding::encode(&token)
            );

            if let Err(e) = state
                .email()
                .send_password_reset(email.as_str(), &reset_url, reset_token::TOKEN_TTL_MINUTES)
                .await
            {
                tracing::error!("Failed to send password reset email: {e}");
                return Redirect::to(&with_alert(
                    "/password/new",
                    "We couldn't send the email right now. Please try again later.",
                ))
                .into_response();
            }
            tracing::info!(user_id = %user.id, "password reset email sent");
        }
        Ok(None) => {
            tracing::info!("password reset requested for unknown email");
        }
        Err(e) => {
            tracing::error!("Password reset lookup failed: {e}");
        }
    }

    Redirect::to(&with_notice("/password/new", SENT_NOTICE)).into_response()
}

/// Display the new-password form from a tokenized link.
pub async fn edit_page(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let secret = state.config().session_secret.expose_secret().as_bytes();
    match reset_token::verify(secret, &query.token, Utc::now()) {
        Ok(_) => EditPasswordTemplate {
            token: query.token,
            errors: Vec::new(),
        }
        .into_response(),
        Err(e) => {
            tracing::warn!("Rejected password reset link: {e}");
            Redirect::to(&with_alert(
                "/password/new",
                "That password reset link is invalid or has expired.",
            ))
            .into_response()
        }
    }
}

/// Set the new password.
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateForm>) -> Response {
    let secret = state.config().session_secret.expose_secret().as_bytes();
    let user_id = match reset_token::verify(secret, &form.token, Utc::now()) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!("Rejected password reset token: {e}");
            return Redirect::to(&with_alert(
                "/password/new",
                "That password reset link is invalid or has expired.",
            ))
            .into_response();
        }
    };

    let auth = AuthService::new(state.pool());
    match auth
        .reset_password(user_id, &form.password, &form.password_confirmation)
        .await
    {
        Ok(()) => {
            tracing::info!(user_id = %user_id, "password reset completed");
            Redirect::to(&with_notice(
                "/login",
                "Your password has been reset. Please log in.",
            ))
            .into_response()
        }
        Err(e) => EditPasswordTemplate {
            token: form.token,
            errors: e.form_messages(),
        }
        .into_response(),
    }
}
