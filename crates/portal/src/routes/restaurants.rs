//! Restaurant route handlers: registration, moderation, and profile CRUD.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use tabledesk_core::RestaurantId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::{RequireAdmin, RequireUser};
use crate::models::{Restaurant, RestaurantForm, User};
use crate::routes::{MessageQuery, with_alert, with_notice};
use crate::services::RestaurantService;
use crate::services::restaurants::{
    AccessError, AdminCreateError, RegistrationError, UpdateError,
};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Restaurant view for templates.
#[derive(Debug, Clone)]
pub struct RestaurantView {
    pub id: i32,
    pub name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub plan: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Restaurant> for RestaurantView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.as_i32(),
            name: restaurant.name.clone(),
            owner_name: restaurant.owner_name.clone(),
            email: restaurant.email.to_string(),
            phone: restaurant.phone.clone(),
            address: restaurant.address.clone(),
            plan: restaurant.plan.to_string(),
            status: restaurant.status.to_string(),
            created_at: restaurant.created_at,
        }
    }
}

/// Owner option for the admin registration form's picker.
#[derive(Debug, Clone)]
pub struct OwnerOption {
    pub id: i32,
    pub email: String,
}

impl From<&User> for OwnerOption {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.to_string(),
        }
    }
}

/// Submitted form values echoed back when re-rendering after a failure.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub plan: String,
    pub status: String,
    pub user_id: String,
    pub owner_email: String,
}

impl From<&RestaurantForm> for FormView {
    fn from(form: &RestaurantForm) -> Self {
        Self {
            name: form.name.clone(),
            owner_name: form.owner_name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            plan: form.plan.clone(),
            status: form.status.clone().unwrap_or_default(),
            user_id: form.user_id.map(|id| id.to_string()).unwrap_or_default(),
            owner_email: form.owner_email.clone().unwrap_or_default(),
        }
    }
}

impl From<&Restaurant> for FormView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            owner_name: restaurant.owner_name.clone(),
            email: restaurant.email.to_string(),
            phone: restaurant.phone.clone(),
            address: restaurant.address.clone(),
            plan: restaurant.plan.to_string(),
            status: restaurant.status.to_string(),
            user_id: String::new(),
            owner_email: String::new(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/index.html")]
pub struct IndexTemplate {
    pub notice: Option<String>,
    pub alert: Option<String>,
    pub restaurants: Vec<RestaurantView>,
    pub pending_count: i64,
    pub approved_count: i64,
    pub suspended_count: i64,
}

/// Registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/new.html")]
pub struct NewTemplate {
    pub is_admin: bool,
    pub owners: Vec<OwnerOption>,
    pub errors: Vec<String>,
    pub owner_errors: Vec<String>,
    pub form: FormView,
}

/// Restaurant detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/show.html")]
pub struct ShowTemplate {
    pub notice: Option<String>,
    pub alert: Option<String>,
    pub is_admin: bool,
    pub restaurant: RestaurantView,
}

/// Edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/edit.html")]
pub struct EditTemplate {
    pub is_admin: bool,
    pub id: i32,
    pub errors: Vec<String>,
    pub form: FormView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Admin listing with status counts.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<IndexTemplate, AppError> {
    let service = RestaurantService::new(state.pool());
    let (restaurants, counts) = service.list_with_counts().await?;

    Ok(IndexTemplate {
        notice: query.notice,
        alert: query.alert,
        restaurants: restaurants.iter().map(RestaurantView::from).collect(),
        pending_count: counts.pending,
        approved_count: counts.approved,
        suspended_count: counts.suspended,
    })
}

/// Registration form.
///
/// Admins get the owner picker (existing unassigned owners plus inline
/// creation); owners who already registered are redirected to their page.
pub async fn new(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    if user.is_admin() {
        let owners = service.unassigned_owners().await?;
        return Ok(NewTemplate {
            is_admin: true,
            owners: owners.iter().map(OwnerOption::from).collect(),
            errors: Vec::new(),
            owner_errors: Vec::new(),
            form: FormView::default(),
        }
        .into_response());
    }

    if let Some(existing) = service.owned_by(user.id).await? {
        return Ok(Redirect::to(&with_alert(
            &format!("/restaurants/{}", existing.id),
            "You already have a restaurant registered.",
        ))
        .into_response());
    }

    Ok(NewTemplate {
        is_admin: false,
        owners: Vec::new(),
        errors: Vec::new(),
        owner_errors: Vec::new(),
        form: FormView::default(),
    }
    .into_response())
}

/// Register a restaurant.
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    if user.is_admin() {
        return match service.admin_create(&user, &form).await {
            Ok(restaurant) => Ok(Redirect::to(&with_notice(
                &format!("/restaurants/{}", restaurant.id),
                "Restaurant was successfully created.",
            ))
            .into_response()),
            Err(AdminCreateError::Validation {
                restaurant_errors,
                owner_errors,
            }) => {
                let owners = service.unassigned_owners().await?;
                Ok(NewTemplate {
                    is_admin: true,
                    owners: owners.iter().map(OwnerOption::from).collect(),
                    errors: restaurant_errors,
                    owner_errors,
                    form: FormView::from(&form),
                }
                .into_response())
            }
            Err(AdminCreateError::Repository(e)) => Err(e.into()),
        };
    }

    match service.owner_create(&user, &form).await {
        Ok(restaurant) => Ok(Redirect::to(&with_notice(
            &format!("/restaurants/{}", restaurant.id),
            "Your restaurant has been registered and is pending review.",
        ))
        .into_response()),
        Err(RegistrationError::Denied(denial)) => {
            Ok(Redirect::to(&with_alert(&denial.redirect_to, denial.message)).into_response())
        }
        Err(RegistrationError::Validation(errors)) => Ok(NewTemplate {
            is_admin: false,
            owners: Vec::new(),
            errors,
            owner_errors: Vec::new(),
            form: FormView::from(&form),
        }
        .into_response()),
        Err(RegistrationError::Repository(e)) => Err(e.into()),
    }
}

/// Restaurant detail page.
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service
        .get_for(&user, RestaurantId::new(id), crate::policy::RestaurantAction::Show)
        .await
    {
        Ok(restaurant) => Ok(ShowTemplate {
            notice: query.notice,
            alert: query.alert,
            is_admin: user.is_admin(),
            restaurant: RestaurantView::from(&restaurant),
        }
        .into_response()),
        Err(e) => access_failure(e),
    }
}

/// Edit form, prefilled from the current record.
pub async fn edit(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service
        .get_for(&user, RestaurantId::new(id), crate::policy::RestaurantAction::Edit)
        .await
    {
        Ok(restaurant) => Ok(EditTemplate {
            is_admin: user.is_admin(),
            id,
            errors: Vec::new(),
            form: FormView::from(&restaurant),
        }
        .into_response()),
        Err(e) => access_failure(e),
    }
}

/// Update a restaurant.
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service.update(&user, RestaurantId::new(id), &form).await {
        Ok(restaurant) => Ok(Redirect::to(&with_notice(
            &format!("/restaurants/{}", restaurant.id),
            "Restaurant was successfully updated.",
        ))
        .into_response()),
        Err(UpdateError::NotFound) => {
            Err(AppError::NotFound(format!("restaurant {id}")))
        }
        Err(UpdateError::Denied(denial)) => {
            Ok(Redirect::to(&with_alert(&denial.redirect_to, denial.message)).into_response())
        }
        Err(UpdateError::Validation(errors)) => Ok(EditTemplate {
            is_admin: user.is_admin(),
            id,
            errors,
            form: FormView::from(&form),
        }
        .into_response()),
        Err(UpdateError::Repository(e)) => Err(e.into()),
    }
}

/// Delete a restaurant.
pub async fn destroy(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service.destroy(&user, RestaurantId::new(id)).await {
        Ok(()) => {
            let target = if user.is_admin() { "/restaurants" } else { "/" };
            Ok(Redirect::to(&with_notice(target, "Restaurant was successfully deleted."))
                .into_response())
        }
        Err(e) => access_failure(e),
    }
}

/// Approve a restaurant (admin moderation action).
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service.approve(&admin, RestaurantId::new(id)).await {
        Ok(()) => {
            Ok(Redirect::to(&with_notice("/restaurants", "Restaurant approved.")).into_response())
        }
        Err(crate::db::RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("restaurant {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Suspend a restaurant (admin moderation action).
pub async fn suspend(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let service = RestaurantService::new(state.pool());

    match service.suspend(&admin, RestaurantId::new(id)).await {
        Ok(()) => {
            Ok(Redirect::to(&with_notice("/restaurants", "Restaurant suspended.")).into_response())
        }
        Err(crate::db::RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("restaurant {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Map an access failure to its response: unknown IDs 404, denials redirect
/// with a flash, database errors bubble to [`AppError`].
fn access_failure(e: AccessError) -> Result<Response, AppError> {
    match e {
        AccessError::NotFound => Err(AppError::NotFound("restaurant".to_owned())),
        AccessError::Denied(denial) => {
            Ok(Redirect::to(&with_alert(&denial.redirect_to, denial.message)).into_response())
        }
        AccessError::Repository(e) => Err(e.into()),
    }
}
