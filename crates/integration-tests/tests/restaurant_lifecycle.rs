//! Integration tests for restaurant persistence guarantees.
//!
//! These tests require a running `PostgreSQL` database reachable via
//! `DATABASE_URL`. Run with:
//!
//! ```bash
//! cargo test -p tabledesk-integration-tests -- --ignored
//! ```

use tabledesk_core::RestaurantStatus;
use tabledesk_portal::db::RepositoryError;
use tabledesk_portal::db::restaurants::RestaurantRepository;
use tabledesk_portal::models::RestaurantForm;
use tabledesk_portal::services::RestaurantService;
use tabledesk_portal::services::restaurants::{AdminCreateError, RegistrationError};

use tabledesk_integration_tests::TestContext;

/// A form that passes validation, with a unique restaurant email.
fn sample_form(email: &str) -> RestaurantForm {
    RestaurantForm {
        name: "Blue Fig".to_owned(),
        owner_name: "Dana Halabi".to_owned(),
        email: email.to_owned(),
        phone: "+1 555 010 0199".to_owned(),
        address: "12 Harbour Street, Portsmouth".to_owned(),
        plan: "free".to_owned(),
        ..RestaurantForm::default()
    }
}

// ============================================================================
// Owner registration
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DATABASE_URL)"]
async fn test_second_registration_rejected_without_persisting() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner().await;
    let service = RestaurantService::new(&ctx.pool);

    service
        .owner_create(&owner, &sample_form(&TestContext::unique_email("first")))
        .await
        .expect("first registration should succeed");

    let err = service
        .owner_create(&owner, &sample_form(&TestContext::unique_email("second")))
        .await
        .expect_err("second registration must be rejected");
    assert!(matches!(err, RegistrationError::Denied(_)));

    assert_eq!(ctx.restaurant_count_for(owner.id).await, 1);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DATABASE_URL)"]
async fn test_owner_registration_lands_pending() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner().await;
    let service = RestaurantService::new(&ctx.pool);

    let mut form = sample_form(&TestContext::unique_email("sneaky"));
    form.status = Some("approved".to_owned());

    let restaurant = service
        .owner_create(&owner, &form)
        .await
        .expect("registration should succeed");
    assert_eq!(restaurant.status, RestaurantStatus::Pending);
}

// ============================================================================
// Admin registration pipeline
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DATABASE_URL)"]
async fn test_failed_admin_create_rolls_back_inline_owner() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_admin().await;
    let service = RestaurantService::new(&ctx.pool);

    let owner_email = TestContext::unique_email("inline-owner");
    let mut form = sample_form(&TestContext::unique_email("invalid"));
    form.name = "x".to_owned(); // fails the length check
    form.owner_email = Some(owner_email.clone());
    form.owner_password = Some("Str0ng-pass!".to_owned());
    form.owner_password_confirmation = Some("Str0ng-pass!".to_owned());

    let err = service
        .admin_create(&admin, &form)
        .await
        .expect_err("invalid restaurant fields must fail the pipeline");
    match err {
        AdminCreateError::Validation {
            restaurant_errors, ..
        } => assert!(!restaurant_errors.is_empty()),
        other => panic!("expected validation failure, got {other}"),
    }

    // The inline owner account was created inside the transaction and must
    // not survive the rollback.
    assert!(!ctx.user_exists(&owner_email).await);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DATABASE_URL)"]
async fn test_admin_cannot_attach_to_owner_with_restaurant() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner().await;
    let admin = ctx.create_admin().await;
    let service = RestaurantService::new(&ctx.pool);

    service
        .owner_create(&owner, &sample_form(&TestContext::unique_email("existing")))
        .await
        .expect("first registration should succeed");

    let mut form = sample_form(&TestContext::unique_email("attach"));
    form.user_id = Some(owner.id.as_i32());

    let err = service
        .admin_create(&admin, &form)
        .await
        .expect_err("attaching to an owning user must be rejected");
    match err {
        AdminCreateError::Validation { owner_errors, .. } => {
            assert!(
                owner_errors
                    .iter()
                    .any(|m| m.contains("already has a restaurant"))
            );
        }
        other => panic!("expected validation failure, got {other}"),
    }

    assert_eq!(ctx.restaurant_count_for(owner.id).await, 1);
}

// ============================================================================
// Unique-index race path
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DATABASE_URL)"]
async fn test_duplicate_owner_insert_surfaces_conflict() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner().await;
    let repo = RestaurantRepository::new(&ctx.pool);

    let first = sample_form(&TestContext::unique_email("race-a"))
        .validate()
        .expect("fixture form is valid");
    repo.create(owner.id, &first, RestaurantStatus::Pending)
        .await
        .expect("first insert should succeed");

    // Bypass the service-level ownership check, as a lost race would.
    let second = sample_form(&TestContext::unique_email("race-b"))
        .validate()
        .expect("fixture form is valid");
    let err = repo
        .create(owner.id, &second, RestaurantStatus::Pending)
        .await
        .expect_err("unique index must reject the second insert");
    match err {
        RepositoryError::Conflict(message) => {
            assert_eq!(message, "This user already has a restaurant registered.");
        }
        other => panic!("expected conflict, got {other}"),
    }

    assert_eq!(ctx.restaurant_count_for(owner.id).await, 1);
}
