//! Restaurant domain types and form validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tabledesk_core::{Email, Plan, RestaurantId, RestaurantStatus, UserId};

/// A restaurant registration (domain type).
#[derive(Debug, Clone)]
pub struct Restaurant {
    /// Unique restaurant ID.
    pub id: RestaurantId,
    /// Restaurant display name.
    pub name: String,
    /// Name of the person running the restaurant.
    pub owner_name: String,
    /// Contact email, unique across all restaurants.
    pub email: Email,
    /// Contact phone number.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// Subscription plan.
    pub plan: Plan,
    /// Moderation lifecycle status.
    pub status: RestaurantStatus,
    /// The user who owns this restaurant (one restaurant per user).
    pub owner_user_id: UserId,
    /// When the restaurant was registered.
    pub created_at: DateTime<Utc>,
    /// When the restaurant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Whether the restaurant has been approved.
    #[must_use]
    pub fn approved(&self) -> bool {
        self.status == RestaurantStatus::Approved
    }

    /// Whether the restaurant is awaiting review.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.status == RestaurantStatus::Pending
    }

    /// Whether the restaurant has been suspended.
    #[must_use]
    pub fn suspended(&self) -> bool {
        self.status == RestaurantStatus::Suspended
    }

    /// Whether the restaurant is live.
    ///
    /// Statuses are mutually exclusive, so this is equivalent to
    /// [`Restaurant::approved`]; external callers depend on this exact
    /// signature, so it is kept alongside the plain predicate.
    #[must_use]
    pub fn active(&self) -> bool {
        self.approved() && !self.suspended()
    }
}

/// Validated restaurant profile fields, ready to persist.
///
/// Produced by [`RestaurantForm::validate`]. Lifecycle status is not part of
/// the profile: it is resolved separately by the authorization policy so a
/// submitted status can never bypass it.
#[derive(Debug, Clone)]
pub struct RestaurantProfile {
    pub name: String,
    pub owner_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub plan: Plan,
}

/// Raw restaurant form input, as submitted.
///
/// All fields default so a partially filled form still deserializes and can
/// be re-rendered with what the user typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub plan: String,
    /// Submitted lifecycle status. Dropped for non-admin actors.
    #[serde(default)]
    pub status: Option<String>,
    /// Existing owner selected by an admin, if any. Browsers submit the
    /// picker's blank option as an empty string, which reads as `None`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<i32>,
    /// Inline new-owner email (admin create only).
    #[serde(default)]
    pub owner_email: Option<String>,
    /// Inline new-owner password (admin create only).
    #[serde(default)]
    pub owner_password: Option<String>,
    #[serde(default)]
    pub owner_password_confirmation: Option<String>,
}

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 255;
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 20;
const ADDRESS_MIN: usize = 10;
const ADDRESS_MAX: usize = 1000;

impl RestaurantForm {
    /// Validate the profile fields.
    ///
    /// # Errors
    ///
    /// Returns the full list of field error messages when any field is out
    /// of range or malformed.
    pub fn validate(&self) -> Result<RestaurantProfile, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if !char_len_in(name, NAME_MIN, NAME_MAX) {
            errors.push(format!(
                "Name must be between {NAME_MIN} and {NAME_MAX} characters."
            ));
        }

        let owner_name = self.owner_name.trim();
        if !char_len_in(owner_name, NAME_MIN, NAME_MAX) {
            errors.push(format!(
                "Owner name must be between {NAME_MIN} and {NAME_MAX} characters."
            ));
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(format!("Email {e}."));
                None
            }
        };

        let phone = self.phone.trim();
        if !char_len_in(phone, PHONE_MIN, PHONE_MAX) {
            errors.push(format!(
                "Phone must be between {PHONE_MIN} and {PHONE_MAX} characters."
            ));
        }

        let address = self.address.trim();
        if !char_len_in(address, ADDRESS_MIN, ADDRESS_MAX) {
            errors.push(format!(
                "Address must be between {ADDRESS_MIN} and {ADDRESS_MAX} characters."
            ));
        }

        let plan = match self.plan.parse::<Plan>() {
            Ok(plan) => Some(plan),
            Err(_) => {
                errors.push("Plan is not included in the list.".to_owned());
                None
            }
        };

        match (email, plan) {
            (Some(email), Some(plan)) if errors.is_empty() => Ok(RestaurantProfile {
                name: name.to_owned(),
                owner_name: owner_name.to_owned(),
                email,
                phone: phone.to_owned(),
                address: address.to_owned(),
                plan,
            }),
            _ => Err(errors),
        }
    }

    /// Parse the submitted lifecycle status, if any.
    ///
    /// # Errors
    ///
    /// Returns a field error message when a status was submitted but is not
    /// one of the known states.
    pub fn submitted_status(&self) -> Result<Option<RestaurantStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<RestaurantStatus>()
                .map(Some)
                .map_err(|_| "Status is not included in the list.".to_owned()),
        }
    }
}

fn char_len_in(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    len >= min && len <= max
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i32>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> RestaurantForm {
        RestaurantForm {
            name: "Blue Fig".to_owned(),
            owner_name: "Dana Halabi".to_owned(),
            email: "hello@bluefig.example.com".to_owned(),
            phone: "+1 555 010 0199".to_owned(),
            address: "12 Harbour Street, Portsmouth".to_owned(),
            plan: "free".to_owned(),
            ..RestaurantForm::default()
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let profile = valid_form().validate().unwrap();
        assert_eq!(profile.name, "Blue Fig");
        assert_eq!(profile.email.as_str(), "hello@bluefig.example.com");
        assert_eq!(profile.plan, Plan::Free);
    }

    #[test]
    fn test_email_is_normalized() {
        let mut form = valid_form();
        form.email = "  Hello@BlueFig.Example.COM ".to_owned();
        let profile = form.validate().unwrap();
        assert_eq!(profile.email.as_str(), "hello@bluefig.example.com");
    }

    #[test]
    fn test_name_length_bounds() {
        let mut form = valid_form();
        form.name = "B".to_owned();
        assert!(form.validate().is_err());

        form.name = "B".repeat(255);
        assert!(form.validate().is_ok());

        form.name = "B".repeat(256);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_phone_is_trimmed_and_bounded() {
        let mut form = valid_form();
        form.phone = "  5550100199  ".to_owned();
        let profile = form.validate().unwrap();
        assert_eq!(profile.phone, "5550100199");

        form.phone = "123".to_owned();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_address_length_bounds() {
        let mut form = valid_form();
        form.address = "too short".to_owned();
        assert!(form.validate().is_err());

        form.address = "a".repeat(1001);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_invalid_plan_rejected() {
        let mut form = valid_form();
        form.plan = "enterprise".to_owned();
        let errors = form.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Plan")));
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut form = valid_form();
        form.name = String::new();
        form.email = "nope".to_owned();
        form.phone = "123".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_submitted_status_parsing() {
        let mut form = valid_form();
        assert_eq!(form.submitted_status().unwrap(), None);

        form.status = Some("approved".to_owned());
        assert_eq!(
            form.submitted_status().unwrap(),
            Some(RestaurantStatus::Approved)
        );

        form.status = Some(String::new());
        assert_eq!(form.submitted_status().unwrap(), None);

        form.status = Some("live".to_owned());
        assert!(form.submitted_status().is_err());
    }

    #[test]
    fn test_blank_owner_picker_reads_as_none() {
        let form: RestaurantForm = serde_json::from_str(r#"{"user_id": ""}"#).unwrap();
        assert_eq!(form.user_id, None);

        let form: RestaurantForm = serde_json::from_str(r#"{"user_id": "7"}"#).unwrap();
        assert_eq!(form.user_id, Some(7));
    }

    #[test]
    fn test_predicates() {
        use chrono::Utc;
        use tabledesk_core::{RestaurantId, UserId};

        let mut restaurant = Restaurant {
            id: RestaurantId::new(1),
            name: "Blue Fig".to_owned(),
            owner_name: "Dana Halabi".to_owned(),
            email: Email::parse("hello@bluefig.example.com").unwrap(),
            phone: "5550100199".to_owned(),
            address: "12 Harbour Street, Portsmouth".to_owned(),
            plan: Plan::Free,
            status: RestaurantStatus::Pending,
            owner_user_id: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(restaurant.pending());
        assert!(!restaurant.active());

        restaurant.status = RestaurantStatus::Approved;
        assert!(restaurant.approved());
        assert!(restaurant.active());

        restaurant.status = RestaurantStatus::Suspended;
        assert!(restaurant.suspended());
        assert!(!restaurant.active());
    }
}
