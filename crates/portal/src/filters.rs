//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format a timestamp as a short human-readable date.
///
/// Usage in templates: `{{ restaurant.created_at|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%b %-d, %Y").to_string())
}
