use crate::validation::{WriteContext, event_datetime, not_blank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub capacity: i64,
    /// Cents.
    pub price_per_person: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new event. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub capacity: i64,
    pub price_per_person: i64,
}

/// Validated partial update. `None` leaves the stored value alone, except
/// `description: Some(None)` which clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub datetime: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
    pub price_per_person: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(context = WriteContext)]
pub struct CreateEventPayload {
    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 200, code = "too_long")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000, code = "too_long"))]
    pub description: Option<String>,
    #[validate(required, custom(function = "event_datetime", use_context))]
    pub datetime: Option<String>,
    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 200, code = "too_long")
    )]
    pub location: Option<String>,
    #[validate(required, range(min = 1, code = "not_positive"))]
    pub capacity: Option<i64>,
    #[validate(required, range(min = 0, code = "negative"))]
    pub price_per_person: Option<i64>,
}

/// Same rules as [`CreateEventPayload`], every field optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(context = WriteContext)]
pub struct UpdateEventPayload {
    #[validate(custom(function = "not_blank"), length(max = 200, code = "too_long"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, code = "too_long"))]
    pub description: Option<String>,
    #[validate(custom(function = "event_datetime", use_context))]
    pub datetime: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 200, code = "too_long"))]
    pub location: Option<String>,
    #[validate(range(min = 1, code = "not_positive"))]
    pub capacity: Option<i64>,
    #[validate(range(min = 0, code = "negative"))]
    pub price_per_person: Option<i64>,
}
