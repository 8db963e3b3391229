use crate::models::{CreateEventPayload, EventPatch, NewEvent, UpdateEventPayload};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;
use validator::{ValidateArgs, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be an ISO-8601 datetime")]
    InvalidDatetime { field: &'static str },
    #[error("{field} cannot be in the past")]
    InPast { field: &'static str },
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },
    #[error("{field} must be non-negative")]
    Negative { field: &'static str },
    #[error("{field} is invalid")]
    Invalid { field: &'static str },
    #[error("{field} is not a valid date")]
    InvalidDate { field: &'static str },
    #[error("{field} must be a non-negative number")]
    InvalidNumber { field: &'static str },
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("limit must be an integer between 1 and 100")]
    InvalidLimit,
    #[error("dateFrom must be before or equal to dateTo")]
    DateRangeInverted,
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::InvalidDatetime { field }
            | Self::InPast { field }
            | Self::NotPositive { field }
            | Self::Negative { field }
            | Self::Invalid { field }
            | Self::InvalidDate { field }
            | Self::InvalidNumber { field } => field,
            Self::InvalidPage => "page",
            Self::InvalidLimit => "limit",
            Self::DateRangeInverted => "dateFrom",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::TooLong { .. } => "too_long",
            Self::InvalidDatetime { .. } => "invalid_datetime",
            Self::InPast { .. } => "in_past",
            Self::NotPositive { .. } => "not_positive",
            Self::Negative { .. } => "negative",
            Self::Invalid { .. } => "invalid",
            Self::InvalidDate { .. } => "invalid_date",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::InvalidPage => "invalid_page",
            Self::InvalidLimit => "invalid_limit",
            Self::DateRangeInverted => "date_range_inverted",
        }
    }

    fn from_rule(field: &'static str, error: &ValidationError) -> Self {
        match error.code.as_ref() {
            "required" => Self::Required { field },
            "too_long" => Self::TooLong {
                field,
                max: error
                    .params
                    .get("max")
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|max| usize::try_from(max).ok())
                    .unwrap_or_default(),
            },
            "invalid_datetime" => Self::InvalidDatetime { field },
            "in_past" => Self::InPast { field },
            "not_positive" => Self::NotPositive { field },
            "negative" => Self::Negative { field },
            _ => Self::Invalid { field },
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FieldError", 3)?;
        s.serialize_field("field", self.field())?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// One or more field errors. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("validation failed with {} error(s)", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// `Ok(())` when nothing was collected.
    pub fn check(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() { Ok(()) } else { Err(Self(errors)) }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

/// Payload fields in reporting order: (struct field, JSON name).
const WRITE_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("description", "description"),
    ("datetime", "datetime"),
    ("location", "location"),
    ("capacity", "capacity"),
    ("price_per_person", "pricePerPerson"),
];

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(report: validator::ValidationErrors) -> Self {
        let by_field = report.field_errors();
        let errors = WRITE_FIELDS
            .iter()
            .filter_map(|&(name, field)| {
                let errors = by_field.get(name).or_else(|| by_field.get(field))?;
                Some((field, errors))
            })
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError::from_rule(field, e))
            })
            .collect();
        Self(errors)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventPolicy {
    pub reject_past_datetimes: bool,
}

/// What write rules are checked against.
#[derive(Debug, Clone, Copy)]
pub struct WriteContext {
    pub policy: EventPolicy,
    pub now: DateTime<Utc>,
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn event_datetime(value: &str, ctx: &WriteContext) -> Result<(), ValidationError> {
    let datetime =
        parse_datetime(value).ok_or_else(|| ValidationError::new("invalid_datetime"))?;
    if ctx.policy.reject_past_datetimes && datetime <= ctx.now {
        return Err(ValidationError::new("in_past"));
    }
    Ok(())
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Empty or blank clears the description.
fn description(value: String) -> Option<String> {
    Some(trimmed(value)).filter(|d| !d.is_empty())
}

pub fn validate_new_event(
    payload: CreateEventPayload,
    ctx: &WriteContext,
) -> Result<NewEvent, ValidationErrors> {
    payload.validate_with_args(ctx)?;
    match (
        payload.title,
        payload.datetime.as_deref().and_then(parse_datetime),
        payload.location,
        payload.capacity,
        payload.price_per_person,
    ) {
        (Some(title), Some(datetime), Some(location), Some(capacity), Some(price_per_person)) => {
            Ok(NewEvent {
                title: trimmed(title),
                description: payload.description.and_then(description),
                datetime,
                location: trimmed(location),
                capacity,
                price_per_person,
            })
        }
        // the derive rejects every missing field above
        _ => Err(FieldError::Invalid { field: "event" }.into()),
    }
}

/// Validates only the fields present in `payload`. An empty `description`
/// clears the stored one.
pub fn validate_patch(
    payload: UpdateEventPayload,
    ctx: &WriteContext,
) -> Result<EventPatch, ValidationErrors> {
    payload.validate_with_args(ctx)?;
    Ok(EventPatch {
        title: payload.title.map(trimmed),
        description: payload.description.map(description),
        datetime: payload.datetime.as_deref().and_then(parse_datetime),
        location: payload.location.map(trimmed),
        capacity: payload.capacity,
        price_per_person: payload.price_per_person,
    })
}
