use super::{DEFAULT_LIMIT, DEFAULT_PAGE, EventQuery, MAX_LIMIT, RawEventQuery};
use crate::money;
use crate::validation::{FieldError, ValidationErrors};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

#[derive(Clone, Copy)]
enum DateEdge {
    StartOfDay,
    EndOfDay,
}

pub fn normalize(raw: RawEventQuery) -> Result<EventQuery, ValidationErrors> {
    let mut errors = Vec::new();

    let date_from = parse_date(raw.date_from, "dateFrom", DateEdge::StartOfDay, &mut errors);
    let date_to = parse_date(raw.date_to, "dateTo", DateEdge::EndOfDay, &mut errors);
    let min_price = parse_price(raw.min_price, "minPrice", &mut errors);
    let max_price = parse_price(raw.max_price, "maxPrice", &mut errors);

    let page = match present(raw.page) {
        None => DEFAULT_PAGE,
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.push(FieldError::InvalidPage);
                DEFAULT_PAGE
            }
        },
    };
    let limit = match present(raw.limit) {
        None => DEFAULT_LIMIT,
        Some(s) => match s.parse::<u32>() {
            Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
            _ => {
                errors.push(FieldError::InvalidLimit);
                DEFAULT_LIMIT
            }
        },
    };

    ValidationErrors::check(errors)?;

    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(FieldError::DateRangeInverted.into());
        }
    }

    Ok(EventQuery {
        q: present(raw.q),
        location: present(raw.location),
        date_from,
        date_to,
        min_price,
        max_price,
        page,
        limit,
    })
}

/// Trimmed value, with empty input treated as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(
    value: Option<String>,
    field: &'static str,
    edge: DateEdge,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    let raw = present(value)?;
    let parsed = if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        resolve_day(date, edge)
    } else {
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };
    if parsed.is_none() {
        errors.push(FieldError::InvalidDate { field });
    }
    parsed
}

/// A bare date covers the whole UTC day, so both bounds stay inclusive.
fn resolve_day(date: NaiveDate, edge: DateEdge) -> Option<DateTime<Utc>> {
    let start = date.and_hms_opt(0, 0, 0)?;
    let instant = match edge {
        DateEdge::StartOfDay => start,
        DateEdge::EndOfDay => start
            .checked_add_signed(TimeDelta::days(1))?
            .checked_sub_signed(TimeDelta::milliseconds(1))?,
    };
    Some(instant.and_utc())
}

fn parse_price(
    value: Option<String>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let raw = present(value)?;
    let cents = money::parse_minor_units(&raw);
    if cents.is_none() {
        errors.push(FieldError::InvalidNumber { field });
    }
    cents
}
