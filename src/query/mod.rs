pub mod executor;
pub mod normalize;
pub mod pagination;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Query-string input exactly as received. Nothing here is trusted yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated search criteria and page window.
///
/// Prices are cents. When both dates are set, `date_from <= date_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    pub page: u32,
    pub limit: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            q: None,
            location: None,
            date_from: None,
            date_to: None,
            min_price: None,
            max_price: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Location,
}

impl TextField {
    /// Lowercased copy of the field that text search runs against.
    pub fn folded_column(self) -> &'static str {
        match self {
            Self::Title => "title_folded",
            Self::Description => "description_folded",
            Self::Location => "location_folded",
        }
    }
}

/// Inclusive bound on a comparable column. The variant names the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Datetime(DateTime<Utc>),
    Price(i64),
}

impl RangeBound {
    pub fn column(self) -> &'static str {
        match self {
            Self::Datetime(_) => "datetime",
            Self::Price(_) => "price_per_person",
        }
    }
}

/// One filter condition. A query's predicates are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on any of `fields`.
    TextMatch {
        fields: &'static [TextField],
        needle: String,
    },
    RangeMin(RangeBound),
    RangeMax(RangeBound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Datetime,
    CreatedAt,
}

impl OrderField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub direction: Direction,
}
