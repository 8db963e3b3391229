use super::pagination::{self, PageMeta};
use super::{Direction, EventQuery, OrderField, Ordering, Predicate, RangeBound, TextField};
use crate::models::Event;
use crate::store::{self, EventStore};
use serde::Serialize;

const TEXT_FIELDS: &[TextField] = &[TextField::Title, TextField::Description];
const LOCATION_FIELD: &[TextField] = &[TextField::Location];

#[derive(Debug, Serialize)]
pub struct EventPage {
    pub items: Vec<Event>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// One predicate per present field, in a fixed order.
pub fn build_predicates(query: &EventQuery) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(q) = &query.q {
        predicates.push(Predicate::TextMatch {
            fields: TEXT_FIELDS,
            needle: q.clone(),
        });
    }
    if let Some(location) = &query.location {
        predicates.push(Predicate::TextMatch {
            fields: LOCATION_FIELD,
            needle: location.clone(),
        });
    }
    if let Some(from) = query.date_from {
        predicates.push(Predicate::RangeMin(RangeBound::Datetime(from)));
    }
    if let Some(to) = query.date_to {
        predicates.push(Predicate::RangeMax(RangeBound::Datetime(to)));
    }
    if let Some(min) = query.min_price {
        predicates.push(Predicate::RangeMin(RangeBound::Price(min)));
    }
    if let Some(max) = query.max_price {
        predicates.push(Predicate::RangeMax(RangeBound::Price(max)));
    }

    predicates
}

/// Searches list soonest events first; an unfiltered listing shows the most
/// recently created first.
pub fn ordering_for(predicates: &[Predicate]) -> Ordering {
    if predicates.is_empty() {
        Ordering {
            field: OrderField::CreatedAt,
            direction: Direction::Desc,
        }
    } else {
        Ordering {
            field: OrderField::Datetime,
            direction: Direction::Asc,
        }
    }
}

pub async fn search(store: &dyn EventStore, query: &EventQuery) -> store::Result<EventPage> {
    let predicates = build_predicates(query);
    let ordering = ordering_for(&predicates);
    let offset = pagination::offset(query.page, query.limit);

    let (items, total) = store
        .find(&predicates, ordering, offset, query.limit)
        .await?;

    Ok(EventPage {
        items,
        meta: PageMeta::new(total, query.page, query.limit),
    })
}
