use super::{EventStore, Result, StoreError};
use crate::models::{Event, EventPatch, NewEvent};
use crate::query::{Direction, OrderField, Ordering, Predicate, RangeBound, TextField};
use async_trait::async_trait;
use chrono::Utc;
use nanoid::nanoid;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Store for tests. Events are kept in insertion order, which also breaks
/// ties when sorting, the same way rowid does in SQLite.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
    fail_next: AtomicBool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with a database error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, AtomicOrdering::SeqCst);
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next.swap(false, AtomicOrdering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl EventPatch {
    fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(datetime) = self.datetime {
            event.datetime = datetime;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(price) = self.price_per_person {
            event.price_per_person = price;
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_of(event: &Event, field: TextField) -> &str {
    match field {
        TextField::Title => &event.title,
        TextField::Description => event.description.as_deref().unwrap_or(""),
        TextField::Location => &event.location,
    }
}

fn matches(event: &Event, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::TextMatch { fields, needle } => fields
            .iter()
            .any(|f| contains_ci(text_of(event, *f), needle)),
        Predicate::RangeMin(RangeBound::Datetime(min)) => event.datetime >= *min,
        Predicate::RangeMax(RangeBound::Datetime(max)) => event.datetime <= *max,
        Predicate::RangeMin(RangeBound::Price(min)) => event.price_per_person >= *min,
        Predicate::RangeMax(RangeBound::Price(max)) => event.price_per_person <= *max,
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        self.check_failure()?;
        let event = Event {
            id: nanoid!(12),
            title: event.title,
            description: event.description,
            datetime: event.datetime,
            location: event.location,
            capacity: event.capacity,
            price_per_person: event.price_per_person,
            created_at: Utc::now(),
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        self.check_failure()?;
        let events = self.events.lock().unwrap();
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    async fn find(
        &self,
        predicates: &[Predicate],
        ordering: Ordering,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Event>, u64)> {
        self.check_failure()?;
        let events = self.events.lock().unwrap();
        let mut matching: Vec<(usize, &Event)> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| predicates.iter().all(|p| matches(e, p)))
            .collect();

        matching.sort_by(|(ia, a), (ib, b)| {
            let by_key = match ordering.field {
                OrderField::Datetime => a.datetime.cmp(&b.datetime),
                OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let asc = by_key.then(ia.cmp(ib));
            match ordering.direction {
                Direction::Asc => asc,
                Direction::Desc => asc.reverse(),
            }
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|(_, e)| e.clone())
            .collect();
        Ok((items, total))
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<Event> {
        self.check_failure()?;
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn delete(&self, id: &str) -> Result<Event> {
        self.check_failure()?;
        let mut events = self.events.lock().unwrap();
        let index = events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(events.remove(index))
    }

    async fn count(&self) -> Result<u64> {
        self.check_failure()?;
        Ok(self.events.lock().unwrap().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> NewEvent {
        NewEvent {
            title: "Morning Yoga".to_string(),
            description: None,
            datetime: Utc.with_ymd_and_hms(2030, 2, 10, 7, 0, 0).unwrap(),
            location: "Zen Garden Studio".to_string(),
            capacity: 20,
            price_per_person: 2500,
        }
    }

    #[tokio::test]
    async fn patch_only_touches_present_fields() {
        let store = InMemoryEventStore::new();
        let created = store.create(sample()).await.unwrap();
        let patch = EventPatch {
            capacity: Some(8),
            description: Some(Some("Bring a mat".to_string())),
            ..EventPatch::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap();
        assert_eq!(updated.capacity, 8);
        assert_eq!(updated.description.as_deref(), Some("Bring a mat"));
        assert_eq!(updated.title, "Morning Yoga");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn failure_is_injected_once() {
        let store = InMemoryEventStore::new();
        store.fail_next();
        assert!(matches!(store.count().await, Err(StoreError::Database(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
