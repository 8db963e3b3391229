#[cfg(test)]
pub mod memory;
pub mod sqlite;

use crate::models::{Event, EventPatch, NewEvent};
use crate::query::{Ordering, Predicate};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event {0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a new event, assigning its `id` and `created_at`.
    async fn create(&self, event: NewEvent) -> Result<Event>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>>;

    /// Returns one window of events matching every predicate, plus the number
    /// of matching events ignoring the window.
    async fn find(
        &self,
        predicates: &[Predicate],
        ordering: Ordering,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Event>, u64)>;

    async fn update(&self, id: &str, patch: EventPatch) -> Result<Event>;

    async fn delete(&self, id: &str) -> Result<Event>;

    async fn count(&self) -> Result<u64>;
}
