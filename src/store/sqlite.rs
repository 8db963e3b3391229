use super::{EventStore, Result, StoreError};
use crate::models::{Event, EventPatch, NewEvent};
use crate::query::{Direction, Ordering, Predicate, RangeBound};
use async_trait::async_trait;
use chrono::Utc;
use nanoid::nanoid;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            title_folded TEXT NOT NULL,
            description TEXT,
            description_folded TEXT NOT NULL DEFAULT '',
            datetime TEXT NOT NULL,
            location TEXT NOT NULL,
            location_folded TEXT NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity > 0),
            price_per_person INTEGER NOT NULL CHECK (price_per_person >= 0),
            created_at TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS events_datetime_idx ON events (datetime);")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS events_created_at_idx ON events (created_at);")
        .execute(pool)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// SQLite's `LOWER()` only folds ASCII, so text columns keep a copy folded
/// here and search compares against that.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// `%` and `_` in user input match literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in fold(needle).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_where(builder: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::TextMatch { fields, needle } => {
                let pattern = like_pattern(needle);
                builder.push("(");
                for (j, field) in fields.iter().enumerate() {
                    if j > 0 {
                        builder.push(" OR ");
                    }
                    builder
                        .push(format!("{} LIKE ", field.folded_column()))
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\'");
                }
                builder.push(")");
            }
            Predicate::RangeMin(bound) => push_bound(builder, *bound, ">="),
            Predicate::RangeMax(bound) => push_bound(builder, *bound, "<="),
        }
    }
}

fn push_bound(builder: &mut QueryBuilder<'_, Sqlite>, bound: RangeBound, op: &str) {
    builder.push(format!("{} {op} ", bound.column()));
    match bound {
        RangeBound::Datetime(at) => builder.push_bind(at),
        RangeBound::Price(cents) => builder.push_bind(cents),
    };
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let id = nanoid!(12);
        let title_folded = fold(&event.title);
        let description_folded = event.description.as_deref().map(fold).unwrap_or_default();
        let location_folded = fold(&event.location);
        let event = sqlx::query_as(
            "INSERT INTO events (id, title, title_folded, description, description_folded,
                                 datetime, location, location_folded, capacity,
                                 price_per_person, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(event.title)
        .bind(title_folded)
        .bind(event.description)
        .bind(description_folded)
        .bind(event.datetime)
        .bind(event.location)
        .bind(location_folded)
        .bind(event.capacity)
        .bind(event.price_per_person)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        sqlx::query_as("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)
    }

    async fn find(
        &self,
        predicates: &[Predicate],
        ordering: Ordering,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Event>, u64)> {
        let direction = match ordering.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM events");
        push_where(&mut select, predicates);
        select
            .push(format!(
                " ORDER BY {col} {direction}, rowid {direction} LIMIT ",
                col = ordering.field.column()
            ))
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM events");
        push_where(&mut count, predicates);

        let items: Vec<Event> = select.build_query_as().fetch_all(&self.pool).await?;
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        Ok((items, u64::try_from(total).unwrap_or_default()))
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<Event> {
        let title_folded = patch.title.as_deref().map(fold);
        let location_folded = patch.location.as_deref().map(fold);
        let set_description = patch.description.is_some();
        let description = patch.description.flatten();
        let description_folded = description.as_deref().map(fold).unwrap_or_default();

        sqlx::query_as(
            "UPDATE events SET
                title = COALESCE(?, title),
                title_folded = COALESCE(?, title_folded),
                description = CASE WHEN ? THEN ? ELSE description END,
                description_folded = CASE WHEN ? THEN ? ELSE description_folded END,
                datetime = COALESCE(?, datetime),
                location = COALESCE(?, location),
                location_folded = COALESCE(?, location_folded),
                capacity = COALESCE(?, capacity),
                price_per_person = COALESCE(?, price_per_person)
             WHERE id = ? RETURNING *",
        )
        .bind(patch.title)
        .bind(title_folded)
        .bind(set_description)
        .bind(description)
        .bind(set_description)
        .bind(description_folded)
        .bind(patch.datetime)
        .bind(patch.location)
        .bind(location_folded)
        .bind(patch.capacity)
        .bind(patch.price_per_person)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<Event> {
        sqlx::query_as("DELETE FROM events WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
