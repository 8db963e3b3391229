use crate::models::NewEvent;
use crate::money::format_price;
use crate::store::{self, EventStore};
use chrono::{TimeZone, Utc};

/// (title, description, (y, m, d, h, min), location, capacity, price in cents)
type SampleEvent = (&'static str, &'static str, (i32, u32, u32, u32, u32), &'static str, i64, i64);

const SAMPLE_EVENTS: &[SampleEvent] = &[
    (
        "Italian Cooking Masterclass",
        "Learn to make authentic Italian pasta and sauces from a professional chef. Includes wine tasting and recipe booklet.",
        (2024, 2, 15, 18, 0),
        "Culinary Arts Studio, Downtown",
        12,
        8500,
    ),
    (
        "Morning Yoga & Meditation",
        "Start your day with gentle yoga flows and guided meditation. Suitable for all levels. Mats provided.",
        (2024, 2, 10, 7, 0),
        "Zen Garden Studio",
        20,
        2500,
    ),
    (
        "Historic City Walking Tour",
        "Explore the hidden gems and fascinating history of our city with a local expert guide. 2-hour guided tour.",
        (2024, 2, 12, 14, 0),
        "City Hall Square (Meeting Point)",
        25,
        1800,
    ),
    (
        "Photography Workshop: Golden Hour",
        "Master the art of golden hour photography. Learn composition, lighting, and editing techniques.",
        (2024, 2, 18, 17, 30),
        "Riverside Park",
        8,
        7500,
    ),
    (
        "Wine & Cheese Tasting Evening",
        "Sample premium wines paired with artisanal cheeses. Learn about wine regions and tasting notes.",
        (2024, 2, 20, 19, 0),
        "The Wine Cellar",
        16,
        6500,
    ),
    (
        "Rock Climbing for Beginners",
        "Introduction to indoor rock climbing with certified instructors. All equipment included.",
        (2024, 2, 25, 10, 0),
        "Adventure Climbing Gym",
        10,
        4500,
    ),
    (
        "Pottery Making Workshop",
        "Create your own ceramic masterpiece on the pottery wheel. Clay, tools, and firing included.",
        (2024, 3, 2, 13, 0),
        "Clay Works Studio",
        6,
        5500,
    ),
    (
        "Salsa Dancing Lessons",
        "Learn basic salsa steps and turns in a fun, social environment. No partner required!",
        (2024, 2, 22, 20, 0),
        "Dance Fever Studio",
        30,
        2000,
    ),
    (
        "Urban Sketching Adventure",
        "Explore the city while learning to sketch architecture and street scenes. Materials provided.",
        (2024, 2, 28, 11, 0),
        "Arts District Plaza",
        15,
        3500,
    ),
    (
        "Craft Beer Brewing Workshop",
        "Learn the brewing process and create your own craft beer recipe. Take home samples!",
        (2024, 3, 5, 15, 0),
        "Local Brewery & Taphouse",
        12,
        9500,
    ),
];

fn sample_events() -> impl Iterator<Item = NewEvent> {
    SAMPLE_EVENTS.iter().filter_map(
        |&(title, description, (y, mo, d, h, mi), location, capacity, price)| {
            let datetime = Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single()?;
            Some(NewEvent {
                title: title.to_string(),
                description: Some(description.to_string()),
                datetime,
                location: location.to_string(),
                capacity,
                price_per_person: price,
            })
        },
    )
}

/// Inserts the sample events if the store is empty. Returns how many were added.
pub async fn seed_if_empty(store: &dyn EventStore) -> store::Result<usize> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    tracing::info!("event table is empty, inserting sample events");
    let mut inserted = 0;
    for event in sample_events() {
        let event = store.create(event).await?;
        tracing::info!(
            id = %event.id,
            title = %event.title,
            price = %format_price(event.price_per_person),
            "seeded event"
        );
        inserted += 1;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryEventStore;

    #[test]
    fn every_sample_is_valid() {
        let events: Vec<NewEvent> = sample_events().collect();
        assert_eq!(events.len(), SAMPLE_EVENTS.len());
        assert!(events.iter().all(|e| e.capacity > 0 && e.price_per_person >= 0));
    }

    #[tokio::test]
    async fn seeds_only_an_empty_store() {
        let store = InMemoryEventStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 10);
        assert_eq!(store.count().await.unwrap(), 10);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 10);
    }
}
