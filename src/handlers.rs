use crate::{
    error::AppError,
    models::{CreateEventPayload, Event, UpdateEventPayload},
    query::{EventQuery, RawEventQuery, executor, executor::EventPage, normalize::normalize},
    state::AppState,
    validation::{WriteContext, validate_new_event, validate_patch},
};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

/// `Json` with rejections reported as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` with rejections reported as [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    page: EventPage,
    query: EventQuery,
}

async fn run_query(state: &AppState, raw: RawEventQuery) -> Result<Json<SearchResponse>, AppError> {
    let query = normalize(raw)?;
    let page = executor::search(state.store.as_ref(), &query).await?;
    tracing::debug!(
        total = page.meta.total,
        page = query.page,
        limit = query.limit,
        "query executed"
    );
    Ok(Json(SearchResponse { page, query }))
}

/// Unfiltered listing: only `page` and `limit` are honoured.
pub async fn list_events(
    State(app_state): State<AppState>,
    AppQuery(raw): AppQuery<RawEventQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let raw = RawEventQuery {
        page: raw.page,
        limit: raw.limit,
        ..RawEventQuery::default()
    };
    run_query(&app_state, raw).await
}

pub async fn search_events(
    State(app_state): State<AppState>,
    AppQuery(raw): AppQuery<RawEventQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    run_query(&app_state, raw).await
}

pub async fn get_event(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    app_state
        .store
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

pub async fn create_event(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateEventPayload>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let ctx = WriteContext {
        policy: app_state.policy,
        now: Utc::now(),
    };
    let new_event = validate_new_event(payload, &ctx)?;
    let event = app_state.store.create(new_event).await?;
    tracing::info!(id = %event.id, title = %event.title, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateEventPayload>,
) -> Result<Json<Event>, AppError> {
    let ctx = WriteContext {
        policy: app_state.policy,
        now: Utc::now(),
    };
    let patch = validate_patch(payload, &ctx)?;
    let event = app_state.store.update(&id, patch).await?;
    tracing::info!(id = %event.id, "event updated");
    Ok(Json(event))
}

pub async fn delete_event(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = app_state.store.delete(&id).await?;
    tracing::info!(id = %event.id, "event deleted");
    Ok(Json(event))
}
