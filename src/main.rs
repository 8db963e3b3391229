mod config;
mod error;
mod handlers;
mod logging;
mod models;
mod money;
mod query;
mod routes;
mod seed;
mod state;
mod store;
mod validation;

use anyhow::Context;
use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use state::AppState;
use std::str::FromStr;
use std::sync::Arc;
use store::sqlite::{self, SqliteEventStore};
use validation::EventPolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    logging::init();

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .context("failed to parse DATABASE_URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await
        .context("failed to connect to db")?;

    sqlite::init_schema(&pool)
        .await
        .context("failed to create events table")?;

    let store = Arc::new(SqliteEventStore::new(pool));
    if config.seed_on_empty {
        match seed::seed_if_empty(store.as_ref()).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "seeded sample events"),
            Err(e) => tracing::warn!(error = %e, "failed to seed sample events"),
        }
    }

    let app_state = AppState {
        store,
        policy: EventPolicy {
            reject_past_datetimes: config.reject_past_events,
        },
    };
    let app = routes::router(app_state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
