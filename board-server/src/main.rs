use std::sync::Arc;

use anyhow::Result;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    // Consumed by the auth subsystem; the secret is validated, never logged.
    tracing::info!(
        issuer = %settings.jwt.issuer,
        access_expiry_seconds = settings.jwt.access_expiry_seconds,
        refresh_expiry_seconds = settings.jwt.refresh_expiry_seconds,
        "JWT settings loaded"
    );

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let post_repository = Arc::new(PostgresPostRepository::new(pool));
    let post_service = Arc::new(PostService::new(post_repository));
    let state = AppState::new(post_service);

    server::run_http(&settings, state).await
}
