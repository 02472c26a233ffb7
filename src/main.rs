use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turfbook::{
    api,
    auth,
    config::Settings,
    payments::SimulatedGateway,
    repository,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turfbook=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting turfbook server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Initialize auth service
    let auth_service = Arc::new(auth::AuthService::new(
        db_pool.clone(),
        settings.auth.session_secret.clone(),
    ));

    // Initialize repositories
    let user_repo = Arc::new(repository::SqliteUserRepository::new(db_pool.clone()));
    let venue_repo = Arc::new(repository::SqliteVenueRepository::new(db_pool.clone()));
    let booking_repo = Arc::new(repository::SqliteBookingRepository::new(db_pool.clone()));
    let rating_repo = Arc::new(repository::SqliteRatingRepository::new(db_pool.clone()));
    let transaction_repo = Arc::new(repository::SqliteTransactionRepository::new(db_pool.clone()));

    // Payment gateway. The platform simulates charges in-process; swap in a
    // real provider behind the same trait when one is wired up.
    let gateway = Arc::new(SimulatedGateway::new());

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        user_repo,
        venue_repo,
        booking_repo,
        rating_repo,
        transaction_repo,
        gateway,
        auth_service,
        settings.booking.clone(),
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
