pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/venues", venue_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/owner", owner_routes(state.clone()))
        .nest("/profile", profile_routes(state))
}

fn venue_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public browse endpoints (no auth required for viewing)
        .route("/", get(handlers::venues::list))
        .route("/:id", get(handlers::venues::get))
        .route("/:id/availability", get(handlers::bookings::availability))
        .route("/:id/ratings", get(handlers::venues::ratings))
        // Players book slots
        .merge(
            Router::new()
                .route("/:id/bookings", post(handlers::bookings::create))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_player,
                )),
        )
        // Owners manage their venues and slots
        .merge(
            Router::new()
                .route("/", post(handlers::venues::create))
                .route("/:id", put(handlers::venues::update))
                .route("/:id", delete(handlers::venues::delete))
                .route("/:id/bookings", get(handlers::owner::venue_bookings))
                .route("/:id/slots", get(handlers::slots::manage_view))
                .route("/:id/slots/block", post(handlers::slots::block))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_owner,
                )),
        )
}

fn booking_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Receipt is shared between the player and the venue owner; release
        // dispatches on role inside the service.
        .route("/:id", get(handlers::bookings::receipt))
        .route("/:id/release", post(handlers::bookings::release))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ))
        .merge(
            Router::new()
                .route("/", get(handlers::bookings::my_bookings))
                .route("/:id/rating", post(handlers::bookings::rate))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_player,
                )),
        )
}

fn owner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::owner::dashboard))
        .route("/transactions", get(handlers::owner::transactions))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_owner,
        ))
}

fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::profile::get))
        .route("/", put(handlers::profile::update))
        .route("/password", post(handlers::profile::change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
