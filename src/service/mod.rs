pub mod booking_service;
pub mod venue_service;
pub mod rating_service;
pub mod analytics_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::BookingPolicyConfig;
use crate::payments::PaymentGateway;
use crate::repository::*;

pub use booking_service::{BookingService, ReleaseOutcome};
pub use venue_service::VenueService;
pub use rating_service::RatingService;
pub use analytics_service::{AnalyticsService, OwnerStats, TimelineEntry, TodaySchedule};

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub venue_repo: Arc<dyn VenueRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub rating_repo: Arc<dyn RatingRepository>,
    pub transaction_repo: Arc<dyn TransactionRepository>,
    pub booking_service: Arc<BookingService>,
    pub venue_service: Arc<VenueService>,
    pub rating_service: Arc<RatingService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        venue_repo: Arc<dyn VenueRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        transaction_repo: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        auth_service: Arc<AuthService>,
        booking_policy: BookingPolicyConfig,
        db_pool: SqlitePool,
    ) -> Self {
        let booking_service = Arc::new(BookingService::new(
            booking_repo.clone(),
            venue_repo.clone(),
            transaction_repo.clone(),
            rating_repo.clone(),
            gateway,
            booking_policy,
        ));

        let venue_service = Arc::new(VenueService::new(
            venue_repo.clone(),
            booking_repo.clone(),
            rating_repo.clone(),
            transaction_repo.clone(),
        ));

        let rating_service = Arc::new(RatingService::new(
            rating_repo.clone(),
            booking_repo.clone(),
        ));

        let analytics_service = Arc::new(AnalyticsService::new(
            booking_repo.clone(),
            venue_repo.clone(),
            rating_repo.clone(),
        ));

        Self {
            user_repo,
            venue_repo,
            booking_repo,
            rating_repo,
            transaction_repo,
            booking_service,
            venue_service,
            rating_service,
            analytics_service,
            auth_service,
            db_pool,
        }
    }
}
