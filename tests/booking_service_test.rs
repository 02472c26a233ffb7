use std::sync::Arc;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use turfbook::{
    config::BookingPolicyConfig,
    domain::*,
    error::AppError,
    payments::{PaymentGateway, SimulatedGateway},
    repository::*,
    service::{BookingService, RatingService, ReleaseOutcome, VenueService},
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

struct TestCtx {
    booking_service: BookingService,
    venue_service: VenueService,
    rating_service: RatingService,
    booking_repo: Arc<SqliteBookingRepository>,
    venue_repo: Arc<SqliteVenueRepository>,
    rating_repo: Arc<SqliteRatingRepository>,
    transaction_repo: Arc<SqliteTransactionRepository>,
    owner: User,
    player: User,
    venue: Venue,
}

async fn setup(gateway: Arc<dyn PaymentGateway>) -> anyhow::Result<TestCtx> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let user_repo = SqliteUserRepository::new(pool.clone());
    let venue_repo = Arc::new(SqliteVenueRepository::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepository::new(pool.clone()));
    let rating_repo = Arc::new(SqliteRatingRepository::new(pool.clone()));
    let transaction_repo = Arc::new(SqliteTransactionRepository::new(pool.clone()));

    let owner = user_repo.create(CreateUserRequest {
        email: "owner@example.com".to_string(),
        full_name: "Owner".to_string(),
        phone: "555-0100".to_string(),
        password: "secure_password123".to_string(),
        role: UserRole::Owner,
    }).await?;

    let player = user_repo.create(CreateUserRequest {
        email: "player@example.com".to_string(),
        full_name: "Player".to_string(),
        phone: "555-0101".to_string(),
        password: "secure_password123".to_string(),
        role: UserRole::Player,
    }).await?;

    let venue = venue_repo.create(owner.id, CreateVenueRequest {
        name: "Test Arena".to_string(),
        location: "Nowhere".to_string(),
        sport: "Football".to_string(),
        price_per_hour_cents: 50_000,
        max_players: 10,
        open_time: Some(t(8, 0)),
        close_time: Some(t(22, 0)),
        description: String::new(),
        maps_link: None,
        image_url: None,
        amenities: vec![],
        custom_amenities: vec![],
    }).await?;

    let booking_service = BookingService::new(
        booking_repo.clone(),
        venue_repo.clone(),
        transaction_repo.clone(),
        rating_repo.clone(),
        gateway,
        BookingPolicyConfig::default(),
    );

    let venue_service = VenueService::new(
        venue_repo.clone(),
        booking_repo.clone(),
        rating_repo.clone(),
        transaction_repo.clone(),
    );

    let rating_service = RatingService::new(rating_repo.clone(), booking_repo.clone());

    Ok(TestCtx {
        booking_service,
        venue_service,
        rating_service,
        booking_repo,
        venue_repo,
        rating_repo,
        transaction_repo,
        owner,
        player,
        venue,
    })
}

fn tomorrow() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(1)
}

fn request(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> CreateBookingRequest {
    CreateBookingRequest {
        date,
        start_time: start,
        end_time: end,
        player_count: 4,
        idempotency_key: None,
    }
}

#[tokio::test]
async fn test_create_booking_charges_and_confirms() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let booking = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(12, 0)))
        .await?;

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.player_id, Some(ctx.player.id));
    // 2 hours at 500.00/hour is exactly 1000.00
    assert_eq!(booking.total_price_cents, 100_000);

    let transactions = ctx.transaction_repo.list_by_booking(booking.id).await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Completed);
    assert_eq!(transactions[0].amount_cents, 100_000);

    Ok(())
}

#[tokio::test]
async fn test_create_booking_rejects_bad_input() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(yesterday, t(10, 0), t(11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PastDate));

    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(11, 0), t(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Off-grid start time
    let err = ctx.booking_service
        .create_booking(
            &ctx.player,
            ctx.venue.id,
            request(tomorrow(), NaiveTime::from_hms_opt(10, 15, 0).unwrap(), t(11, 0)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // More players than the venue takes
    let mut req = request(tomorrow(), t(10, 0), t(11, 0));
    req.player_count = 11;
    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, req)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_create_booking_rejects_overlap() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(11, 0)))
        .await?;

    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 30), t(11, 30)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotTaken));

    Ok(())
}

#[tokio::test]
async fn test_idempotency_key_replay_returns_original() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let mut req = request(tomorrow(), t(10, 0), t(11, 0));
    req.idempotency_key = Some("retry-token-1".to_string());

    let first = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, req.clone())
        .await?;
    let second = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, req)
        .await?;

    assert_eq!(first.id, second.id);

    // Only one charge was made
    let transactions = ctx.transaction_repo.list_by_booking(first.id).await?;
    assert_eq!(transactions.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_declined_payment_leaves_no_confirmed_booking() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::declining())).await?;

    let mut req = request(tomorrow(), t(10, 0), t(11, 0));
    req.idempotency_key = Some("declined-once".to_string());
    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, req)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));

    let bookings = ctx.booking_repo.list_by_player(ctx.player.id).await?;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Cancelled);

    let transactions = ctx.transaction_repo.list_by_booking(bookings[0].id).await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Failed);

    // The failed attempt does not hold the idempotency key hostage
    assert!(ctx.booking_repo
        .find_by_idempotency_key(ctx.player.id, "declined-once")
        .await?
        .is_none());

    // The slot is free again
    ctx.booking_repo
        .create(raw_booking(ctx.venue.id, Some(ctx.player.id), tomorrow(), t(10, 0), t(11, 0), BookingStatus::Confirmed))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_release_cancels_future_booking() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let booking = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(11, 0)))
        .await?;

    let outcome = ctx.booking_service.release(&ctx.player, booking.id).await?;
    let cancelled = match outcome {
        ReleaseOutcome::Cancelled(b) => b,
        other => panic!("expected cancellation, got {:?}", other),
    };
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    // Releasing twice is rejected
    let err = ctx.booking_service.release(&ctx.player, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_release_enforces_notice_window() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    // Starts about an hour from now: inside the 2-hour notice window.
    let soon = Utc::now().naive_utc() + Duration::hours(1);
    let booking = ctx.booking_repo
        .create(raw_booking(
            ctx.venue.id,
            Some(ctx.player.id),
            soon.date(),
            soon.time(),
            soon.time() + Duration::minutes(30),
            BookingStatus::Confirmed,
        ))
        .await?;

    let err = ctx.booking_service.release(&ctx.player, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::CancellationWindow(2)));

    Ok(())
}

#[test]
fn test_cancellation_window_boundary_is_strict() {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_time(t(10, 30));
    let two_hours_before: NaiveDateTime = start - Duration::hours(2);

    // Exactly two hours out is already too late
    assert!(!BookingService::cancellation_allowed(start, two_hours_before, 2));
    assert!(BookingService::cancellation_allowed(start, two_hours_before - Duration::seconds(1), 2));
    // 1.5 hours out, as on the booking page
    assert!(!BookingService::cancellation_allowed(start, start - Duration::minutes(90), 2));
}

#[test]
fn test_price_is_exact() {
    assert_eq!(BookingService::price_cents(120, 50_000), 100_000);
    assert_eq!(BookingService::price_cents(30, 50_000), 25_000);
    assert_eq!(BookingService::price_cents(90, 33_300), 49_950);
}

#[tokio::test]
async fn test_release_rejects_strangers() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let booking = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(11, 0)))
        .await?;

    // The venue owner cannot player-cancel a confirmed booking
    let err = ctx.booking_service.release(&ctx.owner, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_block_and_release_slot() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;
    let date = tomorrow();

    let block = ctx.booking_service
        .block_slot(&ctx.owner, ctx.venue.id, BlockSlotRequest {
            date,
            start_time: t(14, 0),
            end_time: t(15, 0),
            reason: None,
        })
        .await?;

    assert_eq!(block.status, BookingStatus::Blocked);
    assert_eq!(block.player_id, None);
    assert_eq!(block.block_reason.as_deref(), Some("Maintenance"));

    // The blocked range cannot be booked
    let err = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(date, t(14, 0), t(15, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotTaken));

    // Players cannot remove blocks
    let err = ctx.booking_service.release(&ctx.player, block.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // The owner releases it: the record is removed, not cancelled
    let outcome = ctx.booking_service.release(&ctx.owner, block.id).await?;
    assert!(matches!(outcome, ReleaseOutcome::Removed));
    assert!(ctx.booking_repo.find_by_id(block.id).await?.is_none());

    // And the slot is bookable again
    let rebooked = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(date, t(14, 0), t(15, 0)))
        .await?;
    assert_eq!(rebooked.status, BookingStatus::Confirmed);

    Ok(())
}

#[tokio::test]
async fn test_block_requires_venue_ownership() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let err = ctx.booking_service
        .block_slot(&ctx.player, ctx.venue.id, BlockSlotRequest {
            date: tomorrow(),
            start_time: t(14, 0),
            end_time: t(15, 0),
            reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_availability_scenario() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;
    let date = tomorrow();

    ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(date, t(10, 0), t(11, 0)))
        .await?;

    let slots = ctx.booking_service.availability(ctx.venue.id, date).await?;

    assert_eq!(slots.len(), 28);
    for slot in &slots {
        let expected_taken = slot.start == t(10, 0) || slot.start == t(10, 30);
        assert_eq!(slot.available, !expected_taken, "slot {}", slot.start);
    }

    Ok(())
}

#[tokio::test]
async fn test_rating_rules() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    // A booking that already ran its course
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let done = ctx.booking_repo
        .create(raw_booking(ctx.venue.id, Some(ctx.player.id), yesterday, t(10, 0), t(11, 0), BookingStatus::Confirmed))
        .await?;

    // Score bounds
    let err = ctx.rating_service
        .rate_booking(&ctx.player, done.id, CreateRatingRequest { score: 6, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Only the booking's player may rate
    let err = ctx.rating_service
        .rate_booking(&ctx.owner, done.id, CreateRatingRequest { score: 4, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let rating = ctx.rating_service
        .rate_booking(&ctx.player, done.id, CreateRatingRequest {
            score: 4,
            comment: Some("Great pitch".to_string()),
        })
        .await?;
    assert_eq!(rating.score, 4);

    // Ratings are immutable: no second rating for the same booking
    let err = ctx.rating_service
        .rate_booking(&ctx.player, done.id, CreateRatingRequest { score: 5, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A booking still in the future cannot be rated
    let upcoming = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(11, 0)))
        .await?;
    let err = ctx.rating_service
        .rate_booking(&ctx.player, upcoming.id, CreateRatingRequest { score: 3, comment: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_delete_venue_cascades() -> anyhow::Result<()> {
    let ctx = setup(Arc::new(SimulatedGateway::new())).await?;

    let booking = ctx.booking_service
        .create_booking(&ctx.player, ctx.venue.id, request(tomorrow(), t(10, 0), t(11, 0)))
        .await?;

    // A finished booking with a rating on the same venue
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let done = ctx.booking_repo
        .create(raw_booking(ctx.venue.id, Some(ctx.player.id), yesterday, t(10, 0), t(11, 0), BookingStatus::Confirmed))
        .await?;
    ctx.rating_service
        .rate_booking(&ctx.player, done.id, CreateRatingRequest { score: 5, comment: None })
        .await?;

    // Someone else's venue cannot be deleted
    let err = ctx.venue_service.delete_venue(&ctx.player, ctx.venue.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    ctx.venue_service.delete_venue(&ctx.owner, ctx.venue.id).await?;

    assert!(ctx.venue_repo.find_by_id(ctx.venue.id).await?.is_none());
    assert!(ctx.booking_repo.find_by_id(booking.id).await?.is_none());
    assert!(ctx.booking_repo.find_by_id(done.id).await?.is_none());
    assert!(ctx.rating_repo.find_by_booking(done.id).await?.is_none());
    assert!(ctx.transaction_repo.list_by_booking(booking.id).await?.is_empty());

    Ok(())
}

fn raw_booking(
    venue_id: Uuid,
    player_id: Option<Uuid>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    status: BookingStatus,
) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        venue_id,
        player_id,
        date,
        start_time: start,
        end_time: end,
        status,
        block_reason: None,
        total_price_cents: 50_000,
        player_count: 4,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }
}
