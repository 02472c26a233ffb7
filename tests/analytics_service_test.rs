use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use turfbook::{
    domain::*,
    repository::*,
    service::AnalyticsService,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct TestCtx {
    analytics: AnalyticsService,
    booking_repo: Arc<SqliteBookingRepository>,
    rating_repo: Arc<SqliteRatingRepository>,
    owner: User,
    player: User,
    venue: Venue,
}

async fn setup() -> anyhow::Result<TestCtx> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let user_repo = SqliteUserRepository::new(pool.clone());
    let venue_repo = Arc::new(SqliteVenueRepository::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepository::new(pool.clone()));
    let rating_repo = Arc::new(SqliteRatingRepository::new(pool.clone()));

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

    let analytics = AnalyticsService::new(
        booking_repo.clone(),
        venue_repo.clone(),
        rating_repo.clone(),
    );

    Ok(TestCtx {
        analytics,
        booking_repo,
        rating_repo,
        owner,
        player,
        venue,
    })
}

fn booking(
    venue_id: Uuid,
    player_id: Option<Uuid>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    status: BookingStatus,
    price_cents: i64,
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
        total_price_cents: price_cents,
        player_count: 4,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_owner_stats_counts_confirmed_revenue() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let date = d(2030, 6, 10);

    ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), date, t(10, 0), t(11, 0), BookingStatus::Confirmed, 50_000))
        .await?;
    ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), date, t(12, 0), t(14, 0), BookingStatus::Confirmed, 100_000))
        .await?;
    // Cancelled revenue does not count
    let cancelled = ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), date, t(15, 0), t(16, 0), BookingStatus::Confirmed, 70_000))
        .await?;
    ctx.booking_repo.update_status(cancelled.id, BookingStatus::Cancelled).await?;
    // Neither do maintenance blocks
    ctx.booking_repo
        .create(booking(ctx.venue.id, None, date, t(17, 0), t(18, 0), BookingStatus::Blocked, 0))
        .await?;

    let stats = ctx.analytics
        .owner_stats(ctx.owner.id, Some((d(2030, 6, 1), d(2030, 6, 30))))
        .await?;

    assert_eq!(stats.total_bookings, 2);
    assert_eq!(stats.total_revenue_cents, 150_000);
    assert_eq!(stats.occupancy_rate, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_owner_stats_average_rating() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let date = d(2020, 6, 10);

    let first = ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), date, t(10, 0), t(11, 0), BookingStatus::Confirmed, 50_000))
        .await?;
    let second = ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), date, t(12, 0), t(13, 0), BookingStatus::Confirmed, 50_000))
        .await?;

    for (b, score) in [(first, 4), (second, 5)] {
        ctx.rating_repo
            .create(Rating {
                id: Uuid::new_v4(),
                booking_id: b.id,
                venue_id: ctx.venue.id,
                player_id: ctx.player.id,
                score,
                comment: None,
                created_at: Utc::now(),
            })
            .await?;
    }

    let stats = ctx.analytics
        .owner_stats(ctx.owner.id, Some((d(2020, 6, 1), d(2020, 6, 30))))
        .await?;

    assert_eq!(stats.average_rating, 4.5);

    Ok(())
}

#[tokio::test]
async fn test_owner_stats_no_ratings_is_zero() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let stats = ctx.analytics.owner_stats(ctx.owner.id, None).await?;

    assert_eq!(stats.total_bookings, 0);
    assert_eq!(stats.total_revenue_cents, 0);
    assert_eq!(stats.average_rating, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_today_schedule_positions_bookings() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let today = d(2030, 6, 10);

    ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), today, t(10, 0), t(11, 0), BookingStatus::Confirmed, 50_000))
        .await?;
    let cancelled = ctx.booking_repo
        .create(booking(ctx.venue.id, Some(ctx.player.id), today, t(12, 0), t(13, 0), BookingStatus::Confirmed, 50_000))
        .await?;
    ctx.booking_repo.update_status(cancelled.id, BookingStatus::Cancelled).await?;

    let schedule = ctx.analytics
        .today_schedule(ctx.owner.id, today)
        .await?
        .expect("owner has venues");

    // Venue hours 08:00-22:00
    assert_eq!(schedule.start_hour, 8);
    assert_eq!(schedule.end_hour, 22);

    // Cancelled bookings are left off the timeline
    assert_eq!(schedule.entries.len(), 1);
    let entry = &schedule.entries[0];
    assert!((entry.offset_percent - 120.0 / 840.0 * 100.0).abs() < 1e-9);
    assert!((entry.width_percent - 60.0 / 840.0 * 100.0).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_today_schedule_without_venues() -> anyhow::Result<()> {
    let ctx = setup().await?;

    // A second owner with no venues gets no schedule at all
    let schedule = ctx.analytics.today_schedule(Uuid::new_v4(), d(2030, 6, 10)).await?;
    assert!(schedule.is_none());

    Ok(())
}
