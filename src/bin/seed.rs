use turfbook::{
    domain::{
        Booking, BookingStatus, CreateUserRequest, CreateVenueRequest,
        Transaction, TransactionStatus, UserRole,
    },
    repository::{
        BookingRepository, SqliteBookingRepository,
        SqliteTransactionRepository, SqliteUserRepository, SqliteVenueRepository,
        TransactionRepository, UserRepository, VenueRepository,
    },
};
use chrono::{Duration, NaiveTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🌱 Starting database seeding...");

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:turfbook.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Initialize repositories
    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let venue_repo = SqliteVenueRepository::new(db_pool.clone());
    let booking_repo = SqliteBookingRepository::new(db_pool.clone());
    let transaction_repo = SqliteTransactionRepository::new(db_pool.clone());

    // Seed users
    println!("👥 Creating users...");

    let owner = user_repo.create(CreateUserRequest {
        email: "owner@turfbook.local".to_string(),
        full_name: "Olivia Grounds".to_string(),
        phone: "555-0100".to_string(),
        password: "owner12345".to_string(),
        role: UserRole::Owner,
    }).await?;

    println!("  ✅ Created owner (owner@turfbook.local / owner12345)");

    let alice = user_repo.create(CreateUserRequest {
        email: "alice@example.com".to_string(),
        full_name: "Alice Johnson".to_string(),
        phone: "555-0101".to_string(),
        password: "password123".to_string(),
        role: UserRole::Player,
    }).await?;

    let bob = user_repo.create(CreateUserRequest {
        email: "bob@example.com".to_string(),
        full_name: "Bob Smith".to_string(),
        phone: "555-0102".to_string(),
        password: "password123".to_string(),
        role: UserRole::Player,
    }).await?;

    println!("  ✅ Created 2 test players");

    // Seed venues
    println!("🏟️  Creating venues...");

    let arena = venue_repo.create(owner.id, CreateVenueRequest {
        name: "Greenfield Arena".to_string(),
        location: "12 Riverside Road".to_string(),
        sport: "Football".to_string(),
        price_per_hour_cents: 50_000,
        max_players: 10,
        open_time: NaiveTime::from_hms_opt(8, 0, 0),
        close_time: NaiveTime::from_hms_opt(22, 0, 0),
        description: "Full-size 5-a-side pitch with floodlights.".to_string(),
        maps_link: None,
        image_url: None,
        amenities: vec!["Parking".to_string(), "Changing Rooms".to_string()],
        custom_amenities: vec!["Bib hire".to_string()],
    }).await?;

    let court = venue_repo.create(owner.id, CreateVenueRequest {
        name: "Smash Point Courts".to_string(),
        location: "4 Market Lane".to_string(),
        sport: "Badminton".to_string(),
        price_per_hour_cents: 30_000,
        max_players: 4,
        open_time: NaiveTime::from_hms_opt(6, 0, 0),
        close_time: NaiveTime::from_hms_opt(23, 0, 0),
        description: "Two indoor courts, wooden flooring.".to_string(),
        maps_link: None,
        image_url: None,
        amenities: vec!["Parking".to_string()],
        custom_amenities: vec![],
    }).await?;

    println!("  ✅ Created 2 venues");

    // Seed bookings
    println!("📅 Creating bookings...");

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let now = Utc::now();

    let mk_time = |h: u32, m: u32| {
        NaiveTime::from_hms_opt(h, m, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid seed time {}:{}", h, m))
    };

    let alice_booking = booking_repo.create(Booking {
        id: Uuid::new_v4(),
        venue_id: arena.id,
        player_id: Some(alice.id),
        date: tomorrow,
        start_time: mk_time(10, 0)?,
        end_time: mk_time(11, 0)?,
        status: BookingStatus::Confirmed,
        block_reason: None,
        total_price_cents: 50_000,
        player_count: 8,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }).await?;

    transaction_repo.create(Transaction {
        id: Uuid::new_v4(),
        booking_id: alice_booking.id,
        amount_cents: alice_booking.total_price_cents,
        status: TransactionStatus::Completed,
        created_at: now,
    }).await?;

    let bob_booking = booking_repo.create(Booking {
        id: Uuid::new_v4(),
        venue_id: court.id,
        player_id: Some(bob.id),
        date: tomorrow,
        start_time: mk_time(18, 0)?,
        end_time: mk_time(19, 30)?,
        status: BookingStatus::Confirmed,
        block_reason: None,
        total_price_cents: 45_000,
        player_count: 4,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }).await?;

    transaction_repo.create(Transaction {
        id: Uuid::new_v4(),
        booking_id: bob_booking.id,
        amount_cents: bob_booking.total_price_cents,
        status: TransactionStatus::Completed,
        created_at: now,
    }).await?;

    // Owner maintenance block on the arena
    booking_repo.create(Booking {
        id: Uuid::new_v4(),
        venue_id: arena.id,
        player_id: None,
        date: tomorrow,
        start_time: mk_time(14, 0)?,
        end_time: mk_time(15, 0)?,
        status: BookingStatus::Blocked,
        block_reason: Some("Pitch maintenance".to_string()),
        total_price_cents: 0,
        player_count: 0,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }).await?;

    println!("  ✅ Created 2 bookings and 1 maintenance block");

    println!("🎉 Seeding complete!");

    Ok(())
}
