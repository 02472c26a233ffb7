use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingPolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_duration_hours: i64,
}

/// Booking policy knobs. Loaded once at startup and treated as immutable
/// for the life of the process.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingPolicyConfig {
    /// Width of one bookable slot, in minutes.
    pub slot_minutes: i64,
    /// Same-day slots whose start is no more than this many minutes in the
    /// past are still offered.
    pub grace_minutes: i64,
    /// A confirmed booking can only be cancelled while its start is more
    /// than this many hours away.
    pub cancellation_notice_hours: i64,
}

impl Default for BookingPolicyConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 30,
            grace_minutes: 10,
            cancellation_notice_hours: 2,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("booking.slot_minutes", 30)?
            .set_default("booking.grace_minutes", 10)?
            .set_default("booking.cancellation_notice_hours", 2)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TURFBOOK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TURFBOOK").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://turfbook.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_secret: "change-me-in-production".to_string(),
                session_duration_hours: 24,
            },
            booking: BookingPolicyConfig::default(),
        }
    }
}
