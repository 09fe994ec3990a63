// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Number of difficulty levels a user can progress through.
pub const TOTAL_LEVELS: i32 = 3;

/// Best-attempt percentage a level needs before the next one is offered.
pub const MASTERY_PERCENTAGE: f64 = 80.0;

/// Percentage the latest attempt needs to advance once every level is mastered.
/// Also the pass mark used by the progress summary and the quiz history.
pub const ADVANCE_PERCENTAGE: f64 = 70.0;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_port: u16,
    pub cors_origin: String,
    /// Optional JSON file with questions loaded into an empty question table.
    pub questions_seed_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let cors_origin = env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let questions_seed_file = env::var("QUESTIONS_SEED_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            server_port,
            cors_origin,
            questions_seed_file,
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}
