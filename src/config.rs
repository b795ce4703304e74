use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    /// Deployment-local UTC offset; the day key and window checks use it.
    pub utc_offset: FixedOffset,
    pub settings_cache_ttl_secs: u64,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_read_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let offset_minutes: i32 = env::var("UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "480".to_string()) // default UTC+8 (WITA)
            .parse()
            .unwrap();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            utc_offset: FixedOffset::east_opt(offset_minutes * 60)
                .expect("UTC_OFFSET_MINUTES out of range"),
            settings_cache_ttl_secs: env::var("SETTINGS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),

            rate_submit_per_min: env::var("RATE_SUBMIT_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_read_per_min: env::var("RATE_READ_PER_MIN")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }
}
