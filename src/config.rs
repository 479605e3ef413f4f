use std::env;

use uuid::Uuid;

use crate::middleware::rate_limit::{RateLimitQuota, RateLimits};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub secret: String,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub rate_limits: RateLimits,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let secret = match env::var("APP_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("APP_SECRET is not set; sessions will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };
        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(3600);
        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let rate_limits = RateLimits {
            default: quota_from_env("DEFAULT_RATE_LIMITS", "200 per day, 50 per hour")?,
            login: quota_from_env("LOGIN_RATE_LIMIT", "5 per minute")?,
            register: quota_from_env("REGISTER_RATE_LIMIT", "3 per hour")?,
            add_edit: quota_from_env("ADD_EDIT_RATE_LIMIT", "10 per minute")?,
            delete: quota_from_env("DELETE_RATE_LIMIT", "5 per minute")?,
            api: quota_from_env("API_RATE_LIMIT", "100 per hour")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            secret,
            session_ttl_secs,
            cookie_secure,
            rate_limits,
        })
    }
}

fn quota_from_env(key: &str, default: &str) -> anyhow::Result<RateLimitQuota> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    RateLimitQuota::parse(&raw)
}
