use std::net::IpAddr;

use chrono::FixedOffset;

use crate::ledger::period::offset_from_hours;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub session_hours: i64,
    /// Offset used to decide where a calendar day starts and ends.
    pub utc_offset: FixedOffset,
    pub secure_cookies: bool,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("SESSION_SECRET")?;

        if session_secret.len() < 16 {
            return Err("SESSION_SECRET must be at least 16 characters".to_string());
        }

        let host: IpAddr = env_or("ZIS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid ZIS_HOST: {e}"))?;

        let port: u16 = env_or("ZIS_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid ZIS_PORT: {e}"))?;

        let log_level = env_or("ZIS_LOG_LEVEL", "info");

        let session_hours: i64 = env_or("ZIS_SESSION_HOURS", "12")
            .parse()
            .map_err(|e| format!("Invalid ZIS_SESSION_HOURS: {e}"))?;
        if session_hours <= 0 {
            return Err("ZIS_SESSION_HOURS must be positive".to_string());
        }

        let offset_hours: i32 = env_or("ZIS_UTC_OFFSET_HOURS", "7")
            .parse()
            .map_err(|e| format!("Invalid ZIS_UTC_OFFSET_HOURS: {e}"))?;
        let utc_offset = offset_from_hours(offset_hours)
            .ok_or_else(|| format!("ZIS_UTC_OFFSET_HOURS out of range: {offset_hours}"))?;

        let secure_cookies = match env_or("ZIS_SECURE_COOKIES", "true").as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let db_max_connections: u32 = env_or("ZIS_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid ZIS_DB_MAX_CONNECTIONS: {e}"))?;

        Ok(Config {
            database_url,
            session_secret,
            host,
            port,
            log_level,
            session_hours,
            utc_offset,
            secure_cookies,
            db_max_connections,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
