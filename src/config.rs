use anyhow::{Context, Result};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub public_base_url: String,
    pub cookie_secure: bool,

    // Backend
    pub backend_base_url: String,

    // Wizard
    pub fixed_start_date: NaiveDate,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "https://www.sdeal.com".to_string()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),

            // Backend - persistence and payments
            backend_base_url: std::env::var("BACKEND_BASE_URL")
                .context("BACKEND_BASE_URL not set")?,

            // Wizard - fixed future start date offered to existing sellers
            fixed_start_date: match std::env::var("FIXED_START_DATE") {
                Ok(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .with_context(|| format!("FIXED_START_DATE is not a YYYY-MM-DD date: {}", v))?,
                Err(_) => default_fixed_start_date(),
            },
        })
    }
}

fn default_fixed_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}
