use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, Date};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Fallback evaluation window used until a row exists in `evaluation_periods`.
#[derive(Debug, Clone)]
pub struct PeriodConfig {
    pub start_date: Date,
    pub end_date: Date,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub period: PeriodConfig,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts()?,
        };
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "teacheval".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "teacheval-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(120),
        };
        let period = PeriodConfig {
            start_date: env_date("EVAL_PERIOD_START", "2025-03-01")?,
            end_date: env_date("EVAL_PERIOD_END", "2025-07-31")?,
            is_active: env_flag("EVAL_PERIOD_ACTIVE", true),
        };
        anyhow::ensure!(
            period.start_date <= period.end_date,
            "EVAL_PERIOD_START must not be after EVAL_PERIOD_END"
        );

        Ok(Self {
            database_url,
            max_connections,
            jwt,
            period,
            seed_demo_data: env_flag("SEED_DEMO_DATA", false),
        })
    }
}

fn database_url_from_parts() -> anyhow::Result<String> {
    let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("DB_USER").context("neither DATABASE_URL nor DB_USER is set")?;
    let pass = std::env::var("DB_PASS").unwrap_or_default();
    let name = std::env::var("DB_NAME").context("neither DATABASE_URL nor DB_NAME is set")?;
    Ok(format!("postgres://{user}:{pass}@{host}:{port}/{name}"))
}

pub(crate) fn parse_date(value: &str) -> anyhow::Result<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn env_date(key: &str, default: &str) -> anyhow::Result<Date> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_date(&raw).with_context(|| format!("reading {key}"))
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
