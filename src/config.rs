use crate::errors::ConfigError;
use crate::labels::LabelLocale;
use crate::models::DateRange;
use chrono::NaiveDate;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_URL: &str = "http://localhost:5000";
const DEFAULT_FROM: &str = "2025-06-01";
const DEFAULT_TO: &str = "2025-06-07";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    pub upstream_url: String,
    pub default_range: DateRange,
    pub locale: LabelLocale,
    pub upstream_timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|err| ConfigError::Invalid {
                key: "PORT",
                message: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let upstream_url = lookup("DASHBOARD_UPSTREAM_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());

        let from = parse_date(&lookup, "DASHBOARD_FROM", DEFAULT_FROM)?;
        let to = parse_date(&lookup, "DASHBOARD_TO", DEFAULT_TO)?;
        let default_range = DateRange::new(from, to).ok_or_else(|| ConfigError::EmptyRange {
            from: from.to_string(),
            to: to.to_string(),
        })?;

        let locale = match lookup("DASHBOARD_LOCALE") {
            Some(value) => value
                .parse::<LabelLocale>()
                .map_err(|message| ConfigError::Invalid {
                    key: "DASHBOARD_LOCALE",
                    message,
                })?,
            None => LabelLocale::default(),
        };

        let timeout_secs = match lookup("DASHBOARD_UPSTREAM_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|err| ConfigError::Invalid {
                key: "DASHBOARD_UPSTREAM_TIMEOUT_SECS",
                message: err.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            upstream_url,
            default_range,
            locale,
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_date<F>(lookup: &F, key: &'static str, default: &str) -> Result<NaiveDate, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| ConfigError::Invalid {
        key,
        message: format!("'{value}': {err}"),
    })
}
