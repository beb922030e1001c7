use burnboard_core::projection::parse_initial_cash_cents;
use burnboard_core::AdminAllowList;
use burnboard_revolut::{RevolutConfig, RevolutError};
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{var} is invalid: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the server reads from its environment, validated once at startup.
#[derive(Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Only meaningful for hosted libsql URLs; local SQLite ignores it.
    pub database_auth_token: Option<String>,
    pub bind_address: SocketAddr,
    pub admin_emails: AdminAllowList,
    pub initial_cash_cents: i64,
    /// Live bank data is optional; the error is kept so it can be reported.
    pub revolut: Result<RevolutConfig, RevolutError>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = optional("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_raw = optional("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDRESS",
            value: bind_raw.clone(),
        })?;

        Ok(AppConfig {
            database_url,
            database_auth_token: optional("DATABASE_AUTH_TOKEN"),
            bind_address,
            admin_emails: AdminAllowList::parse(&lookup("AUTH_ADMIN_EMAILS").unwrap_or_default()),
            initial_cash_cents: parse_initial_cash_cents(optional("BURN_INITIAL_CASH_CENTS").as_deref()),
            revolut: RevolutConfig::from_lookup(&lookup),
        })
    }
}
