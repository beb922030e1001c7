use burnboard_core::AdminAllowList;
use burnboard_revolut::{Direction, LiveTotal, RevolutClient, RevolutConfig, RevolutError};
use burnboard_storage::DbPool;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared application state, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub live: LiveData,
    pub admins: Arc<AdminAllowList>,
    pub initial_cash_cents: i64,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        AppState {
            db,
            live: LiveData::from_config(config.revolut),
            admins: Arc::new(config.admin_emails),
            initial_cash_cents: config.initial_cash_cents,
        }
    }
}

/// Source of live bank figures. A misconfigured integration is not fatal;
/// it is remembered with its reason and the dashboard shows no live data.
#[derive(Clone)]
pub enum LiveData {
    Connected(Arc<RevolutClient>),
    Disabled(Arc<str>),
}

impl LiveData {
    pub fn from_config(config: Result<RevolutConfig, RevolutError>) -> Self {
        match config.and_then(|c| RevolutClient::new(&c)) {
            Ok(client) => {
                tracing::info!("Revolut live data enabled");
                LiveData::Connected(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Revolut live data disabled");
                LiveData::Disabled(e.to_string().into())
            }
        }
    }

    /// Month-to-date total, or `None` when the integration is disabled or the
    /// upstream call fails.
    pub async fn month_to_date_total(&self, direction: Direction, today: NaiveDate) -> Option<LiveTotal> {
        let LiveData::Connected(client) = self else {
            return None;
        };
        match client.month_to_date_total(direction, today).await {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!(error = %e, ?direction, "live Revolut figures unavailable");
                None
            }
        }
    }
}
