//! API handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use burnboard_core::projection::{average_burn_cents, project};
use burnboard_core::{
    BreakdownView, DateRange, EntryError, EntryForm, Money, MonthlyBurn, MonthlyEntry,
    MonthlyRevenue, YearMonth, DEFAULT_CURRENCY,
};
use burnboard_revolut::{Direction, LiveTotal, RevolutError};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::error::AppError;
use crate::state::{AppState, LiveData};

/// Recorded months averaged into the projection.
pub const HISTORY_MONTHS: u32 = 12;
/// Recorded months listed on the dashboard.
pub const PREVIOUS_MONTHS: u32 = 24;
const DEBUG_WINDOW_DAYS: i64 = 30;

// ============ Response Types ============

#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResult {
    fn saved() -> (StatusCode, Json<Self>) {
        (StatusCode::OK, Json(SaveResult { ok: true, error: None }))
    }

    fn rejected(err: EntryError) -> (StatusCode, Json<Self>) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SaveResult {
                ok: false,
                error: Some(err.to_string()),
            }),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub year_month: YearMonth,
    pub amount_cents: i64,
    pub currency: String,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct PastMonthBurnView {
    #[serde(flatten)]
    pub month: MonthView,
    pub breakdown: Option<BreakdownView>,
}

#[derive(Debug, Serialize)]
pub struct ProjectedMonthView {
    pub year_month: YearMonth,
    pub label: String,
    pub amount_cents: i64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct RemainingView {
    pub label: String,
    pub remaining_cents: i64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct LiveView {
    pub total_cents: i64,
    pub currency: String,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct PreviousMonthView {
    #[serde(flatten)]
    pub month: MonthView,
    pub has_breakdown: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub currency: String,
    pub past_month: Option<PastMonthBurnView>,
    pub past_month_revenue: Option<MonthView>,
    pub average_burn_cents: i64,
    pub projected: Vec<ProjectedMonthView>,
    pub initial_cash_cents: i64,
    pub initial_cash_formatted: String,
    pub running_remaining: Vec<RemainingView>,
    pub runway_months: Option<i64>,
    pub live_spend: Option<LiveView>,
    pub live_revenue: Option<LiveView>,
    pub previous_months: Vec<PreviousMonthView>,
}

fn burn_month(r: &MonthlyBurn) -> MonthView {
    MonthView {
        year_month: r.year_month,
        amount_cents: r.amount_cents,
        currency: r.currency.clone(),
        formatted: Money::from_cents(r.amount_cents).format_whole(&r.currency),
    }
}

fn revenue_month(r: &MonthlyRevenue) -> MonthView {
    MonthView {
        year_month: r.year_month,
        amount_cents: r.amount_cents,
        currency: r.currency.clone(),
        formatted: Money::from_cents(r.amount_cents).format_whole(&r.currency),
    }
}

fn live_view(total: LiveTotal) -> LiveView {
    LiveView {
        formatted: Money::from_cents(total.total_cents).format_whole(&total.currency),
        total_cents: total.total_cents,
        currency: total.currency,
    }
}

// ============ Handlers ============

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Burn dashboard: last month's figures, six-month projection, runway, and
/// live month-to-date bank totals when available.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardView>, AppError> {
    let today = Local::now().date_naive();
    let past = YearMonth::from_date(today).previous();

    let (past_burn, past_revenue, history, previous, live_spend, live_revenue) = tokio::join!(
        burnboard_storage::get_burn_for_year_month(&state.db, past),
        burnboard_storage::get_revenue_for_year_month(&state.db, past),
        burnboard_storage::get_burn_history_for_projection(&state.db, HISTORY_MONTHS),
        burnboard_storage::get_monthly_burn_records(&state.db, PREVIOUS_MONTHS),
        state.live.month_to_date_total(Direction::Outflow, today),
        state.live.month_to_date_total(Direction::Inflow, today),
    );
    let (past_burn, past_revenue, history, previous) = (past_burn?, past_revenue?, history?, previous?);

    let currency = past_burn
        .as_ref()
        .map(|r| r.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let fmt = |cents: i64| Money::from_cents(cents).format_whole(&currency);

    let history_cents: Vec<i64> = history.iter().map(|r| r.amount_cents).collect();
    let average = average_burn_cents(&history_cents, past_burn.as_ref().map(|r| r.amount_cents));
    let projection = project(YearMonth::from_date(today), average, state.initial_cash_cents);

    let view = DashboardView {
        past_month: past_burn.as_ref().map(|r| PastMonthBurnView {
            month: burn_month(r),
            breakdown: r
                .breakdown
                .as_deref()
                .map(|raw| BreakdownView::render(raw, &currency)),
        }),
        past_month_revenue: past_revenue.as_ref().map(revenue_month),
        average_burn_cents: projection.average_burn_cents,
        projected: projection
            .months
            .iter()
            .map(|m| ProjectedMonthView {
                year_month: m.year_month,
                label: m.label.clone(),
                amount_cents: m.amount_cents,
                formatted: fmt(m.amount_cents),
            })
            .collect(),
        initial_cash_cents: state.initial_cash_cents,
        initial_cash_formatted: fmt(state.initial_cash_cents),
        running_remaining: projection
            .running_remaining
            .iter()
            .map(|r| RemainingView {
                label: r.label.clone(),
                remaining_cents: r.remaining_cents,
                formatted: fmt(r.remaining_cents),
            })
            .collect(),
        runway_months: projection.runway_months,
        live_spend: live_spend.map(live_view),
        live_revenue: live_revenue.map(live_view),
        previous_months: previous
            .iter()
            .map(|r| PreviousMonthView {
                month: burn_month(r),
                has_breakdown: r.breakdown.is_some(),
            })
            .collect(),
        currency,
    };

    Ok(Json(view))
}

/// Create or overwrite one month of burn.
pub async fn save_burn(
    State(state): State<AppState>,
    admin: AdminUser,
    Form(form): Form<EntryForm>,
) -> Result<(StatusCode, Json<SaveResult>), AppError> {
    let entry = match MonthlyEntry::validate_burn(form) {
        Ok(entry) => entry,
        Err(e) => return Ok(SaveResult::rejected(e)),
    };
    let saved = burnboard_storage::upsert_monthly_burn(&state.db, &entry, Utc::now()).await?;
    tracing::info!(
        admin = %admin.email,
        year_month = %saved.year_month,
        amount_cents = saved.amount_cents,
        "burn month saved"
    );
    Ok(SaveResult::saved())
}

/// Create or overwrite one month of revenue.
pub async fn save_revenue(
    State(state): State<AppState>,
    admin: AdminUser,
    Form(form): Form<EntryForm>,
) -> Result<(StatusCode, Json<SaveResult>), AppError> {
    let entry = match MonthlyEntry::validate_revenue(form) {
        Ok(entry) => entry,
        Err(e) => return Ok(SaveResult::rejected(e)),
    };
    let saved = burnboard_storage::upsert_monthly_revenue(&state.db, &entry, Utc::now()).await?;
    tracing::info!(
        admin = %admin.email,
        year_month = %saved.year_month,
        amount_cents = saved.amount_cents,
        "revenue month saved"
    );
    Ok(SaveResult::saved())
}

/// Passed to Revolut verbatim; a malformed date is for the upstream to reject.
#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Raw upstream JSON for the accounts list and the first account's
/// transactions, for inspecting the payload shapes during development.
pub async fn revolut_debug(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<DebugQuery>,
) -> Response {
    let today = Utc::now().date_naive();
    let window = DateRange::last_days(today, DEBUG_WINDOW_DAYS);
    let from = query.from.unwrap_or_else(|| window.start.format("%Y-%m-%d").to_string());
    let to = query.to.unwrap_or_else(|| window.end.format("%Y-%m-%d").to_string());

    let result = match &state.live {
        LiveData::Connected(client) => debug_payload(client, &from, &to).await,
        LiveData::Disabled(reason) => Err(reason.to_string()),
    };

    match result {
        Ok(body) => Json(body).into_response(),
        Err(message) => {
            tracing::warn!(error = %message, "revolut debug fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": message,
                    "_meta": { "fetchedAt": Utc::now().to_rfc3339() },
                })),
            )
                .into_response()
        }
    }
}

async fn debug_payload(
    client: &burnboard_revolut::RevolutClient,
    from: &str,
    to: &str,
) -> Result<Value, String> {
    let run = async {
        let (accounts_raw, accounts) = tokio::join!(client.fetch_raw("/accounts"), client.accounts());
        let (accounts_raw, accounts) = (accounts_raw?, accounts?);

        let transactions_endpoint = accounts
            .first()
            .map(|account| format!("/accounts/{}/transactions", account.id));
        let transactions = match &transactions_endpoint {
            Some(path) => {
                let raw = client
                    .fetch_raw_with_query(path, &[("from", from), ("to", to)])
                    .await?;
                json!({ "status": raw.status, "data": raw.data })
            }
            None => json!({
                "status": null,
                "data": null,
                "_note": "No account id available to fetch transactions",
            }),
        };

        Ok::<Value, RevolutError>(json!({
            "_meta": {
                "fetchedAt": Utc::now().to_rfc3339(),
                "dateRange": { "from": from, "to": to },
                "accountsEndpoint": "/accounts",
                "transactionsEndpoint": transactions_endpoint,
            },
            "accounts": { "status": accounts_raw.status, "data": accounts_raw.data },
            "transactions": transactions,
        }))
    };
    run.await.map_err(|e| e.to_string())
}
