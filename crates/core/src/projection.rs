use serde::Serialize;

use super::period::YearMonth;

pub const PROJECTION_MONTHS: i32 = 6;
pub const DEFAULT_INITIAL_CASH_CENTS: i64 = 486_429_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedMonth {
    pub year_month: YearMonth,
    pub label: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemainingBalance {
    pub label: String,
    pub remaining_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub average_burn_cents: i64,
    pub months: Vec<ProjectedMonth>,
    pub running_remaining: Vec<RemainingBalance>,
    pub runway_months: Option<i64>,
}

/// Mean of the recorded burn amounts rounded to the nearest cent, falling
/// back to `fallback_cents` (usually last month's burn) when there is no history.
pub fn average_burn_cents(history_cents: &[i64], fallback_cents: Option<i64>) -> i64 {
    if history_cents.is_empty() {
        return fallback_cents.unwrap_or(0);
    }
    let total: i128 = history_cents.iter().map(|&c| c as i128).sum();
    let n = history_cents.len() as i128;
    // Half rounds up.
    let rounded = (2 * total + n).div_euclid(2 * n);
    rounded as i64
}

/// Projects `average_burn_cents` over the months following `current`, and the
/// cash left after each of them.
pub fn project(current: YearMonth, average_burn_cents: i64, initial_cash_cents: i64) -> Projection {
    let months: Vec<ProjectedMonth> = (1..=PROJECTION_MONTHS)
        .map(|i| {
            let year_month = current.add_months(i);
            ProjectedMonth {
                year_month,
                label: year_month.label(),
                amount_cents: average_burn_cents,
            }
        })
        .collect();

    let mut remaining_cents = initial_cash_cents;
    let running_remaining = months
        .iter()
        .map(|m| {
            remaining_cents -= m.amount_cents;
            RemainingBalance {
                label: m.label.clone(),
                remaining_cents,
            }
        })
        .collect();

    Projection {
        average_burn_cents,
        months,
        running_remaining,
        runway_months: runway_months(remaining_cents, average_burn_cents),
    }
}

/// Whole months `remaining_cents` lasts at `average_burn_cents` per month.
pub fn runway_months(remaining_cents: i64, average_burn_cents: i64) -> Option<i64> {
    (average_burn_cents > 0 && remaining_cents > 0).then(|| remaining_cents / average_burn_cents)
}

/// Runway seed from configuration. Anything that is not a usable non-zero
/// number falls back to the default.
pub fn parse_initial_cash_cents(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v != 0.0)
        .map(|v| v.round() as i64)
        .unwrap_or(DEFAULT_INITIAL_CASH_CENTS)
}
