use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::money::DEFAULT_CURRENCY;
use super::period::YearMonth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBurn {
    pub id: i64,
    pub year_month: YearMonth,
    pub amount_cents: i64,
    pub currency: String,
    pub notes: Option<String>,
    /// Raw breakdown JSON as submitted; only parsed for display.
    pub breakdown: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub id: i64,
    pub year_month: YearMonth,
    pub amount_cents: i64,
    pub currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Year/month and amount are required.")]
    MissingField,
    #[error("Year/month must be YYYY-MM.")]
    InvalidYearMonth,
    #[error("Amount must be a non-negative number.")]
    InvalidAmount,
}

/// Raw admin form fields, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(rename = "yearMonth", alias = "year_month")]
    pub year_month: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    pub breakdown: Option<String>,
}

/// A validated month entry ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyEntry {
    pub year_month: YearMonth,
    pub amount_cents: i64,
    pub currency: String,
    pub notes: Option<String>,
    pub breakdown: Option<String>,
}

impl MonthlyEntry {
    pub fn new(year_month: YearMonth, amount_cents: i64) -> Self {
        MonthlyEntry {
            year_month,
            amount_cents,
            currency: DEFAULT_CURRENCY.to_string(),
            notes: None,
            breakdown: None,
        }
    }

    pub fn validate_burn(form: EntryForm) -> Result<Self, EntryError> {
        let breakdown = non_blank(form.breakdown.as_deref()).map(|b| b.trim().to_string());
        let mut entry = Self::validate_common(form)?;
        entry.breakdown = breakdown;
        Ok(entry)
    }

    /// Revenue entries never carry a breakdown, even when one is submitted.
    pub fn validate_revenue(form: EntryForm) -> Result<Self, EntryError> {
        Self::validate_common(form)
    }

    fn validate_common(form: EntryForm) -> Result<Self, EntryError> {
        let (Some(year_month), Some(amount)) = (form.year_month, form.amount) else {
            return Err(EntryError::MissingField);
        };

        let year_month = YearMonth::parse(year_month.trim()).ok_or(EntryError::InvalidYearMonth)?;
        let amount_cents = parse_amount_cents(amount.trim())?;

        Ok(MonthlyEntry {
            year_month,
            amount_cents,
            currency: non_blank(form.currency.as_deref())
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            notes: non_blank(form.notes.as_deref()).map(str::to_string),
            breakdown: None,
        })
    }
}

/// Major-unit input such as `"1234.56"` to cents, rounding half away from zero.
pub fn parse_amount_cents(raw: &str) -> Result<i64, EntryError> {
    // An empty field reads as zero, the way a numeric form input coerces it.
    let amount = if raw.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| EntryError::InvalidAmount)?
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EntryError::InvalidAmount);
    }
    amount
        .checked_mul(Decimal::from(100))
        .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|c| c.to_i64())
        .ok_or(EntryError::InvalidAmount)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
