//! Summing raw Revolut transactions into inflow/outflow totals in cents.
//!
//! Transactions either carry a flat signed `amount` or a `legs` list whose
//! entries each carry one. Revolut reports some currencies in minor units and
//! others in major units; an integral magnitude of 1000 or more is taken to be
//! cents already, anything else is treated as a major-unit decimal. A genuine
//! major-unit amount such as `1000.00` is therefore read as ten dollars.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

const MINOR_UNIT_THRESHOLD: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    /// Magnitude of `amount` if it moves money in this direction.
    pub fn select(self, amount: Decimal) -> Option<Decimal> {
        match self {
            Direction::Inflow if amount.is_sign_positive() && !amount.is_zero() => Some(amount),
            Direction::Outflow if amount.is_sign_negative() && !amount.is_zero() => Some(amount.abs()),
            _ => None,
        }
    }
}

/// Signed amounts carried by one transaction record. `None` marks an amount
/// that was absent or not numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionAmounts {
    Flat(Option<Decimal>),
    Legged(Vec<Option<Decimal>>),
}

impl TransactionAmounts {
    pub fn from_json(tx: &Value) -> Self {
        match tx.get("legs") {
            Some(Value::Array(legs)) => TransactionAmounts::Legged(
                legs.iter().map(|leg| numeric_amount(leg.get("amount"))).collect(),
            ),
            _ => TransactionAmounts::Flat(numeric_amount(tx.get("amount"))),
        }
    }

    pub fn amounts(&self) -> impl Iterator<Item = Decimal> + '_ {
        let slice: &[Option<Decimal>] = match self {
            TransactionAmounts::Flat(amount) => std::slice::from_ref(amount),
            TransactionAmounts::Legged(legs) => legs,
        };
        slice.iter().flatten().copied()
    }

    pub fn cents(&self, direction: Direction) -> i64 {
        self.amounts()
            .filter_map(|a| direction.select(a))
            .filter_map(normalize_to_cents)
            .fold(0, i64::saturating_add)
    }
}

/// JSON numbers are read from their shortest decimal text so `12.345` stays
/// `12.345` instead of its binary neighbour. Numeric strings are accepted too.
fn numeric_amount(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Normalizes a non-negative magnitude to integer cents.
pub fn normalize_to_cents(magnitude: Decimal) -> Option<i64> {
    if magnitude >= Decimal::from(MINOR_UNIT_THRESHOLD) && magnitude.fract().is_zero() {
        return magnitude.to_i64();
    }
    magnitude
        .checked_mul(Decimal::from(100))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Totals saturate at `i64::MAX` rather than wrapping.
pub fn sum_cents(transactions: &[Value], direction: Direction) -> i64 {
    transactions
        .iter()
        .map(|tx| TransactionAmounts::from_json(tx).cents(direction))
        .fold(0, i64::saturating_add)
}

pub fn sum_outflow_cents(transactions: &[Value]) -> i64 {
    sum_cents(transactions, Direction::Outflow)
}

pub fn sum_inflow_cents(transactions: &[Value]) -> i64 {
    sum_cents(transactions, Direction::Inflow)
}
