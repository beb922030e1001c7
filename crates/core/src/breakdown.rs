//! Category/subcategory/line-item structure pasted alongside a month's burn.
//!
//! The document is stored verbatim and only interpreted when displayed. Any
//! syntactically valid JSON renders; fields that are missing or of the wrong
//! shape are skipped or shown blank, and only unparsable text degrades to a
//! notice.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

pub const INVALID_BREAKDOWN_NOTICE: &str = "Invalid breakdown JSON.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Option<String>,
    pub name: String,
    /// Major units. `None` when absent or not numeric.
    pub total: Option<Decimal>,
    pub kind: Option<String>,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subcategory {
    pub name: String,
    pub total: Option<Decimal>,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Error)]
pub enum BreakdownError {
    #[error("Invalid breakdown JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Breakdown {
    /// Fails only on malformed JSON.
    pub fn parse(raw: &str) -> Result<Self, BreakdownError> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }

    /// A missing, null or non-array `categories` reads as no categories.
    pub fn from_value(value: &Value) -> Self {
        Breakdown {
            categories: objects(value.get("categories"))
                .map(|cat| Category {
                    id: text(cat.get("id")),
                    name: text(cat.get("name")).unwrap_or_default(),
                    total: number(cat.get("total")),
                    kind: text(cat.get("type")),
                    subcategories: objects(cat.get("subcategories"))
                        .map(|sub| Subcategory {
                            name: text(sub.get("name")).unwrap_or_default(),
                            total: number(sub.get("total")),
                            items: objects(sub.get("items"))
                                .map(|item| LineItem {
                                    name: text(item.get("name")).unwrap_or_default(),
                                    amount: number(item.get("amount")),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Strings as-is, numbers and booleans by their JSON text.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Display-ready line of a breakdown tree. `formatted` is absent when the
/// source amount was missing or not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownLine {
    pub name: String,
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BreakdownLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakdownView {
    Categories { categories: Vec<BreakdownLine> },
    Empty,
    Invalid { notice: String },
}

impl BreakdownView {
    pub fn render(raw: &str, currency: &str) -> Self {
        let breakdown = match Breakdown::parse(raw) {
            Ok(b) => b,
            Err(_) => {
                return BreakdownView::Invalid {
                    notice: INVALID_BREAKDOWN_NOTICE.to_string(),
                }
            }
        };
        if breakdown.categories.is_empty() {
            return BreakdownView::Empty;
        }

        let fmt = |amount: Option<Decimal>| amount.map(|a| Money::from_decimal(a).format_whole(currency));
        let categories = breakdown
            .categories
            .into_iter()
            .map(|cat| BreakdownLine {
                name: cat.name,
                formatted: fmt(cat.total),
                children: cat
                    .subcategories
                    .into_iter()
                    .map(|sub| BreakdownLine {
                        name: sub.name,
                        formatted: fmt(sub.total),
                        children: sub
                            .items
                            .into_iter()
                            .map(|item| BreakdownLine {
                                name: item.name,
                                formatted: fmt(item.amount),
                                children: Vec::new(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        BreakdownView::Categories { categories }
    }
}
