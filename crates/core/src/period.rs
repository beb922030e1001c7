use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn year_month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid year-month regex"))
}

/// A calendar month, rendered and stored as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Accepts exactly four digits, a dash, and a two-digit month `01`..=`12`.
    pub fn parse(value: &str) -> Option<Self> {
        if !year_month_pattern().is_match(value) {
            return None;
        }
        let (year, month) = value.split_once('-')?;
        Some(YearMonth {
            year: year.parse().ok()?,
            month: month.parse().ok()?,
        })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn add_months(self, n: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + n;
        YearMonth {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(self) -> Self {
        self.add_months(-1)
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Short display label such as `Mar 2025`.
    pub fn label(self) -> String {
        format!("{} {}", MONTH_ABBREVIATIONS[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        YearMonth::parse(&value).ok_or_else(|| format!("invalid year-month: {value}"))
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// First of the month containing `today` through `today`, inclusive.
    pub fn month_to_date(today: NaiveDate) -> Self {
        DateRange::new(YearMonth::from_date(today).first_day(), today)
    }

    /// The `days` days ending at `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange::new(today - Duration::days(days), today)
    }
}
