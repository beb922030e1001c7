use burnboard_core::{MonthlyBurn, MonthlyEntry, MonthlyRevenue, YearMonth};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

const MAX_CONNECTIONS: u32 = 4;

type BurnRow = (
    i64,
    String,
    i64,
    String,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type RevenueRow = (
    i64,
    String,
    i64,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const BURN_COLUMNS: &str =
    "id, year_month, amount_cents, currency, notes, breakdown, created_at, updated_at";
const REVENUE_COLUMNS: &str = "id, year_month, amount_cents, currency, notes, created_at, updated_at";

/// Opens (creating if needed) the database at `url` and brings the schema up to date.
pub async fn create_db(url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .pragma("cache_size", "-32000");

    // Every connection to an in-memory database is a fresh database.
    let max_connections = if is_in_memory(url) { 1 } else { MAX_CONNECTIONS };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    tracing::debug!(url, "database ready");

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_burn (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year_month TEXT NOT NULL UNIQUE,
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            currency TEXT NOT NULL DEFAULT 'USD',
            notes TEXT,
            breakdown TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_revenue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year_month TEXT NOT NULL UNIQUE,
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            currency TEXT NOT NULL DEFAULT 'USD',
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn decode_year_month(raw: &str) -> Result<YearMonth, sqlx::Error> {
    YearMonth::parse(raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("invalid year_month in database: {raw}").into()))
}

fn burn_from_row(r: BurnRow) -> Result<MonthlyBurn, sqlx::Error> {
    Ok(MonthlyBurn {
        id: r.0,
        year_month: decode_year_month(&r.1)?,
        amount_cents: r.2,
        currency: r.3,
        notes: r.4,
        breakdown: r.5,
        created_at: r.6,
        updated_at: r.7,
    })
}

fn revenue_from_row(r: RevenueRow) -> Result<MonthlyRevenue, sqlx::Error> {
    Ok(MonthlyRevenue {
        id: r.0,
        year_month: decode_year_month(&r.1)?,
        amount_cents: r.2,
        currency: r.3,
        notes: r.4,
        created_at: r.5,
        updated_at: r.6,
    })
}

/// Most recent months first.
pub async fn get_monthly_burn_records(pool: &DbPool, limit: u32) -> Result<Vec<MonthlyBurn>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BurnRow>(&format!(
        "SELECT {BURN_COLUMNS} FROM monthly_burn ORDER BY year_month DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(burn_from_row).collect()
}

/// The `months` most recent burn records feeding the projection average.
pub async fn get_burn_history_for_projection(
    pool: &DbPool,
    months: u32,
) -> Result<Vec<MonthlyBurn>, sqlx::Error> {
    get_monthly_burn_records(pool, months).await
}

pub async fn get_burn_for_year_month(
    pool: &DbPool,
    year_month: YearMonth,
) -> Result<Option<MonthlyBurn>, sqlx::Error> {
    let row = sqlx::query_as::<_, BurnRow>(&format!(
        "SELECT {BURN_COLUMNS} FROM monthly_burn WHERE year_month = ?"
    ))
    .bind(year_month.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(burn_from_row).transpose()
}

/// Inserts the month or overwrites its figures in a single statement, so two
/// concurrent submissions for one month cannot produce two rows.
pub async fn upsert_monthly_burn(
    pool: &DbPool,
    entry: &MonthlyEntry,
    now: DateTime<Utc>,
) -> Result<MonthlyBurn, sqlx::Error> {
    let row = sqlx::query_as::<_, BurnRow>(&format!(
        r#"
        INSERT INTO monthly_burn (year_month, amount_cents, currency, notes, breakdown, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(year_month) DO UPDATE SET
            amount_cents = excluded.amount_cents,
            currency = excluded.currency,
            notes = excluded.notes,
            breakdown = excluded.breakdown,
            updated_at = excluded.updated_at
        RETURNING {BURN_COLUMNS}
        "#
    ))
    .bind(entry.year_month.to_string())
    .bind(entry.amount_cents)
    .bind(&entry.currency)
    .bind(&entry.notes)
    .bind(&entry.breakdown)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!(year_month = %entry.year_month, amount_cents = entry.amount_cents, "burn month saved");
    burn_from_row(row)
}

pub async fn get_revenue_for_year_month(
    pool: &DbPool,
    year_month: YearMonth,
) -> Result<Option<MonthlyRevenue>, sqlx::Error> {
    let row = sqlx::query_as::<_, RevenueRow>(&format!(
        "SELECT {REVENUE_COLUMNS} FROM monthly_revenue WHERE year_month = ?"
    ))
    .bind(year_month.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(revenue_from_row).transpose()
}

/// Same contract as [`upsert_monthly_burn`]; any breakdown on `entry` is ignored.
pub async fn upsert_monthly_revenue(
    pool: &DbPool,
    entry: &MonthlyEntry,
    now: DateTime<Utc>,
) -> Result<MonthlyRevenue, sqlx::Error> {
    let row = sqlx::query_as::<_, RevenueRow>(&format!(
        r#"
        INSERT INTO monthly_revenue (year_month, amount_cents, currency, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(year_month) DO UPDATE SET
            amount_cents = excluded.amount_cents,
            currency = excluded.currency,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        RETURNING {REVENUE_COLUMNS}
        "#
    ))
    .bind(entry.year_month.to_string())
    .bind(entry.amount_cents)
    .bind(&entry.currency)
    .bind(&entry.notes)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!(year_month = %entry.year_month, amount_cents = entry.amount_cents, "revenue month saved");
    revenue_from_row(row)
}
