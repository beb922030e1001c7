pub mod db;

pub use db::{
    create_db, get_burn_for_year_month, get_burn_history_for_projection,
    get_monthly_burn_records, get_revenue_for_year_month, upsert_monthly_burn,
    upsert_monthly_revenue, DbPool,
};
