//! Revolut Business integration: signed client assertions, a thin JSON client,
//! and aggregation of raw transactions into month-to-date totals.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod jwt;

pub use aggregate::{sum_cents, sum_inflow_cents, sum_outflow_cents, Direction, TransactionAmounts};
pub use client::{transactions_path, LiveTotal, RawResponse, RevolutAccount, RevolutClient};
pub use config::{RevolutConfig, REVOLUT_API_BASE};
pub use error::RevolutError;
pub use jwt::{AssertionSigner, Claims};
