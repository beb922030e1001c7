pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, LiveData};
