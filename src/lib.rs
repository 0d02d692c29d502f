//! User profile CRUD service over PostgreSQL.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod users;

pub use app::{build_app, serve};
pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;
