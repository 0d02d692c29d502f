pub mod health;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    health::health_routes()
}
