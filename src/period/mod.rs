mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::PeriodWindow;

pub fn router() -> Router<AppState> {
    handlers::period_routes()
}
