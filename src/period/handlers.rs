use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    error::Result,
    period::{dto::PeriodResponse, services},
    state::AppState,
};

pub fn period_routes() -> Router<AppState> {
    Router::new().route("/api/period", get(get_period))
}

#[instrument(skip(state))]
pub async fn get_period(State(state): State<AppState>) -> Result<Json<PeriodResponse>> {
    let window = services::current(state.repo.as_ref(), &state.config.period).await?;
    Ok(Json(services::to_response(&window)?))
}
