use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::Result,
    reports::{dto::ReportItem, services},
    repo::Role,
    state::AppState,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(list_reports))
        .route("/teacher/my-reports", get(my_reports))
}

#[instrument(skip(state))]
pub async fn list_reports(State(state): State<AppState>) -> Result<Json<Vec<ReportItem>>> {
    Ok(Json(services::all_reports(state.repo.as_ref()).await?))
}

#[instrument(skip(state, user))]
pub async fn my_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ReportItem>>> {
    user.require(Role::Teacher)?;
    let reports = services::teacher_reports(state.repo.as_ref(), &user.code).await?;
    Ok(Json(reports))
}
