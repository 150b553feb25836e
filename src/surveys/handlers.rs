use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::Result,
    extract::{AppJson, AppPath},
    repo::Role,
    state::AppState,
    surveys::{
        dto::{SubmissionView, SubmitRequest, SubmitResponse},
        services,
    },
};

pub fn survey_routes() -> Router<AppState> {
    Router::new()
        .route("/api/submit", post(submit_survey))
        .route("/student/surveys/:detail_id", get(get_submission))
}

#[instrument(skip(state, user, payload))]
pub async fn submit_survey(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    user.require(Role::Student)?;
    let res = services::submit(state.repo.as_ref(), &user.code, payload).await?;
    Ok(Json(res))
}

#[instrument(skip(state, user))]
pub async fn get_submission(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(detail_id): AppPath<i32>,
) -> Result<Json<SubmissionView>> {
    user.require(Role::Student)?;
    let view = services::my_submission(state.repo.as_ref(), &user.code, detail_id).await?;
    Ok(Json(view))
}
