use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    courses::{dto::CourseItem, services},
    error::Result,
    period,
    repo::Role,
    state::AppState,
};

pub fn course_routes() -> Router<AppState> {
    Router::new().route("/student/courses", get(my_courses))
}

#[instrument(skip(state, user))]
pub async fn my_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CourseItem>>> {
    user.require(Role::Student)?;
    let window = period::services::current(state.repo.as_ref(), &state.config.period).await?;
    let today = OffsetDateTime::now_utc().date();
    let items = services::list_courses(state.repo.as_ref(), &user.code, &window, today).await?;
    Ok(Json(items))
}
