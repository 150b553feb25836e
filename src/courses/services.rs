use time::Date;
use tracing::{debug, warn};

use crate::{
    courses::dto::CourseItem,
    error::{AppError, Result},
    period::PeriodWindow,
    repo::Repository,
};

pub async fn list_courses(
    repo: &dyn Repository,
    student_code: &str,
    period: &PeriodWindow,
    today: Date,
) -> Result<Vec<CourseItem>> {
    let student = repo.find_student_by_code(student_code).await?.ok_or_else(|| {
        warn!(%student_code, "course listing for unknown student");
        AppError::NotFound("Student not found".into())
    })?;

    let is_survey_active = period.is_open(today);
    let items: Vec<CourseItem> = repo
        .list_student_courses(student.user_id)
        .await?
        .into_iter()
        .map(|row| CourseItem {
            id: row.course_id,
            detail_id: row.detail_id,
            name: row.course_name,
            code: row.course_code,
            teacher: row.teacher_name,
            period: row.period,
            group: row.group_name,
            responded: row.responded,
            is_survey_active,
        })
        .collect();

    debug!(student_id = student.user_id, courses = items.len(), "courses listed");
    Ok(items)
}
