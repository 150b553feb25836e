use tracing::{debug, warn};

use crate::{
    error::{AppError, Result},
    reports::{aggregate::summarize, dto::ReportItem},
    repo::Repository,
};

/// Every assignment, ordered by course name then assignment id.
pub async fn all_reports(repo: &dyn Repository) -> Result<Vec<ReportItem>> {
    let snapshots = repo.list_assignment_snapshots(None).await?;
    debug!(assignments = snapshots.len(), "building reports");
    Ok(snapshots.iter().map(summarize).collect())
}

/// Reports of the assignments taught by the teacher with `staff_code`.
pub async fn teacher_reports(repo: &dyn Repository, staff_code: &str) -> Result<Vec<ReportItem>> {
    let teacher = repo.find_teacher_by_code(staff_code).await?.ok_or_else(|| {
        warn!(%staff_code, "report request from unknown teacher");
        AppError::Forbidden("Teacher not found".into())
    })?;
    let snapshots = repo.list_assignment_snapshots(Some(teacher.user_id)).await?;
    debug!(teacher_id = teacher.user_id, assignments = snapshots.len(), "building teacher reports");
    Ok(snapshots.iter().map(summarize).collect())
}
