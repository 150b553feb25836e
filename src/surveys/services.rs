use tracing::{info, warn};

use crate::{
    error::{AppError, Result},
    repo::{
        AnswerRecord, InsertOutcome, NewAnswer, Repository, StudentRecord,
        COMMENT_QUESTION, LIKERT_QUESTIONS,
    },
    surveys::dto::{AnswersPayload, AnswersView, SubmissionView, SubmitRequest, SubmitResponse},
};

async fn resolve_student(repo: &dyn Repository, code: &str) -> Result<StudentRecord> {
    repo.find_student_by_code(code).await?.ok_or_else(|| {
        warn!(student_code = %code, "unknown student");
        AppError::NotFound("Student not found".into())
    })
}

fn likert(name: &str, value: Option<i32>) -> Result<i32> {
    let v = value.ok_or_else(|| AppError::ValidationMissing(format!("answer {name} is required")))?;
    if !(1..=5).contains(&v) {
        return Err(AppError::Validation(format!(
            "answer {name} must be between 1 and 5"
        )));
    }
    Ok(v)
}

/// Checks the payload and turns it into the five answer rows.
fn validate_answers(answers: &AnswersPayload) -> Result<Vec<NewAnswer>> {
    let values = [
        likert("p1", answers.p1)?,
        likert("p2", answers.p2)?,
        likert("p3", answers.p3)?,
        likert("p4", answers.p4)?,
    ];
    let comment = answers.comment.as_deref().unwrap_or("").trim().to_string();

    let mut rows: Vec<NewAnswer> = LIKERT_QUESTIONS
        .iter()
        .zip(values)
        .map(|(&question_id, value)| NewAnswer {
            question_id,
            numeric_value: Some(value),
            text_value: None,
        })
        .collect();
    rows.push(NewAnswer {
        question_id: COMMENT_QUESTION,
        numeric_value: None,
        text_value: Some(comment),
    });
    Ok(rows)
}

pub async fn submit(
    repo: &dyn Repository,
    student_code: &str,
    req: SubmitRequest,
) -> Result<SubmitResponse> {
    if let Some(claimed) = req.student.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if claimed != student_code {
            warn!(%claimed, %student_code, "submission for another student");
            return Err(AppError::Forbidden(
                "You can only submit evaluations for yourself".into(),
            ));
        }
    }
    let course_id = req
        .course_id
        .ok_or_else(|| AppError::ValidationMissing("courseId is required".into()))?;

    let student = resolve_student(repo, student_code).await?;

    let mut details = repo
        .find_active_details_by_student_and_course(student.user_id, course_id)
        .await?;
    if let Some(detail_id) = req.detail_id {
        details.retain(|d| d.id == detail_id);
    }
    let detail = match details.len() {
        0 => {
            warn!(student_id = student.user_id, course_id, "not enrolled");
            return Err(AppError::NotFound("Not enrolled in this course".into()));
        }
        1 => details.remove(0),
        n => {
            warn!(student_id = student.user_id, course_id, matches = n, "ambiguous enrollment");
            return Err(AppError::AmbiguousEnrollment);
        }
    };

    if repo.evaluation_exists(detail.id).await? {
        warn!(detail_id = detail.id, "duplicate submission");
        return Err(AppError::DuplicateSubmission);
    }

    let answers = validate_answers(&req.answers)?;

    match repo.insert_evaluation(detail.id, answers).await? {
        InsertOutcome::Inserted { evaluation_id } => {
            info!(
                student_id = student.user_id,
                detail_id = detail.id,
                assignment_id = detail.assignment_id,
                evaluation_id,
                "survey submitted"
            );
            Ok(SubmitResponse {
                success: true,
                message: "Survey saved successfully".into(),
            })
        }
        InsertOutcome::Duplicate => {
            warn!(detail_id = detail.id, "duplicate submission lost the insert race");
            Err(AppError::DuplicateSubmission)
        }
    }
}

fn to_view(answers: &[AnswerRecord]) -> AnswersView {
    let mut view = AnswersView::default();
    for a in answers {
        match a.question_id {
            1 => view.p1 = a.numeric_value,
            2 => view.p2 = a.numeric_value,
            3 => view.p3 = a.numeric_value,
            4 => view.p4 = a.numeric_value,
            COMMENT_QUESTION => view.comment = a.text_value.clone().unwrap_or_default(),
            _ => {}
        }
    }
    view
}

/// The caller's own stored evaluation for one of their enrollment details.
pub async fn my_submission(
    repo: &dyn Repository,
    student_code: &str,
    detail_id: i32,
) -> Result<SubmissionView> {
    let student = resolve_student(repo, student_code).await?;
    let detail = repo
        .find_detail_for_student(student.user_id, detail_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".into()))?;
    let evaluation = repo
        .find_evaluation(detail.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No evaluation submitted yet".into()))?;

    Ok(SubmissionView {
        detail_id: evaluation.enrollment_detail_id,
        submitted_at: evaluation.submitted_at,
        answers: to_view(&evaluation.answers),
    })
}
