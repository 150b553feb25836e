//! Data access for the survey service.
//!
//! Every join the API relies on is a named function on [`Repository`], so the
//! services can be exercised against the in-memory implementation in tests.

use async_trait::async_trait;

mod postgres;
pub mod types;

#[cfg(test)]
pub mod memory;

pub use postgres::PgRepository;
pub use types::*;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Looks a user up through the role table matching `role`.
    async fn find_login(&self, role: Role, identifier: &str) -> anyhow::Result<Option<LoginRecord>>;

    async fn find_student_by_code(&self, code: &str) -> anyhow::Result<Option<StudentRecord>>;

    async fn find_teacher_by_code(&self, code: &str) -> anyhow::Result<Option<TeacherRecord>>;

    /// Active enrollment details of a student, ordered by course name then detail id.
    async fn list_student_courses(&self, student_id: i32) -> anyhow::Result<Vec<CourseEnrollmentRow>>;

    /// Active details of `student_id` whose assignment teaches `course_id`.
    async fn find_active_details_by_student_and_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> anyhow::Result<Vec<EnrollmentDetailRecord>>;

    /// A detail of any status, only when it belongs to `student_id`.
    async fn find_detail_for_student(
        &self,
        student_id: i32,
        detail_id: i32,
    ) -> anyhow::Result<Option<EnrollmentDetailRecord>>;

    async fn evaluation_exists(&self, detail_id: i32) -> anyhow::Result<bool>;

    /// Writes the evaluation header and its answers atomically.
    async fn insert_evaluation(
        &self,
        detail_id: i32,
        answers: Vec<NewAnswer>,
    ) -> anyhow::Result<InsertOutcome>;

    async fn find_evaluation(&self, detail_id: i32) -> anyhow::Result<Option<EvaluationRecord>>;

    /// All assignments (or only those of `teacher_id`) with every detail
    /// regardless of status, plus evaluations and answers.
    async fn list_assignment_snapshots(
        &self,
        teacher_id: Option<i32>,
    ) -> anyhow::Result<Vec<AssignmentSnapshot>>;

    async fn current_period(&self) -> anyhow::Result<Option<EvaluationPeriod>>;
}
