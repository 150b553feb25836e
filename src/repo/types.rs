use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Question ids of the four Likert items, in report order (p1..p4).
pub const LIKERT_QUESTIONS: [i32; 4] = [1, 2, 3, 4];
/// Question id of the free-text comment.
pub const COMMENT_QUESTION: i32 = 5;

/// Role a user logs in as. Stored as the `user_role` postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "estudiante")]
    Student,
    #[serde(alias = "docente")]
    Teacher,
    #[serde(alias = "administrador")]
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Withdrawn,
}

/// User row reached through one of the role tables. `code` is the
/// role-specific identifier (student code, staff code or email).
#[derive(Debug, Clone, FromRow)]
pub struct LoginRecord {
    pub user_id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentRecord {
    pub user_id: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeacherRecord {
    pub user_id: i32,
}

/// One active enrollment detail of a student, joined to its course and teacher.
#[derive(Debug, Clone, FromRow)]
pub struct CourseEnrollmentRow {
    pub detail_id: i32,
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub teacher_name: String,
    pub period: String,
    pub group_name: String,
    pub responded: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentDetailRecord {
    pub id: i32,
    pub assignment_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: i32,
    pub numeric_value: Option<i32>,
    pub text_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AnswerRecord {
    pub question_id: i32,
    pub numeric_value: Option<i32>,
    pub text_value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub enrollment_detail_id: i32,
    pub submitted_at: OffsetDateTime,
    pub answers: Vec<AnswerRecord>,
}

/// Result of the transactional evaluation insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted { evaluation_id: i32 },
    /// The detail already had an evaluation; nothing was written.
    Duplicate,
}

/// A taught course instance with every enrollment detail under it.
#[derive(Debug, Clone)]
pub struct AssignmentSnapshot {
    pub assignment_id: i32,
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub teacher_name: String,
    pub period: String,
    pub group_name: String,
    pub details: Vec<DetailSnapshot>,
}

#[derive(Debug, Clone)]
pub struct DetailSnapshot {
    pub detail_id: i32,
    /// Answers of the detail's evaluation, `None` when not yet evaluated.
    pub evaluation: Option<Vec<AnswerRecord>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct EvaluationPeriod {
    pub id: i32,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_active: bool,
}
