use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::debug;

use super::types::*;
use super::Repository;

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentHeader {
    assignment_id: i32,
    course_id: i32,
    course_code: String,
    course_name: String,
    teacher_name: String,
    period: String,
    group_name: String,
}

/// One row of the assignment → detail → evaluation → answer left join.
#[derive(Debug, FromRow)]
struct DetailAnswerRow {
    assignment_id: i32,
    detail_id: i32,
    evaluation_id: Option<i32>,
    question_id: Option<i32>,
    numeric_value: Option<i32>,
    text_value: Option<String>,
}

/// Folds the flat join rows into per-assignment snapshots. `rows` must be
/// ordered by assignment, then detail.
fn assemble_snapshots(
    headers: Vec<AssignmentHeader>,
    rows: Vec<DetailAnswerRow>,
) -> Vec<AssignmentSnapshot> {
    let mut snapshots: Vec<AssignmentSnapshot> = headers
        .into_iter()
        .map(|h| AssignmentSnapshot {
            assignment_id: h.assignment_id,
            course_id: h.course_id,
            course_code: h.course_code,
            course_name: h.course_name,
            teacher_name: h.teacher_name,
            period: h.period,
            group_name: h.group_name,
            details: Vec::new(),
        })
        .collect();
    let index: HashMap<i32, usize> = snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| (s.assignment_id, i))
        .collect();

    for row in rows {
        let Some(&i) = index.get(&row.assignment_id) else {
            continue;
        };
        let details = &mut snapshots[i].details;
        if details.last().map(|d| d.detail_id) != Some(row.detail_id) {
            details.push(DetailSnapshot {
                detail_id: row.detail_id,
                evaluation: row.evaluation_id.map(|_| Vec::new()),
            });
        }
        if let (Some(detail), Some(question_id)) = (details.last_mut(), row.question_id) {
            if let Some(answers) = detail.evaluation.as_mut() {
                answers.push(AnswerRecord {
                    question_id,
                    numeric_value: row.numeric_value,
                    text_value: row.text_value,
                });
            }
        }
    }
    snapshots
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_login(&self, role: Role, identifier: &str) -> anyhow::Result<Option<LoginRecord>> {
        let sql = match role {
            Role::Student => {
                r#"
                SELECT u.id AS user_id, u.name, u.surname, u.email, u.password_hash,
                       s.student_code AS code
                  FROM students s
                  JOIN users u ON u.id = s.user_id
                 WHERE s.student_code = $1
                "#
            }
            Role::Teacher => {
                r#"
                SELECT u.id AS user_id, u.name, u.surname, u.email, u.password_hash,
                       t.staff_code AS code
                  FROM teachers t
                  JOIN users u ON u.id = t.user_id
                 WHERE t.staff_code = $1
                "#
            }
            Role::Admin => {
                r#"
                SELECT u.id AS user_id, u.name, u.surname, u.email, u.password_hash,
                       u.email AS code
                  FROM admins a
                  JOIN users u ON u.id = a.user_id
                 WHERE lower(u.email) = lower($1)
                "#
            }
        };
        let record = sqlx::query_as::<_, LoginRecord>(sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("find {role} login"))?;
        Ok(record)
    }

    async fn find_student_by_code(&self, code: &str) -> anyhow::Result<Option<StudentRecord>> {
        let student = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT s.user_id
              FROM students s
              JOIN users u ON u.id = s.user_id
             WHERE s.student_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .context("find student by code")?;
        Ok(student)
    }

    async fn find_teacher_by_code(&self, code: &str) -> anyhow::Result<Option<TeacherRecord>> {
        let teacher = sqlx::query_as::<_, TeacherRecord>(
            r#"
            SELECT t.user_id
              FROM teachers t
              JOIN users u ON u.id = t.user_id
             WHERE t.staff_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .context("find teacher by code")?;
        Ok(teacher)
    }

    async fn list_student_courses(&self, student_id: i32) -> anyhow::Result<Vec<CourseEnrollmentRow>> {
        let rows = sqlx::query_as::<_, CourseEnrollmentRow>(
            r#"
            SELECT d.id AS detail_id, c.id AS course_id, c.code AS course_code,
                   c.name AS course_name, tu.name || ' ' || tu.surname AS teacher_name,
                   ta.period, ta.group_name,
                   EXISTS (
                       SELECT 1 FROM evaluations ev WHERE ev.enrollment_detail_id = d.id
                   ) AS responded
              FROM enrollments e
              JOIN enrollment_details d ON d.enrollment_id = e.id
              JOIN teacher_assignments ta ON ta.id = d.assignment_id
              JOIN courses c ON c.id = ta.course_id
              JOIN users tu ON tu.id = ta.teacher_id
             WHERE e.student_id = $1
               AND d.status = $2
             ORDER BY c.name, d.id
            "#,
        )
        .bind(student_id)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await
        .context("list student courses")?;
        Ok(rows)
    }

    async fn find_active_details_by_student_and_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> anyhow::Result<Vec<EnrollmentDetailRecord>> {
        let rows = sqlx::query_as::<_, EnrollmentDetailRecord>(
            r#"
            SELECT d.id, d.assignment_id
              FROM enrollment_details d
              JOIN enrollments e ON e.id = d.enrollment_id
              JOIN teacher_assignments ta ON ta.id = d.assignment_id
             WHERE e.student_id = $1
               AND ta.course_id = $2
               AND d.status = $3
             ORDER BY d.id
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await
        .context("find enrollment details by student and course")?;
        Ok(rows)
    }

    async fn find_detail_for_student(
        &self,
        student_id: i32,
        detail_id: i32,
    ) -> anyhow::Result<Option<EnrollmentDetailRecord>> {
        let row = sqlx::query_as::<_, EnrollmentDetailRecord>(
            r#"
            SELECT d.id, d.assignment_id
              FROM enrollment_details d
              JOIN enrollments e ON e.id = d.enrollment_id
             WHERE e.student_id = $1
               AND d.id = $2
            "#,
        )
        .bind(student_id)
        .bind(detail_id)
        .fetch_optional(&self.pool)
        .await
        .context("find enrollment detail for student")?;
        Ok(row)
    }

    async fn evaluation_exists(&self, detail_id: i32) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM evaluations WHERE enrollment_detail_id = $1)",
        )
        .bind(detail_id)
        .fetch_one(&self.pool)
        .await
        .context("check evaluation exists")?;
        Ok(exists)
    }

    async fn insert_evaluation(
        &self,
        detail_id: i32,
        answers: Vec<NewAnswer>,
    ) -> anyhow::Result<InsertOutcome> {
        anyhow::ensure!(!answers.is_empty(), "an evaluation needs answers");

        let mut tx = self.pool.begin().await.context("begin tx")?;

        let inserted = sqlx::query_scalar::<_, i32>(
            "INSERT INTO evaluations (enrollment_detail_id) VALUES ($1) RETURNING id",
        )
        .bind(detail_id)
        .fetch_one(&mut *tx)
        .await;

        // Dropping `tx` without commit rolls it back.
        let evaluation_id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(detail_id, "evaluation unique constraint hit");
                return Ok(InsertOutcome::Duplicate);
            }
            Err(e) => return Err(e).context("insert evaluation"),
        };

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO answers (evaluation_id, question_id, numeric_value, text_value) ",
        );
        qb.push_values(answers, |mut b, answer| {
            b.push_bind(evaluation_id)
                .push_bind(answer.question_id)
                .push_bind(answer.numeric_value)
                .push_bind(answer.text_value);
        });
        qb.build()
            .execute(&mut *tx)
            .await
            .context("insert answers")?;

        tx.commit().await.context("commit tx")?;
        Ok(InsertOutcome::Inserted { evaluation_id })
    }

    async fn find_evaluation(&self, detail_id: i32) -> anyhow::Result<Option<EvaluationRecord>> {
        let header = sqlx::query_as::<_, (i32, OffsetDateTime)>(
            r#"
            SELECT id, submitted_at
              FROM evaluations
             WHERE enrollment_detail_id = $1
            "#,
        )
        .bind(detail_id)
        .fetch_optional(&self.pool)
        .await
        .context("find evaluation")?;

        let Some((id, submitted_at)) = header else {
            return Ok(None);
        };

        let answers = sqlx::query_as::<_, AnswerRecord>(
            r#"
            SELECT question_id, numeric_value, text_value
              FROM answers
             WHERE evaluation_id = $1
             ORDER BY question_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("list evaluation answers")?;

        Ok(Some(EvaluationRecord {
            enrollment_detail_id: detail_id,
            submitted_at,
            answers,
        }))
    }

    async fn list_assignment_snapshots(
        &self,
        teacher_id: Option<i32>,
    ) -> anyhow::Result<Vec<AssignmentSnapshot>> {
        let headers = sqlx::query_as::<_, AssignmentHeader>(
            r#"
            SELECT ta.id AS assignment_id, c.id AS course_id, c.code AS course_code,
                   c.name AS course_name, u.name || ' ' || u.surname AS teacher_name,
                   ta.period, ta.group_name
              FROM teacher_assignments ta
              JOIN courses c ON c.id = ta.course_id
              JOIN users u ON u.id = ta.teacher_id
             WHERE ($1::INT IS NULL OR ta.teacher_id = $1)
             ORDER BY c.name, ta.id
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .context("list teacher assignments")?;

        let rows = sqlx::query_as::<_, DetailAnswerRow>(
            r#"
            SELECT d.assignment_id, d.id AS detail_id, ev.id AS evaluation_id,
                   a.question_id, a.numeric_value, a.text_value
              FROM enrollment_details d
              JOIN teacher_assignments ta ON ta.id = d.assignment_id
              LEFT JOIN evaluations ev ON ev.enrollment_detail_id = d.id
              LEFT JOIN answers a ON a.evaluation_id = ev.id
             WHERE ($1::INT IS NULL OR ta.teacher_id = $1)
             ORDER BY d.assignment_id, d.id, a.question_id
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .context("list enrollment details with answers")?;

        Ok(assemble_snapshots(headers, rows))
    }

    async fn current_period(&self) -> anyhow::Result<Option<EvaluationPeriod>> {
        let period = sqlx::query_as::<_, EvaluationPeriod>(
            r#"
            SELECT id, name, start_date, end_date, is_active
              FROM evaluation_periods
             ORDER BY is_active DESC, start_date DESC, id DESC
             LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("find current evaluation period")?;
        Ok(period)
    }
}
