//! In-memory [`Repository`] used by the service and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use super::types::*;
use super::Repository;

#[derive(Debug, Clone)]
struct UserRow {
    id: i32,
    name: String,
    surname: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct CourseRow {
    id: i32,
    code: String,
    name: String,
}

#[derive(Debug, Clone)]
struct AssignmentRow {
    id: i32,
    teacher_id: i32,
    course_id: i32,
    period: String,
    group_name: String,
}

#[derive(Debug, Clone)]
struct EnrollmentRow {
    id: i32,
    student_id: i32,
}

#[derive(Debug, Clone)]
struct DetailRow {
    id: i32,
    enrollment_id: i32,
    assignment_id: i32,
    status: EnrollmentStatus,
}

#[derive(Debug, Clone)]
struct EvaluationRow {
    detail_id: i32,
    submitted_at: OffsetDateTime,
    answers: Vec<AnswerRecord>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    users: Vec<UserRow>,
    students: Vec<(i32, String)>,
    teachers: Vec<(i32, String)>,
    admins: Vec<i32>,
    courses: Vec<CourseRow>,
    assignments: Vec<AssignmentRow>,
    enrollments: Vec<EnrollmentRow>,
    details: Vec<DetailRow>,
    evaluations: Vec<EvaluationRow>,
    periods: Vec<EvaluationPeriod>,
}

impl Tables {
    fn next(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i32) -> &UserRow {
        self.users.iter().find(|u| u.id == id).expect("user row")
    }

    fn full_name(&self, id: i32) -> String {
        let u = self.user(id);
        format!("{} {}", u.name, u.surname)
    }

    fn course_of(&self, d: &DetailRow) -> i32 {
        self.assignments
            .iter()
            .find(|a| a.id == d.assignment_id)
            .map(|a| a.course_id)
            .expect("assignment row")
    }

    fn detail_record(d: &DetailRow) -> EnrollmentDetailRecord {
        EnrollmentDetailRecord {
            id: d.id,
            assignment_id: d.assignment_id,
        }
    }

    fn student_details(&self, student_id: i32) -> impl Iterator<Item = &DetailRow> {
        let enrollment_ids: Vec<i32> = self
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .map(|e| e.id)
            .collect();
        self.details
            .iter()
            .filter(move |d| enrollment_ids.contains(&d.enrollment_id))
    }
}

/// Mirrors the question catalog seeded by migration.
fn question_exists(question_id: i32) -> bool {
    LIKERT_QUESTIONS.contains(&question_id) || question_id == COMMENT_QUESTION
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_user(&self, name: &str, surname: &str, email: &str, password_hash: &str) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.users.push(UserRow {
            id,
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        });
        id
    }

    pub fn add_student(&self, name: &str, surname: &str, code: &str, password_hash: &str) -> i32 {
        let email = format!("{code}@students.test");
        let id = self.add_user(name, surname, &email, password_hash);
        self.tables.lock().unwrap().students.push((id, code.into()));
        id
    }

    pub fn add_teacher(&self, name: &str, surname: &str, code: &str, password_hash: &str) -> i32 {
        let email = format!("{}@staff.test", code.to_lowercase());
        let id = self.add_user(name, surname, &email, password_hash);
        self.tables.lock().unwrap().teachers.push((id, code.into()));
        id
    }

    pub fn add_admin(&self, name: &str, surname: &str, email: &str, password_hash: &str) -> i32 {
        let id = self.add_user(name, surname, email, password_hash);
        self.tables.lock().unwrap().admins.push(id);
        id
    }

    pub fn add_course(&self, code: &str, name: &str) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.courses.push(CourseRow {
            id,
            code: code.into(),
            name: name.into(),
        });
        id
    }

    pub fn add_assignment(&self, teacher_id: i32, course_id: i32, period: &str, group: &str) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.assignments.push(AssignmentRow {
            id,
            teacher_id,
            course_id,
            period: period.into(),
            group_name: group.into(),
        });
        id
    }

    pub fn add_enrollment(&self, student_id: i32) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.enrollments.push(EnrollmentRow { id, student_id });
        id
    }

    pub fn add_detail(&self, enrollment_id: i32, assignment_id: i32, status: EnrollmentStatus) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.details.push(DetailRow {
            id,
            enrollment_id,
            assignment_id,
            status,
        });
        id
    }

    pub fn add_period(&self, name: &str, start_date: Date, end_date: Date, is_active: bool) -> i32 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.periods.push(EvaluationPeriod {
            id,
            name: name.into(),
            start_date,
            end_date,
            is_active,
        });
        id
    }

    /// Evaluations stored for a detail; more than one would break the invariant.
    pub fn evaluation_count(&self, detail_id: i32) -> usize {
        self.tables
            .lock()
            .unwrap()
            .evaluations
            .iter()
            .filter(|e| e.detail_id == detail_id)
            .count()
    }

    pub fn answer_count(&self, detail_id: i32) -> usize {
        self.tables
            .lock()
            .unwrap()
            .evaluations
            .iter()
            .filter(|e| e.detail_id == detail_id)
            .map(|e| e.answers.len())
            .sum()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_login(&self, role: Role, identifier: &str) -> anyhow::Result<Option<LoginRecord>> {
        let t = self.tables.lock().unwrap();
        let found = match role {
            Role::Student => t
                .students
                .iter()
                .find(|(_, code)| code == identifier)
                .map(|(id, code)| (*id, code.clone())),
            Role::Teacher => t
                .teachers
                .iter()
                .find(|(_, code)| code == identifier)
                .map(|(id, code)| (*id, code.clone())),
            Role::Admin => t
                .admins
                .iter()
                .map(|id| t.user(*id))
                .find(|u| u.email.eq_ignore_ascii_case(identifier))
                .map(|u| (u.id, u.email.clone())),
        };
        Ok(found.map(|(id, code)| {
            let u = t.user(id);
            LoginRecord {
                user_id: u.id,
                name: u.name.clone(),
                surname: u.surname.clone(),
                email: u.email.clone(),
                password_hash: u.password_hash.clone(),
                code,
            }
        }))
    }

    async fn find_student_by_code(&self, code: &str) -> anyhow::Result<Option<StudentRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.students
            .iter()
            .find(|(_, c)| c == code)
            .map(|(id, _)| StudentRecord { user_id: *id }))
    }

    async fn find_teacher_by_code(&self, code: &str) -> anyhow::Result<Option<TeacherRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.teachers
            .iter()
            .find(|(_, c)| c == code)
            .map(|(id, _)| TeacherRecord { user_id: *id }))
    }

    async fn list_student_courses(&self, student_id: i32) -> anyhow::Result<Vec<CourseEnrollmentRow>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<CourseEnrollmentRow> = t
            .student_details(student_id)
            .filter(|d| d.status == EnrollmentStatus::Active)
            .map(|d| {
                let a = t.assignments.iter().find(|a| a.id == d.assignment_id).expect("assignment");
                let c = t.courses.iter().find(|c| c.id == a.course_id).expect("course");
                CourseEnrollmentRow {
                    detail_id: d.id,
                    course_id: c.id,
                    course_code: c.code.clone(),
                    course_name: c.name.clone(),
                    teacher_name: t.full_name(a.teacher_id),
                    period: a.period.clone(),
                    group_name: a.group_name.clone(),
                    responded: t.evaluations.iter().any(|e| e.detail_id == d.id),
                }
            })
            .collect();
        rows.sort_by(|a, b| (&a.course_name, a.detail_id).cmp(&(&b.course_name, b.detail_id)));
        Ok(rows)
    }

    async fn find_active_details_by_student_and_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> anyhow::Result<Vec<EnrollmentDetailRecord>> {
        let t = self.tables.lock().unwrap();
        let details: Vec<EnrollmentDetailRecord> = t
            .student_details(student_id)
            .filter(|d| d.status == EnrollmentStatus::Active && t.course_of(d) == course_id)
            .map(Tables::detail_record)
            .collect();
        Ok(details)
    }

    async fn find_detail_for_student(
        &self,
        student_id: i32,
        detail_id: i32,
    ) -> anyhow::Result<Option<EnrollmentDetailRecord>> {
        let t = self.tables.lock().unwrap();
        let found = t
            .student_details(student_id)
            .find(|d| d.id == detail_id)
            .map(Tables::detail_record);
        Ok(found)
    }

    async fn evaluation_exists(&self, detail_id: i32) -> anyhow::Result<bool> {
        let t = self.tables.lock().unwrap();
        Ok(t.evaluations.iter().any(|e| e.detail_id == detail_id))
    }

    async fn insert_evaluation(
        &self,
        detail_id: i32,
        answers: Vec<NewAnswer>,
    ) -> anyhow::Result<InsertOutcome> {
        anyhow::ensure!(!answers.is_empty(), "an evaluation needs answers");
        if let Some(bad) = answers.iter().find(|a| !question_exists(a.question_id)) {
            anyhow::bail!(
                "answers.question_id {} violates the questions foreign key",
                bad.question_id
            );
        }
        // Yield so concurrent submitters interleave between the existence
        // check and this insert, as they would against a real database.
        tokio::task::yield_now().await;

        let mut t = self.tables.lock().unwrap();
        if t.evaluations.iter().any(|e| e.detail_id == detail_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = t.next();
        t.evaluations.push(EvaluationRow {
            detail_id,
            submitted_at: OffsetDateTime::now_utc(),
            answers: answers
                .into_iter()
                .map(|a| AnswerRecord {
                    question_id: a.question_id,
                    numeric_value: a.numeric_value,
                    text_value: a.text_value,
                })
                .collect(),
        });
        Ok(InsertOutcome::Inserted { evaluation_id: id })
    }

    async fn find_evaluation(&self, detail_id: i32) -> anyhow::Result<Option<EvaluationRecord>> {
        let t = self.tables.lock().unwrap();
        let found = t
            .evaluations
            .iter()
            .find(|e| e.detail_id == detail_id)
            .map(|e| {
                let mut answers = e.answers.clone();
                answers.sort_by_key(|a| a.question_id);
                EvaluationRecord {
                    enrollment_detail_id: e.detail_id,
                    submitted_at: e.submitted_at,
                    answers,
                }
            });
        Ok(found)
    }

    async fn list_assignment_snapshots(
        &self,
        teacher_id: Option<i32>,
    ) -> anyhow::Result<Vec<AssignmentSnapshot>> {
        let t = self.tables.lock().unwrap();
        let mut snapshots: Vec<AssignmentSnapshot> = t
            .assignments
            .iter()
            .filter(|a| teacher_id.map_or(true, |id| a.teacher_id == id))
            .map(|a| {
                let c = t.courses.iter().find(|c| c.id == a.course_id).expect("course");
                let details = t
                    .details
                    .iter()
                    .filter(|d| d.assignment_id == a.id)
                    .map(|d| DetailSnapshot {
                        detail_id: d.id,
                        evaluation: t
                            .evaluations
                            .iter()
                            .find(|e| e.detail_id == d.id)
                            .map(|e| e.answers.clone()),
                    })
                    .collect();
                AssignmentSnapshot {
                    assignment_id: a.id,
                    course_id: c.id,
                    course_code: c.code.clone(),
                    course_name: c.name.clone(),
                    teacher_name: t.full_name(a.teacher_id),
                    period: a.period.clone(),
                    group_name: a.group_name.clone(),
                    details,
                }
            })
            .collect();
        snapshots.sort_by(|a, b| {
            (&a.course_name, a.assignment_id).cmp(&(&b.course_name, b.assignment_id))
        });
        Ok(snapshots)
    }

    async fn current_period(&self) -> anyhow::Result<Option<EvaluationPeriod>> {
        let t = self.tables.lock().unwrap();
        Ok(t.periods
            .iter()
            .max_by_key(|p| (p.is_active, p.start_date, p.id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrolled_detail(repo: &MemoryRepository) -> i32 {
        let student = repo.add_student("Juan", "Perez", "20240001", "x");
        let teacher = repo.add_teacher("Pedro", "Castillo", "DOC001", "x");
        let course = repo.add_course("SIST-101", "Ingeniería de Software I");
        let assignment = repo.add_assignment(teacher, course, "2025-A", "G1");
        let enrollment = repo.add_enrollment(student);
        repo.add_detail(enrollment, assignment, EnrollmentStatus::Active)
    }

    #[tokio::test]
    async fn unknown_question_leaves_no_evaluation_behind() {
        let repo = MemoryRepository::new();
        let detail = enrolled_detail(&repo);
        let answers = vec![
            NewAnswer {
                question_id: 1,
                numeric_value: Some(5),
                text_value: None,
            },
            NewAnswer {
                question_id: 99,
                numeric_value: Some(4),
                text_value: None,
            },
        ];

        let err = repo.insert_evaluation(detail, answers).await.unwrap_err();
        assert!(err.to_string().contains("question_id 99"));
        assert_eq!(repo.evaluation_count(detail), 0);
        assert_eq!(repo.answer_count(detail), 0);
        assert!(!repo.evaluation_exists(detail).await.unwrap());
    }

    #[tokio::test]
    async fn detail_lookup_is_scoped_to_the_student() {
        let repo = MemoryRepository::new();
        let detail = enrolled_detail(&repo);
        let other = repo.add_student("Ana", "Diaz", "20240002", "x");
        let owner = repo.find_student_by_code("20240001").await.unwrap().unwrap();

        let found = repo.find_detail_for_student(owner.user_id, detail).await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(detail));
        assert!(repo.find_detail_for_student(other, detail).await.unwrap().is_none());
    }
}
