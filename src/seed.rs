//! Demo data for local runs (`SEED_DEMO_DATA=true`). Safe to run repeatedly.

use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::{
    auth::password::hash_password,
    repo::{EnrollmentStatus, Role},
};

const DEMO_PASSWORD: &str = "123456";

async fn upsert_user(
    tx: &mut Transaction<'_, Postgres>,
    role: Role,
    name: &str,
    surname: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO users (role, name, surname, email, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET updated_at = now()
        RETURNING id
        "#,
    )
    .bind(role)
    .bind(name)
    .bind(surname)
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut **tx)
    .await
    .with_context(|| format!("upsert user {email}"))?;
    Ok(id)
}

pub async fn seed_demo_data(pool: &PgPool) -> anyhow::Result<()> {
    let hash = hash_password(DEMO_PASSWORD)?;
    let mut tx = pool.begin().await.context("begin tx")?;

    let student_id = upsert_user(
        &mut tx,
        Role::Student,
        "Juan",
        "Perez",
        "juan.perez@unac.edu.pe",
        &hash,
    )
    .await?;
    sqlx::query(
        "INSERT INTO students (user_id, student_code) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(student_id)
    .bind("20240001")
    .execute(&mut *tx)
    .await
    .context("insert student")?;

    let teacher_id = upsert_user(
        &mut tx,
        Role::Teacher,
        "Pedro",
        "Castillo",
        "pedro.castillo@unac.edu.pe",
        &hash,
    )
    .await?;
    sqlx::query(
        r#"
        INSERT INTO teachers (user_id, staff_code, classification)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(teacher_id)
    .bind("DOC001")
    .bind("Principal")
    .execute(&mut *tx)
    .await
    .context("insert teacher")?;

    let admin_id =
        upsert_user(&mut tx, Role::Admin, "Ana", "Torres", "admin@unac.edu.pe", &hash).await?;
    sqlx::query("INSERT INTO admins (user_id, title) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(admin_id)
        .bind("Jefa de departamento")
        .execute(&mut *tx)
        .await
        .context("insert admin")?;

    let course_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO courses (code, name, status)
        VALUES ('SIST-101', 'Ingeniería de Software I', 1)
        ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .fetch_one(&mut *tx)
    .await
    .context("upsert course")?;

    let assignment_id = match sqlx::query_scalar::<_, i32>(
        r#"
        SELECT id FROM teacher_assignments
         WHERE teacher_id = $1 AND course_id = $2 AND period = '2025-A' AND group_name = 'G1'
        "#,
    )
    .bind(teacher_id)
    .bind(course_id)
    .fetch_optional(&mut *tx)
    .await
    .context("find assignment")?
    {
        Some(id) => id,
        None => sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO teacher_assignments (teacher_id, course_id, period, group_name)
            VALUES ($1, $2, '2025-A', 'G1')
            RETURNING id
            "#,
        )
        .bind(teacher_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert assignment")?,
    };

    let enrollment_id = match sqlx::query_scalar::<_, i32>(
        "SELECT id FROM enrollments WHERE student_id = $1 AND period = '2025-A'",
    )
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await
    .context("find enrollment")?
    {
        Some(id) => id,
        None => sqlx::query_scalar::<_, i32>(
            "INSERT INTO enrollments (student_id, period) VALUES ($1, '2025-A') RETURNING id",
        )
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert enrollment")?,
    };

    sqlx::query(
        r#"
        INSERT INTO enrollment_details (enrollment_id, assignment_id, status)
        SELECT $1, $2, $3::enrollment_status
         WHERE NOT EXISTS (
             SELECT 1 FROM enrollment_details WHERE enrollment_id = $1 AND assignment_id = $2
         )
        "#,
    )
    .bind(enrollment_id)
    .bind(assignment_id)
    .bind(EnrollmentStatus::Active)
    .execute(&mut *tx)
    .await
    .context("insert enrollment detail")?;

    tx.commit().await.context("commit tx")?;
    info!(
        student = "20240001",
        teacher = "DOC001",
        admin = "admin@unac.edu.pe",
        "demo data seeded"
    );
    Ok(())
}
