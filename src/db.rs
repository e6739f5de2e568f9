use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::config::GradebookConfig;
use crate::ingest::{self, RejectedRow, ValidatedRow};
use crate::models::{Assignment, ClassSnapshot, GradeEntry, Student};
use crate::source::GradeSource;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed [`GradeSource`].
#[derive(Debug, Clone)]
pub struct PgGradeSource {
    pool: PgPool,
}

impl PgGradeSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GradeSource for PgGradeSource {
    async fn fetch_class(&self, class_code: &str) -> anyhow::Result<ClassSnapshot> {
        let assignments = fetch_assignments(&self.pool, class_code).await?;
        let students = fetch_students(&self.pool, class_code).await?;
        let entries = fetch_grades(&self.pool, class_code).await?;
        tracing::debug!(
            class = class_code,
            assignments = assignments.len(),
            students = students.len(),
            entries = entries.len(),
            "fetched class snapshot"
        );

        Ok(ClassSnapshot {
            class_code: class_code.to_string(),
            assignments,
            students,
            entries,
        })
    }
}

pub async fn fetch_assignments(pool: &PgPool, class_code: &str) -> anyhow::Result<Vec<Assignment>> {
    let rows = sqlx::query(
        "SELECT id, title, category, total_points, weight \
         FROM gradebook.assignments \
         WHERE class_code = $1 \
         ORDER BY title",
    )
    .bind(class_code)
    .fetch_all(pool)
    .await
    .context("failed to load assignments")?;

    Ok(rows
        .into_iter()
        .map(|row| Assignment {
            id: row.get("id"),
            title: row.get("title"),
            category: row.get("category"),
            total_points: row.get("total_points"),
            weight: row.get("weight"),
        })
        .collect())
}

pub async fn fetch_students(pool: &PgPool, class_code: &str) -> anyhow::Result<Vec<Student>> {
    let rows = sqlx::query(
        "SELECT st.id, st.full_name, st.email \
         FROM gradebook.enrollments en \
         JOIN gradebook.students st ON st.id = en.student_id \
         WHERE en.class_code = $1 \
         ORDER BY st.full_name",
    )
    .bind(class_code)
    .fetch_all(pool)
    .await
    .context("failed to load students")?;

    Ok(rows
        .into_iter()
        .map(|row| Student {
            id: row.get("id"),
            name: row.get("full_name"),
            email: row.get("email"),
        })
        .collect())
}

pub async fn fetch_grades(pool: &PgPool, class_code: &str) -> anyhow::Result<Vec<GradeEntry>> {
    let rows = sqlx::query(
        "SELECT ge.student_id, ge.assignment_id, ge.earned_points, ge.recorded_at \
         FROM gradebook.grade_entries ge \
         JOIN gradebook.assignments a ON a.id = ge.assignment_id \
         WHERE a.class_code = $1",
    )
    .bind(class_code)
    .fetch_all(pool)
    .await
    .context("failed to load grade entries")?;

    Ok(rows
        .into_iter()
        .map(|row| GradeEntry {
            student_id: row.get("student_id"),
            assignment_id: row.get("assignment_id"),
            earned_points: row.get("earned_points"),
            recorded_at: row.get("recorded_at"),
        })
        .collect())
}

async fn upsert_student(conn: &mut PgConnection, name: &str, email: &str) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO gradebook.students (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .fetch_one(&mut *conn)
    .await?
    .get("id");
    Ok(id)
}

async fn enroll(conn: &mut PgConnection, class_code: &str, student_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO gradebook.enrollments (class_code, student_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(class_code)
    .bind(student_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_assignment(
    conn: &mut PgConnection,
    class_code: &str,
    title: &str,
    category: &str,
    total_points: f64,
    weight: f64,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO gradebook.assignments (id, class_code, title, category, total_points, weight)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (class_code, title) DO UPDATE
        SET category = EXCLUDED.category,
            total_points = EXCLUDED.total_points,
            weight = EXCLUDED.weight
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(class_code)
    .bind(title)
    .bind(category)
    .bind(total_points)
    .bind(weight)
    .fetch_one(&mut *conn)
    .await?
    .get("id");
    Ok(id)
}

/// Records a score. A later score for the same student and assignment
/// replaces the earlier one.
async fn record_grade(
    conn: &mut PgConnection,
    student_id: Uuid,
    assignment_id: Uuid,
    earned_points: f64,
    recorded_at: NaiveDate,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO gradebook.grade_entries
        (id, student_id, assignment_id, earned_points, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_id, assignment_id) DO UPDATE
        SET earned_points = EXCLUDED.earned_points,
            recorded_at = EXCLUDED.recorded_at
        WHERE gradebook.grade_entries.recorded_at <= EXCLUDED.recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(assignment_id)
    .bind(earned_points)
    .bind(recorded_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn store_row(conn: &mut PgConnection, validated: &ValidatedRow) -> anyhow::Result<bool> {
    let row = &validated.row;
    let student_id = upsert_student(conn, &row.student_name, &row.student_email).await?;
    enroll(conn, &row.class_code, student_id).await?;
    let assignment_id = upsert_assignment(
        conn,
        &row.class_code,
        &row.assignment_title,
        &row.category,
        row.total_points,
        validated.weight,
    )
    .await?;
    record_grade(conn, student_id, assignment_id, row.earned_points, row.recorded_at).await
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let class_code = "BIO-101";
    let students = vec![
        ("Avery Lee", "avery.lee@groupscholar.com"),
        ("Jules Moreno", "jules.moreno@groupscholar.com"),
        ("Kiara Patel", "kiara.patel@groupscholar.com"),
    ];
    let assignments = vec![
        ("Cell Structure Quiz", "quiz", 50.0, 20.0),
        ("Lab Report 1", "project", 40.0, 20.0),
        ("Midterm Exam", "exam", 100.0, 60.0),
    ];
    let grades = vec![
        ("avery.lee@groupscholar.com", "Cell Structure Quiz", 45.0, (2026, 2, 2)),
        ("avery.lee@groupscholar.com", "Midterm Exam", 70.0, (2026, 2, 20)),
        ("jules.moreno@groupscholar.com", "Cell Structure Quiz", 38.0, (2026, 2, 2)),
        ("jules.moreno@groupscholar.com", "Lab Report 1", 36.0, (2026, 2, 9)),
        ("jules.moreno@groupscholar.com", "Midterm Exam", 88.0, (2026, 2, 20)),
        ("kiara.patel@groupscholar.com", "Lab Report 1", 22.0, (2026, 2, 9)),
    ];

    let mut tx = pool.begin().await?;
    let mut student_ids = std::collections::HashMap::new();
    for (name, email) in students {
        let id = upsert_student(&mut tx, name, email).await?;
        enroll(&mut tx, class_code, id).await?;
        student_ids.insert(email, id);
    }

    let mut assignment_ids = std::collections::HashMap::new();
    for (title, category, total_points, weight) in assignments {
        let id = upsert_assignment(&mut tx, class_code, title, category, total_points, weight).await?;
        assignment_ids.insert(title, id);
    }

    for (email, title, earned, (year, month, day)) in grades {
        let student_id = *student_ids.get(email).context("seed student missing")?;
        let assignment_id = *assignment_ids.get(title).context("seed assignment missing")?;
        let recorded_at = NaiveDate::from_ymd_opt(year, month, day).context("invalid date")?;
        record_grade(&mut tx, student_id, assignment_id, earned, recorded_at).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Writes validated rows in one transaction: either every row is stored or,
/// on a database error, none are.
pub async fn store_rows(pool: &PgPool, rows: &[ValidatedRow]) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await.context("failed to start import transaction")?;
    let mut stored = 0usize;
    for validated in rows {
        if store_row(&mut tx, validated)
            .await
            .with_context(|| format!("failed to store {}", validated.row.assignment_title))?
        {
            stored += 1;
        }
    }
    tx.commit().await.context("failed to commit import")?;
    Ok(stored)
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub stored: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Validates every CSV row before anything is written; rejected rows are
/// reported back and never stored.
pub async fn import_csv(
    pool: &PgPool,
    csv_path: &Path,
    config: &GradebookConfig,
) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let batch = ingest::read_rows(file, config);

    let summary = ImportSummary {
        stored: store_rows(pool, &batch.accepted).await?,
        rejected: batch.rejected,
    };

    tracing::info!(
        path = %csv_path.display(),
        stored = summary.stored,
        rejected = summary.rejected.len(),
        "imported gradebook csv"
    );
    Ok(summary)
}
