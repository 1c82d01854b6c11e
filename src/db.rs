use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dataset::{self, CourseCsv, Dataset, GradeCsv, StudentCsv};
use crate::models::{Course, Grade, Student, Term};
use crate::validate::{validate_course, validate_grade, validate_student};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = [
        ("2021001", "Ahmad Rizki", "ahmad@email.com", "Teknik Informatika", 2021),
        ("2021002", "Siti Nurhaliza", "siti@email.com", "Sistem Informasi", 2021),
        ("2022001", "Budi Santoso", "budi@email.com", "Teknik Informatika", 2022),
        ("2022002", "Dewi Lestari", "dewi@email.com", "Manajemen Informatika", 2022),
        ("2023001", "Eko Prasetyo", "eko@email.com", "Teknik Informatika", 2023),
        ("2023002", "Fitri Handayani", "fitri@email.com", "Sistem Informasi", 2023),
        ("2021003", "Galih Pratama", "galih@email.com", "Manajemen Informatika", 2021),
        ("2022003", "Hana Safitri", "hana@email.com", "Teknik Informatika", 2022),
    ];
    for (code, name, email, major, cohort_year) in students {
        upsert_student(
            pool,
            &StudentCsv {
                code: code.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                major: major.to_string(),
                cohort_year,
            },
        )
        .await?;
    }

    let courses = [
        ("IF101", "Algoritma dan Pemrograman", 3, 1, "Dr. Ir. Sutrisno"),
        ("IF102", "Struktur Data", 3, 2, "Prof. Agus Wijaya"),
        ("IF201", "Basis Data", 4, 3, "Dr. Maya Sari"),
        ("IF202", "Pemrograman Web", 3, 4, "Ir. Bambang Suryanto"),
        ("IF301", "Machine Learning", 3, 5, "Prof. Dr. Rina Dewi"),
        ("IF302", "Data Mining", 3, 6, "Dr. Fajar Nugroho"),
        ("SI101", "Sistem Informasi Manajemen", 3, 3, "Dr. Linda Kartika"),
        ("MI101", "Jaringan Komputer", 3, 4, "Ir. Dedi Kurniawan"),
    ];
    for (code, name, credit_hours, term_order, instructor) in courses {
        upsert_course(
            pool,
            &CourseCsv {
                code: code.to_string(),
                name: name.to_string(),
                credit_hours,
                term_order,
                instructor: instructor.to_string(),
            },
        )
        .await?;
    }

    let grades = [
        ("2021001", "IF101", 85.0, "A", Term::Odd, "2021/2022"),
        ("2021001", "IF102", 78.0, "B+", Term::Even, "2021/2022"),
        ("2021001", "IF201", 90.0, "A", Term::Odd, "2022/2023"),
        ("2021002", "IF101", 72.0, "B", Term::Odd, "2021/2022"),
        ("2021002", "SI101", 88.0, "A", Term::Odd, "2022/2023"),
        ("2022001", "IF101", 95.0, "A", Term::Odd, "2022/2023"),
        ("2022001", "IF102", 82.0, "A-", Term::Even, "2022/2023"),
        ("2022002", "MI101", 68.0, "B-", Term::Even, "2022/2023"),
        ("2023001", "IF101", 75.0, "B+", Term::Odd, "2023/2024"),
        ("2023002", "SI101", 92.0, "A", Term::Odd, "2023/2024"),
        ("2021003", "IF101", 60.0, "C", Term::Odd, "2021/2022"),
        ("2022003", "IF301", 87.0, "A", Term::Odd, "2023/2024"),
    ];
    for (student_code, course_code, score, letter, term, academic_year) in grades {
        let row = GradeCsv {
            student_code: student_code.to_string(),
            course_code: course_code.to_string(),
            score,
            letter: letter.to_string(),
            term,
            academic_year: academic_year.to_string(),
        };
        if upsert_grade(pool, &row).await?.is_none() {
            anyhow::bail!("seed grade {student_code}/{course_code} did not resolve");
        }
    }

    info!(
        students = students.len(),
        courses = courses.len(),
        grades = grades.len(),
        "seed data upserted"
    );
    Ok(())
}

pub async fn fetch_students(pool: &PgPool) -> anyhow::Result<Vec<Student>> {
    let records = sqlx::query(
        "SELECT id, code, full_name, email, major, cohort_year, created_at \
         FROM academic_records.students \
         ORDER BY created_at DESC, code",
    )
    .fetch_all(pool)
    .await?;

    let mut students = Vec::with_capacity(records.len());
    for row in records {
        students.push(Student {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("full_name"),
            email: row.get("email"),
            major: row.get("major"),
            cohort_year: row.get("cohort_year"),
            created_at: row.get("created_at"),
        });
    }
    Ok(students)
}

pub async fn fetch_courses(pool: &PgPool) -> anyhow::Result<Vec<Course>> {
    let records = sqlx::query(
        "SELECT id, code, name, credit_hours, term_order, instructor \
         FROM academic_records.courses \
         ORDER BY term_order, code",
    )
    .fetch_all(pool)
    .await?;

    let mut courses = Vec::with_capacity(records.len());
    for row in records {
        courses.push(Course {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
            credit_hours: row.get("credit_hours"),
            term_order: row.get("term_order"),
            instructor: row.get("instructor"),
        });
    }
    Ok(courses)
}

pub async fn fetch_grades(pool: &PgPool) -> anyhow::Result<Vec<Grade>> {
    let records = sqlx::query(
        "SELECT id, student_id, course_id, score, letter, term, academic_year \
         FROM academic_records.grades \
         ORDER BY academic_year, term, id",
    )
    .fetch_all(pool)
    .await?;

    let mut grades = Vec::with_capacity(records.len());
    for row in records {
        let term: String = row.get("term");
        grades.push(Grade {
            id: row.get("id"),
            student_id: row.get("student_id"),
            course_id: row.get("course_id"),
            score: row.get("score"),
            letter: row.get("letter"),
            term: term.parse()?,
            academic_year: row.get("academic_year"),
        });
    }
    Ok(grades)
}

pub async fn fetch_dataset(pool: &PgPool) -> anyhow::Result<Dataset> {
    let students = fetch_students(pool).await.context("failed to fetch students")?;
    let courses = fetch_courses(pool).await.context("failed to fetch courses")?;
    let grades = fetch_grades(pool).await.context("failed to fetch grades")?;
    info!(
        students = students.len(),
        courses = courses.len(),
        grades = grades.len(),
        "fetched records"
    );
    Ok(Dataset {
        students,
        courses,
        grades,
    })
}

/// Inserts a student, or updates the existing one with the same code.
pub async fn upsert_student(pool: &PgPool, row: &StudentCsv) -> anyhow::Result<Uuid> {
    validate_student(&Student {
        id: Uuid::nil(),
        code: row.code.clone(),
        name: row.name.clone(),
        email: row.email.clone(),
        major: row.major.clone(),
        cohort_year: row.cohort_year,
        created_at: Utc::now(),
    })?;

    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO academic_records.students (id, code, full_name, email, major, cohort_year)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (code) DO UPDATE
        SET full_name = EXCLUDED.full_name, email = EXCLUDED.email,
            major = EXCLUDED.major, cohort_year = EXCLUDED.cohort_year
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.code)
    .bind(&row.name)
    .bind(&row.email)
    .bind(&row.major)
    .bind(row.cohort_year)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

pub async fn upsert_course(pool: &PgPool, row: &CourseCsv) -> anyhow::Result<Uuid> {
    validate_course(&Course {
        id: Uuid::nil(),
        code: row.code.clone(),
        name: row.name.clone(),
        credit_hours: row.credit_hours,
        term_order: row.term_order,
        instructor: row.instructor.clone(),
    })?;

    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO academic_records.courses (id, code, name, credit_hours, term_order, instructor)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (code) DO UPDATE
        SET name = EXCLUDED.name, credit_hours = EXCLUDED.credit_hours,
            term_order = EXCLUDED.term_order, instructor = EXCLUDED.instructor
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.code)
    .bind(&row.name)
    .bind(row.credit_hours)
    .bind(row.term_order)
    .bind(&row.instructor)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

async fn find_id(pool: &PgPool, table: &str, code: &str) -> anyhow::Result<Option<Uuid>> {
    let query = format!("SELECT id FROM academic_records.{table} WHERE code = $1");
    let row = sqlx::query(&query).bind(code).fetch_optional(pool).await?;
    Ok(row.map(|row| row.get("id")))
}

/// Records a grade by student and course code. Returns `None` when either
/// code is unknown; a grade cannot exist without both.
pub async fn upsert_grade(pool: &PgPool, row: &GradeCsv) -> anyhow::Result<Option<Uuid>> {
    let Some(student_id) = find_id(pool, "students", &row.student_code).await? else {
        return Ok(None);
    };
    let Some(course_id) = find_id(pool, "courses", &row.course_code).await? else {
        return Ok(None);
    };

    validate_grade(&Grade {
        id: Uuid::nil(),
        student_id,
        course_id,
        score: row.score,
        letter: row.letter.clone(),
        term: row.term,
        academic_year: row.academic_year.clone(),
    })?;

    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO academic_records.grades
        (id, student_id, course_id, score, letter, term, academic_year)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (student_id, course_id, term, academic_year) DO UPDATE
        SET score = EXCLUDED.score, letter = EXCLUDED.letter
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(course_id)
    .bind(row.score)
    .bind(&row.letter)
    .bind(row.term.label())
    .bind(&row.academic_year)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(Some(id))
}

/// Removes a student and, through the foreign key, every grade they hold.
pub async fn delete_student(pool: &PgPool, code: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM academic_records.students WHERE code = $1")
        .bind(code)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: usize,
    pub courses: usize,
    pub grades: usize,
    pub skipped_grades: usize,
}

pub async fn import_dir(pool: &PgPool, dir: &Path) -> anyhow::Result<ImportSummary> {
    let students_path = dir.join(dataset::STUDENTS_FILE);
    let courses_path = dir.join(dataset::COURSES_FILE);
    let students: Vec<StudentCsv> = dataset::read_rows(&students_path)?;
    let courses: Vec<CourseCsv> = dataset::read_rows(&courses_path)?;
    dataset::ensure_unique_codes(&students_path, students.iter().map(|row| row.code.as_str()))?;
    dataset::ensure_unique_codes(&courses_path, courses.iter().map(|row| row.code.as_str()))?;
    let grades: Vec<GradeCsv> = dataset::read_rows(&dir.join(dataset::GRADES_FILE))?;
    let mut summary = ImportSummary::default();

    for row in &students {
        upsert_student(pool, row)
            .await
            .with_context(|| format!("failed to import student {}", row.code))?;
        summary.students += 1;
    }
    for row in &courses {
        upsert_course(pool, row)
            .await
            .with_context(|| format!("failed to import course {}", row.code))?;
        summary.courses += 1;
    }
    for row in &grades {
        let imported = upsert_grade(pool, row).await.with_context(|| {
            format!("failed to import grade {}/{}", row.student_code, row.course_code)
        })?;
        match imported {
            Some(_) => summary.grades += 1,
            None => {
                warn!(
                    student_code = %row.student_code,
                    course_code = %row.course_code,
                    "skipping grade with unresolved reference"
                );
                summary.skipped_grades += 1;
            }
        }
    }

    info!(?summary, dir = %dir.display(), "import finished");
    Ok(summary)
}
