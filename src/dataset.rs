use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::models::{AggregatedResult, Course, Grade, Student, Term};

pub const STUDENTS_FILE: &str = "students.csv";
pub const COURSES_FILE: &str = "courses.csv";
pub const GRADES_FILE: &str = "grades.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct StudentCsv {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub major: String,
    pub cohort_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseCsv {
    pub code: String,
    pub name: String,
    pub credit_hours: i32,
    pub term_order: i32,
    #[serde(default)]
    pub instructor: String,
}

/// Grades reference students and courses by their human-assigned codes.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeCsv {
    pub student_code: String,
    pub course_code: String,
    pub score: f64,
    pub letter: String,
    pub term: Term,
    pub academic_year: String,
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.with_context(|| format!("malformed row in {}", path.display()))?);
    }
    Ok(rows)
}

/// Codes are human-assigned and must be unique within a file.
pub fn ensure_unique_codes<'a>(
    path: &Path,
    codes: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for code in codes {
        if !seen.insert(code) {
            anyhow::bail!("duplicate code {code:?} in {}", path.display());
        }
    }
    Ok(())
}

/// Fully materialized record sets, ready for aggregation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub grades: Vec<Grade>,
}

impl Dataset {
    pub fn aggregate(&self) -> Vec<AggregatedResult> {
        aggregate(&self.students, &self.courses, &self.grades)
    }

    /// Loads `students.csv`, `courses.csv` and `grades.csv` from `dir`.
    ///
    /// A grade whose student or course code is unknown keeps a dangling
    /// reference so aggregation treats it the same way as a store would.
    pub fn from_csv_dir(dir: &Path) -> anyhow::Result<Self> {
        let students_path = dir.join(STUDENTS_FILE);
        let courses_path = dir.join(COURSES_FILE);
        let student_rows: Vec<StudentCsv> = read_rows(&students_path)?;
        let course_rows: Vec<CourseCsv> = read_rows(&courses_path)?;
        ensure_unique_codes(&students_path, student_rows.iter().map(|row| row.code.as_str()))?;
        ensure_unique_codes(&courses_path, course_rows.iter().map(|row| row.code.as_str()))?;
        let grade_rows: Vec<GradeCsv> = read_rows(&dir.join(GRADES_FILE))?;

        let students: Vec<Student> = student_rows
            .into_iter()
            .map(|row| Student {
                id: Uuid::new_v4(),
                code: row.code,
                name: row.name,
                email: row.email,
                major: row.major,
                cohort_year: row.cohort_year,
                created_at: Utc::now(),
            })
            .collect();
        let courses: Vec<Course> = course_rows
            .into_iter()
            .map(|row| Course {
                id: Uuid::new_v4(),
                code: row.code,
                name: row.name,
                credit_hours: row.credit_hours,
                term_order: row.term_order,
                instructor: row.instructor,
            })
            .collect();

        let student_ids: HashMap<&str, Uuid> =
            students.iter().map(|s| (s.code.as_str(), s.id)).collect();
        let course_ids: HashMap<&str, Uuid> =
            courses.iter().map(|c| (c.code.as_str(), c.id)).collect();

        let mut grades = Vec::with_capacity(grade_rows.len());
        for row in grade_rows {
            let student_id = match student_ids.get(row.student_code.as_str()) {
                Some(id) => *id,
                None => {
                    warn!(student_code = %row.student_code, "grade references unknown student");
                    Uuid::new_v4()
                }
            };
            let course_id = match course_ids.get(row.course_code.as_str()) {
                Some(id) => *id,
                None => {
                    warn!(course_code = %row.course_code, "grade references unknown course");
                    Uuid::new_v4()
                }
            };
            grades.push(Grade {
                id: Uuid::new_v4(),
                student_id,
                course_id,
                score: row.score,
                letter: row.letter,
                term: row.term,
                academic_year: row.academic_year,
            });
        }

        info!(
            dir = %dir.display(),
            students = students.len(),
            courses = courses.len(),
            grades = grades.len(),
            "loaded records from csv"
        );

        Ok(Self {
            students,
            courses,
            grades,
        })
    }
}
