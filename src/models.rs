use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub cohort_year: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub credit_hours: i32,
    pub term_order: i32,
    pub instructor: String,
}

/// Semester half a grade was earned in. Deserializes through `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Term {
    #[serde(rename = "Ganjil")]
    Odd,
    #[serde(rename = "Genap")]
    Even,
}

impl Term {
    pub fn label(self) -> &'static str {
        match self {
            Term::Odd => "Ganjil",
            Term::Even => "Genap",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Term {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Ganjil" | "ganjil" | "odd" => Ok(Term::Odd),
            "Genap" | "genap" | "even" => Ok(Term::Even),
            other => anyhow::bail!("unknown term {other:?} (expected Ganjil or Genap)"),
        }
    }
}

impl TryFrom<String> for Term {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub score: f64,
    pub letter: String,
    pub term: Term,
    pub academic_year: String,
}

/// Performance category, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Kurang")]
    Poor,
    #[serde(rename = "Cukup")]
    Adequate,
    #[serde(rename = "Baik")]
    Good,
    #[serde(rename = "Sangat Baik")]
    Excellent,
}

impl Category {
    /// Strongest first, the order dashboards list categories in.
    pub const DESCENDING: [Category; 4] = [
        Category::Excellent,
        Category::Good,
        Category::Adequate,
        Category::Poor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Excellent => "Sangat Baik",
            Category::Good => "Baik",
            Category::Adequate => "Cukup",
            Category::Poor => "Kurang",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub student_id: Uuid,
    pub code: String,
    pub name: String,
    pub major: String,
    pub gpa: f64,
    pub total_credits: i64,
    pub mean_score: f64,
    pub category: Category,
}

/// A grade joined with the names of what it references, as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRow {
    pub grade_id: Uuid,
    pub student_code: String,
    pub student_name: String,
    pub course_code: String,
    pub course_name: String,
    pub score: f64,
    pub letter: String,
    pub term: Term,
    pub academic_year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterCount {
    pub letter: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MajorCount {
    pub major: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_courses: usize,
    pub total_grades: usize,
    pub mean_gpa: f64,
    pub letter_distribution: Vec<LetterCount>,
    pub major_distribution: Vec<MajorCount>,
    pub category_distribution: Vec<CategoryCount>,
}
