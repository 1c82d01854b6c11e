//! Checks applied before records are written to the store. Aggregation never
//! calls these; it tolerates whatever the store hands back.

use thiserror::Error;

use crate::grading::is_known_letter;
use crate::models::{Course, Grade, Student};

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("credit hours must be positive, got {0}")]
    CreditHours(i32),

    #[error("score must be between 0 and 100, got {0}")]
    Score(f64),

    #[error("unknown letter grade {0:?}")]
    Letter(String),

    #[error("email {0:?} is not an address")]
    Email(String),

    #[error("cohort year {0} is out of range")]
    CohortYear(i32),
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub fn validate_student(student: &Student) -> Result<(), ValidationError> {
    require("student code", &student.code)?;
    require("student name", &student.name)?;
    require("email", &student.email)?;
    if !student.email.contains('@') {
        return Err(ValidationError::Email(student.email.clone()));
    }
    require("major", &student.major)?;
    if !(1900..=9999).contains(&student.cohort_year) {
        return Err(ValidationError::CohortYear(student.cohort_year));
    }
    Ok(())
}

pub fn validate_course(course: &Course) -> Result<(), ValidationError> {
    require("course code", &course.code)?;
    require("course name", &course.name)?;
    if course.credit_hours <= 0 {
        return Err(ValidationError::CreditHours(course.credit_hours));
    }
    Ok(())
}

pub fn validate_grade(grade: &Grade) -> Result<(), ValidationError> {
    if !grade.score.is_finite() || !(0.0..=100.0).contains(&grade.score) {
        return Err(ValidationError::Score(grade.score));
    }
    if !is_known_letter(&grade.letter) {
        return Err(ValidationError::Letter(grade.letter.clone()));
    }
    require("academic year", &grade.academic_year)?;
    Ok(())
}
