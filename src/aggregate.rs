use std::collections::HashMap;

use clap::ValueEnum;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::grading::{classify, grade_point};
use crate::models::{AggregatedResult, Course, Grade, Student};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    weighted_points: f64,
    total_credits: i64,
    score_sum: f64,
    grade_count: usize,
}

impl Tally {
    fn gpa(&self) -> f64 {
        if self.total_credits > 0 {
            self.weighted_points / self.total_credits as f64
        } else {
            0.0
        }
    }

    fn mean_score(&self) -> f64 {
        if self.grade_count > 0 {
            self.score_sum / self.grade_count as f64
        } else {
            0.0
        }
    }
}

/// Builds one result per student, in the order the students were given.
///
/// A grade whose course cannot be resolved still counts toward the mean
/// score but carries zero credit hours, so it adds nothing to the GPA.
/// Grades for students not in `students` are ignored.
pub fn aggregate(students: &[Student], courses: &[Course], grades: &[Grade]) -> Vec<AggregatedResult> {
    let credits: HashMap<Uuid, i32> = courses
        .iter()
        .map(|course| (course.id, course.credit_hours))
        .collect();
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();

    for grade in grades {
        let credit_hours = match credits.get(&grade.course_id) {
            Some(hours) => i64::from(*hours),
            None => {
                trace!(grade = %grade.id, course = %grade.course_id, "course not found, counting zero credits");
                0
            }
        };

        let entry = tallies.entry(grade.student_id).or_default();
        entry.weighted_points += grade_point(&grade.letter) * credit_hours as f64;
        entry.total_credits += credit_hours;
        entry.score_sum += grade.score;
        entry.grade_count += 1;
    }

    let results: Vec<AggregatedResult> = students
        .iter()
        .map(|student| {
            let tally = tallies.get(&student.id).copied().unwrap_or_default();
            let gpa = tally.gpa();
            AggregatedResult {
                student_id: student.id,
                code: student.code.clone(),
                name: student.name.clone(),
                major: student.major.clone(),
                gpa,
                total_credits: tally.total_credits,
                mean_score: tally.mean_score(),
                category: classify(gpa),
            }
        })
        .collect();

    debug!(
        students = students.len(),
        courses = courses.len(),
        grades = grades.len(),
        "aggregated student results"
    );
    results
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Keep the order records were loaded in
    #[default]
    Input,
    /// Highest GPA first
    Gpa,
    /// Highest mean score first
    MeanScore,
    Code,
    Name,
}

/// Stable sort, so ties keep their relative input order.
pub fn sort_results(results: &mut [AggregatedResult], key: SortKey) {
    match key {
        SortKey::Input => {}
        SortKey::Gpa => results.sort_by(|a, b| b.gpa.total_cmp(&a.gpa)),
        SortKey::MeanScore => results.sort_by(|a, b| b.mean_score.total_cmp(&a.mean_score)),
        SortKey::Code => results.sort_by(|a, b| a.code.cmp(&b.code)),
        SortKey::Name => results.sort_by_cached_key(|result| result.name.to_lowercase()),
    }
}

/// Matches the name case-insensitively or the student code exactly as typed.
pub fn filter_results(results: &[AggregatedResult], query: &str) -> Vec<AggregatedResult> {
    let needle = query.to_lowercase();
    results
        .iter()
        .filter(|result| result.name.to_lowercase().contains(&needle) || result.code.contains(query))
        .cloned()
        .collect()
}
