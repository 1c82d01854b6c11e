use std::collections::HashMap;

use crate::grading::GRADE_POINTS;
use crate::models::{
    AggregatedResult, CategoryCount, Course, DashboardStats, Grade, LetterCount, MajorCount, Student,
};

/// Bucket for letters outside the grade table.
pub const OTHER_LETTER: &str = "other";

pub fn dashboard_stats(
    students: &[Student],
    courses: &[Course],
    grades: &[Grade],
    results: &[AggregatedResult],
) -> DashboardStats {
    DashboardStats {
        total_students: students.len(),
        total_courses: courses.len(),
        total_grades: grades.len(),
        mean_gpa: mean_gpa(results),
        letter_distribution: letter_distribution(grades),
        major_distribution: major_distribution(students),
        category_distribution: category_distribution(results),
    }
}

pub fn mean_gpa(results: &[AggregatedResult]) -> f64 {
    if results.is_empty() {
        0.0
    } else {
        results.iter().map(|result| result.gpa).sum::<f64>() / results.len() as f64
    }
}

/// Every table letter in table order, then `other` if any grade used an
/// unknown letter.
pub fn letter_distribution(grades: &[Grade]) -> Vec<LetterCount> {
    let mut counts: Vec<LetterCount> = GRADE_POINTS
        .iter()
        .map(|(letter, _)| LetterCount {
            letter: (*letter).to_string(),
            count: 0,
        })
        .collect();
    let mut other = 0usize;

    for grade in grades {
        match counts.iter_mut().find(|entry| entry.letter == grade.letter) {
            Some(entry) => entry.count += 1,
            None => other += 1,
        }
    }

    if other > 0 {
        counts.push(LetterCount {
            letter: OTHER_LETTER.to_string(),
            count: other,
        });
    }
    counts
}

pub fn major_distribution(students: &[Student]) -> Vec<MajorCount> {
    let mut map: HashMap<&str, usize> = HashMap::new();
    for student in students {
        *map.entry(student.major.as_str()).or_insert(0) += 1;
    }

    let mut majors: Vec<MajorCount> = map
        .into_iter()
        .map(|(major, count)| MajorCount {
            major: major.to_string(),
            count,
        })
        .collect();
    majors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.major.cmp(&b.major)));
    majors
}

pub fn category_distribution(results: &[AggregatedResult]) -> Vec<CategoryCount> {
    crate::models::Category::DESCENDING
        .iter()
        .map(|category| CategoryCount {
            category: *category,
            count: results.iter().filter(|r| r.category == *category).count(),
        })
        .collect()
}
