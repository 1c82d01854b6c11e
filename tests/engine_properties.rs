use academic_records::aggregate::aggregate;
use academic_records::grading::{classify, grade_point, GRADE_POINTS};
use academic_records::models::{Category, Course, Grade, Student, Term};
use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

fn student(n: u128) -> Student {
    Student {
        id: Uuid::from_u128(n + 1),
        code: format!("2024{n:03}"),
        name: format!("Student {n}"),
        email: format!("student{n}@email.com"),
        major: "Teknik Informatika".to_string(),
        cohort_year: 2024,
        created_at: Utc.with_ymd_and_hms(2024, 8, 15, 0, 0, 0).unwrap(),
    }
}

fn course(n: u128, credit_hours: i32) -> Course {
    Course {
        id: Uuid::from_u128(1_000 + n),
        code: format!("IF{n:03}"),
        name: format!("Course {n}"),
        credit_hours,
        term_order: 1,
        instructor: "Dr. Fajar Nugroho".to_string(),
    }
}

fn grade(n: u128, student_id: Uuid, course_id: Uuid, score: f64, letter: &str) -> Grade {
    Grade {
        id: Uuid::from_u128(10_000 + n),
        student_id,
        course_id,
        score,
        letter: letter.to_string(),
        term: Term::Even,
        academic_year: "2024/2025".to_string(),
    }
}

#[test]
fn two_equal_weight_courses_average_to_excellent() {
    let x = student(0);
    let courses = vec![course(1, 3), course(2, 3)];
    let grades = vec![
        grade(1, x.id, courses[0].id, 90.0, "A"),
        grade(2, x.id, courses[1].id, 80.0, "B+"),
    ];

    let results = aggregate(&[x], &courses, &grades);
    assert_relative_eq!(results[0].gpa, 3.65, epsilon = 1e-12);
    assert_eq!(results[0].total_credits, 6);
    assert_eq!(results[0].category, Category::Excellent);
}

#[test]
fn unresolvable_course_contributes_score_but_no_credits() {
    let y = student(1);
    let known = course(1, 4);
    let grades = vec![
        grade(1, y.id, known.id, 60.0, "C"),
        grade(2, y.id, Uuid::from_u128(99_999), 100.0, "A"),
    ];

    let results = aggregate(&[y], &[known], &grades);
    assert_eq!(results[0].total_credits, 4);
    assert_relative_eq!(results[0].gpa, 2.0, epsilon = 1e-12);
    assert_relative_eq!(results[0].mean_score, 80.0, epsilon = 1e-12);
}

#[test]
fn only_dangling_grades_leave_gpa_at_zero() {
    let y = student(2);
    let grades = vec![grade(1, y.id, Uuid::from_u128(42), 75.0, "A")];

    let results = aggregate(&[y], &[], &grades);
    assert_eq!(results[0].gpa, 0.0);
    assert_eq!(results[0].total_credits, 0);
    assert_relative_eq!(results[0].mean_score, 75.0);
    assert_eq!(results[0].category, Category::Poor);
}

#[test]
fn grades_without_students_produce_nothing() {
    let c = course(1, 3);
    let grades = vec![grade(1, Uuid::from_u128(7), c.id, 88.0, "A")];
    assert!(aggregate(&[], &[c], &grades).is_empty());
}

#[test]
fn classification_boundaries() {
    assert_eq!(classify(3.5), Category::Excellent);
    assert_eq!(classify(3.499999), Category::Good);
    assert_eq!(classify(2.5), Category::Adequate);
    assert_eq!(classify(2.499999), Category::Poor);
}

fn letter() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => proptest::sample::select(GRADE_POINTS.iter().map(|(l, _)| l.to_string()).collect::<Vec<_>>()),
        1 => "[A-Fa-f+\\-]{0,3}",
    ]
}

fn table_letter() -> impl Strategy<Value = String> {
    proptest::sample::select(GRADE_POINTS.iter().map(|(l, _)| l.to_string()).collect::<Vec<_>>())
}

/// (student index, course index, score, letter); indices may point past the
/// generated collections to exercise dangling references.
fn records<L: Strategy<Value = String>>(
    letters: L,
) -> impl Strategy<Value = (usize, Vec<i32>, Vec<(usize, usize, f64, String)>)> {
    (
        0usize..6,
        proptest::collection::vec(1i32..=6, 0..6),
        proptest::collection::vec((0usize..8, 0usize..8, 0.0f64..=100.0, letters), 0..30),
    )
}

fn build(
    student_count: usize,
    credit_hours: &[i32],
    rows: &[(usize, usize, f64, String)],
) -> (Vec<Student>, Vec<Course>, Vec<Grade>) {
    let students: Vec<Student> = (0..student_count as u128).map(student).collect();
    let courses: Vec<Course> = credit_hours
        .iter()
        .enumerate()
        .map(|(i, hours)| course(i as u128, *hours))
        .collect();
    let grades = rows
        .iter()
        .enumerate()
        .map(|(i, (s, c, score, letter))| {
            grade(
                i as u128,
                Uuid::from_u128(*s as u128 + 1),
                Uuid::from_u128(1_000 + *c as u128),
                *score,
                letter,
            )
        })
        .collect();
    (students, courses, grades)
}

proptest! {
    #[test]
    fn grade_points_stay_on_scale(letter in letter()) {
        let points = grade_point(&letter);
        prop_assert!((0.0..=4.0).contains(&points));
        if !GRADE_POINTS.iter().any(|(known, _)| *known == letter) {
            prop_assert_eq!(points, 0.0);
        }
    }

    #[test]
    fn gpa_stays_on_scale((count, hours, rows) in records(table_letter())) {
        let (students, courses, grades) = build(count, &hours, &rows);
        for result in aggregate(&students, &courses, &grades) {
            prop_assert!(result.gpa >= 0.0);
            prop_assert!(result.gpa <= 4.0 + 1e-9);
            prop_assert!(result.total_credits >= 0);
            prop_assert_eq!(result.category, classify(result.gpa));
        }
    }

    #[test]
    fn one_result_per_student_in_input_order((count, hours, rows) in records(letter())) {
        let (students, courses, grades) = build(count, &hours, &rows);
        let results = aggregate(&students, &courses, &grades);
        prop_assert_eq!(results.len(), students.len());
        for (student, result) in students.iter().zip(results.iter()) {
            prop_assert_eq!(student.id, result.student_id);
            if !grades.iter().any(|g| g.student_id == student.id) {
                prop_assert_eq!(result.gpa, 0.0);
                prop_assert_eq!(result.mean_score, 0.0);
                prop_assert_eq!(result.category, Category::Poor);
            }
        }
    }

    #[test]
    fn aggregation_is_idempotent((count, hours, rows) in records(letter())) {
        let (students, courses, grades) = build(count, &hours, &rows);
        let first = aggregate(&students, &courses, &grades);
        let second = aggregate(&students, &courses, &grades);
        prop_assert_eq!(first, second);
    }
}
