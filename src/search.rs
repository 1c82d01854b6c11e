use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Course, Grade, GradeRow, Student};

const MISSING: &str = "-";

pub fn filter_students<'a>(students: &'a [Student], query: &str) -> Vec<&'a Student> {
    let needle = query.to_lowercase();
    students
        .iter()
        .filter(|student| {
            student.name.to_lowercase().contains(&needle)
                || student.code.contains(query)
                || student.major.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn filter_courses<'a>(courses: &'a [Course], query: &str) -> Vec<&'a Course> {
    let needle = query.to_lowercase();
    courses
        .iter()
        .filter(|course| {
            course.name.to_lowercase().contains(&needle)
                || course.code.to_lowercase().contains(&needle)
                || course.instructor.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Joins each grade with its student and course. References that do not
/// resolve are shown as `-`.
pub fn enrich_grades(students: &[Student], courses: &[Course], grades: &[Grade]) -> Vec<GradeRow> {
    let students: HashMap<Uuid, &Student> = students.iter().map(|s| (s.id, s)).collect();
    let courses: HashMap<Uuid, &Course> = courses.iter().map(|c| (c.id, c)).collect();

    grades
        .iter()
        .map(|grade| {
            let student = students.get(&grade.student_id);
            let course = courses.get(&grade.course_id);
            GradeRow {
                grade_id: grade.id,
                student_code: student.map_or(MISSING, |s| s.code.as_str()).to_string(),
                student_name: student.map_or(MISSING, |s| s.name.as_str()).to_string(),
                course_code: course.map_or(MISSING, |c| c.code.as_str()).to_string(),
                course_name: course.map_or(MISSING, |c| c.name.as_str()).to_string(),
                score: grade.score,
                letter: grade.letter.clone(),
                term: grade.term,
                academic_year: grade.academic_year.clone(),
            }
        })
        .collect()
}

pub fn filter_grade_rows<'a>(rows: &'a [GradeRow], query: &str) -> Vec<&'a GradeRow> {
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.student_name.to_lowercase().contains(&needle)
                || row.student_code.contains(query)
                || row.course_name.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;
    use chrono::Utc;

    fn student(code: &str, name: &str, major: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            email: String::new(),
            major: major.to_string(),
            cohort_year: 2021,
            created_at: Utc::now(),
        }
    }

    fn course(code: &str, name: &str, instructor: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            credit_hours: 3,
            term_order: 1,
            instructor: instructor.to_string(),
        }
    }

    #[test]
    fn students_match_name_code_or_major() {
        let students = vec![
            student("2021001", "Ahmad Rizki", "Teknik Informatika"),
            student("2021002", "Siti Nurhaliza", "Sistem Informasi"),
        ];
        assert_eq!(filter_students(&students, "AHMAD").len(), 1);
        assert_eq!(filter_students(&students, "2021002")[0].name, "Siti Nurhaliza");
        assert_eq!(filter_students(&students, "sistem").len(), 1);
        assert_eq!(filter_students(&students, "informa").len(), 2);
    }

    #[test]
    fn courses_match_code_case_insensitively() {
        let courses = vec![
            course("IF101", "Algoritma dan Pemrograman", "Dr. Ir. Sutrisno"),
            course("SI101", "Sistem Informasi Manajemen", "Dr. Linda Kartika"),
        ];
        assert_eq!(filter_courses(&courses, "if1").len(), 1);
        assert_eq!(filter_courses(&courses, "linda")[0].code, "SI101");
        assert_eq!(filter_courses(&courses, "101").len(), 2);
    }

    #[test]
    fn dangling_references_render_as_dash() {
        let s = student("2021001", "Ahmad Rizki", "Teknik Informatika");
        let grades = vec![Grade {
            id: Uuid::new_v4(),
            student_id: s.id,
            course_id: Uuid::new_v4(),
            score: 85.0,
            letter: "A".to_string(),
            term: Term::Odd,
            academic_year: "2021/2022".to_string(),
        }];

        let rows = enrich_grades(&[s], &[], &grades);
        assert_eq!(rows[0].student_name, "Ahmad Rizki");
        assert_eq!(rows[0].course_code, "-");
        assert_eq!(rows[0].course_name, "-");
        assert_eq!(filter_grade_rows(&rows, "ahmad").len(), 1);
        assert!(filter_grade_rows(&rows, "basis").is_empty());
    }
}
