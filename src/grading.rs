use crate::models::Category;

/// Grade points per letter grade. Letters are matched exactly, uppercase.
pub const GRADE_POINTS: [(&str, f64); 11] = [
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("E", 0.0),
];

/// Inclusive lower GPA bounds, checked top-down. Anything below the last
/// bound is `Category::Poor`.
pub const CATEGORY_THRESHOLDS: [(f64, Category); 3] = [
    (3.5, Category::Excellent),
    (3.0, Category::Good),
    (2.5, Category::Adequate),
];

/// Unknown letters are worth zero points rather than an error.
pub fn grade_point(letter: &str) -> f64 {
    GRADE_POINTS
        .iter()
        .find(|(known, _)| *known == letter)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

pub fn is_known_letter(letter: &str) -> bool {
    GRADE_POINTS.iter().any(|(known, _)| *known == letter)
}

pub fn classify(gpa: f64) -> Category {
    CATEGORY_THRESHOLDS
        .iter()
        .find(|(lower, _)| gpa >= *lower)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Poor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_values_match_scale() {
        assert_eq!(grade_point("A"), 4.0);
        assert_eq!(grade_point("A-"), 3.7);
        assert_eq!(grade_point("B+"), 3.3);
        assert_eq!(grade_point("B"), 3.0);
        assert_eq!(grade_point("B-"), 2.7);
        assert_eq!(grade_point("C+"), 2.3);
        assert_eq!(grade_point("C"), 2.0);
        assert_eq!(grade_point("C-"), 1.7);
        assert_eq!(grade_point("D+"), 1.3);
        assert_eq!(grade_point("D"), 1.0);
        assert_eq!(grade_point("E"), 0.0);
    }

    #[test]
    fn unknown_letters_are_worth_nothing() {
        assert_eq!(grade_point("F"), 0.0);
        assert_eq!(grade_point("a"), 0.0);
        assert_eq!(grade_point(""), 0.0);
        assert_eq!(grade_point("A+"), 0.0);
        assert!(!is_known_letter("a"));
        assert!(is_known_letter("D+"));
    }

    #[test]
    fn every_table_value_is_on_the_four_point_scale() {
        for (_, points) in GRADE_POINTS {
            assert!((0.0..=4.0).contains(&points));
        }
    }

    #[test]
    fn thresholds_are_closed_at_the_lower_end() {
        assert_eq!(classify(4.0), Category::Excellent);
        assert_eq!(classify(3.5), Category::Excellent);
        assert_eq!(classify(3.499999), Category::Good);
        assert_eq!(classify(3.0), Category::Good);
        assert_eq!(classify(2.999999), Category::Adequate);
        assert_eq!(classify(2.5), Category::Adequate);
        assert_eq!(classify(2.499999), Category::Poor);
        assert_eq!(classify(0.0), Category::Poor);
    }

    #[test]
    fn out_of_range_input_falls_through() {
        assert_eq!(classify(-1.0), Category::Poor);
        assert_eq!(classify(f64::NAN), Category::Poor);
        assert_eq!(classify(f64::NEG_INFINITY), Category::Poor);
        assert_eq!(classify(7.5), Category::Excellent);
    }
}
