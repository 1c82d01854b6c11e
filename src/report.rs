use std::fmt::Write;

use crate::aggregate::{sort_results, SortKey};
use crate::models::{AggregatedResult, Category, DashboardStats};

const TOP_STUDENTS: usize = 10;

pub fn build_report(scope: Option<&str>, results: &[AggregatedResult], stats: &DashboardStats) -> String {
    let mut ranked = results.to_vec();
    sort_results(&mut ranked, SortKey::Gpa);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all students");

    let _ = writeln!(output, "# Academic Performance Report");
    let _ = writeln!(output, "Generated for {}", scope_label);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Students: {}", stats.total_students);
    let _ = writeln!(output, "- Courses: {}", stats.total_courses);
    let _ = writeln!(output, "- Grades recorded: {}", stats.total_grades);
    let _ = writeln!(output, "- Mean GPA: {:.2}", stats.mean_gpa);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");
    for entry in stats.category_distribution.iter() {
        let _ = writeln!(output, "- {}: {} students", entry.category, entry.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Letter Grades");
    let letters: Vec<String> = stats
        .letter_distribution
        .iter()
        .filter(|entry| entry.count > 0)
        .map(|entry| format!("{} x{}", entry.letter, entry.count))
        .collect();
    if letters.is_empty() {
        let _ = writeln!(output, "No grades recorded.");
    } else {
        let _ = writeln!(output, "{}", letters.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Students by GPA");
    if ranked.is_empty() {
        let _ = writeln!(output, "No students recorded.");
    } else {
        for result in ranked.iter().take(TOP_STUDENTS) {
            let _ = writeln!(output, "- {}", describe(result));
        }
    }

    let attention: Vec<&AggregatedResult> = ranked
        .iter()
        .filter(|result| result.category == Category::Poor)
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Needs Attention");
    if attention.is_empty() {
        let _ = writeln!(output, "Every student is at {} or above.", Category::Adequate);
    } else {
        for result in attention {
            let _ = writeln!(output, "- {}", describe(result));
        }
    }

    output
}

fn describe(result: &AggregatedResult) -> String {
    format!(
        "{} ({}, {}) GPA {:.2} over {} credits, mean score {:.2} [{}]",
        result.name,
        result.code,
        result.major,
        result.gpa,
        result.total_credits,
        result.mean_score,
        result.category
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::dashboard_stats;
    use uuid::Uuid;

    fn result(code: &str, name: &str, gpa: f64, category: Category) -> AggregatedResult {
        AggregatedResult {
            student_id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            major: "Sistem Informasi".to_string(),
            gpa,
            total_credits: 6,
            mean_score: 80.0,
            category,
        }
    }

    #[test]
    fn ranks_by_gpa_and_flags_poor_students() {
        let results = vec![
            result("2021003", "Galih Pratama", 2.0, Category::Poor),
            result("2021001", "Ahmad Rizki", 3.65, Category::Excellent),
        ];
        let stats = dashboard_stats(&[], &[], &[], &results);
        let report = build_report(Some("2021"), &results, &stats);

        assert!(report.contains("Generated for 2021"));
        assert!(report.contains("Mean GPA: 2.8"));
        let top = report.find("Ahmad Rizki").unwrap();
        let bottom = report.find("Galih Pratama").unwrap();
        assert!(top < bottom);
        assert!(report.contains("GPA 3.65"));
        assert!(report.contains("## Needs Attention\n- Galih Pratama"));
    }

    #[test]
    fn empty_input_renders_placeholders() {
        let stats = dashboard_stats(&[], &[], &[], &[]);
        let report = build_report(None, &[], &stats);
        assert!(report.contains("Generated for all students"));
        assert!(report.contains("No grades recorded."));
        assert!(report.contains("No students recorded."));
    }
}
