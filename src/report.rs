use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{ClassGradebook, StudentResult};
use crate::scale::GradeScale;

/// Students ordered by weighted percentage, highest first, ties by name.
pub fn ranked(results: &[StudentResult]) -> Vec<&StudentResult> {
    let mut ranked: Vec<&StudentResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.average
            .percentage
            .total_cmp(&a.average.percentage)
            .then_with(|| a.student.name.cmp(&b.student.name))
    });
    ranked
}

pub fn build_report(gradebook: &ClassGradebook, scale: &GradeScale, generated_on: NaiveDate) -> String {
    let stats = &gradebook.statistics;
    let mut output = String::new();

    let _ = writeln!(output, "# Gradebook Report: {}", gradebook.class_code);
    let _ = writeln!(output, "Generated on {}", generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Class Summary");

    if stats.total_students == 0 {
        let _ = writeln!(output, "No students enrolled in this class.");
    } else {
        let _ = writeln!(output, "- Students: {}", stats.total_students);
        let _ = writeln!(output, "- Class average: {:.2}%", stats.class_average);
        let _ = writeln!(output, "- Highest: {:.2}%", stats.highest);
        let _ = writeln!(output, "- Lowest: {:.2}%", stats.lowest);
        let _ = writeln!(output, "- Average GPA: {:.2}", stats.average_gpa);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");
    for bucket in &stats.distribution {
        let range = scale
            .bands()
            .iter()
            .find(|band| band.letter == bucket.letter)
            .map(|band| format!("{:.0}-{:.0}", band.min, band.max))
            .unwrap_or_default();
        let _ = writeln!(output, "- {} ({}): {}", bucket.letter, range, bucket.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    if gradebook.results.is_empty() {
        let _ = writeln!(output, "No students enrolled in this class.");
    } else {
        for result in ranked(&gradebook.results) {
            let average = &result.average;
            if average.graded_count == 0 {
                let _ = writeln!(output, "- {} ({}): no graded work yet", result.student.name, result.student.email);
                continue;
            }
            let _ = writeln!(
                output,
                "- {} ({}): {:.2}% {} (GPA {:.1}), {} / {} points across {} assignments",
                result.student.name,
                result.student.email,
                average.percentage,
                average.letter_grade,
                average.gpa,
                average.earned_points,
                average.total_points,
                average.graded_count
            );
        }
    }

    output
}
