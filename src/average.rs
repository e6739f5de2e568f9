use uuid::Uuid;

use crate::models::{Assignment, GradeEntry, StudentAverage};
use crate::scale::GradeScale;
use crate::weighting;

/// Folds a student's graded assignments into one weighted percentage.
#[derive(Debug, Clone, Copy)]
pub struct StudentAverageCalculator<'a> {
    scale: &'a GradeScale,
}

impl<'a> StudentAverageCalculator<'a> {
    pub fn new(scale: &'a GradeScale) -> Self {
        Self { scale }
    }

    /// Weighted average over `pairs` only. Weights are relative to the graded
    /// subset, so a student with one 90% quiz averages 90 no matter how much
    /// ungraded work the course still has. No pairs yields a 0 average.
    pub fn calculate(
        &self,
        student_id: Uuid,
        pairs: &[(&Assignment, &GradeEntry)],
    ) -> StudentAverage {
        let mut weighted_score = 0.0;
        let mut total_weight = 0.0;
        let mut earned_points = 0.0;
        let mut total_points = 0.0;
        let mut graded_count = 0usize;

        for (assignment, entry) in pairs {
            if assignment.total_points <= 0.0 {
                tracing::warn!(assignment = %assignment.id, "ignoring assignment with no points available");
                continue;
            }

            let percentage = entry.percentage(assignment);
            weighted_score += percentage * assignment.weight;
            total_weight += assignment.weight;
            earned_points += entry.earned_points;
            total_points += assignment.total_points;
            graded_count += 1;
        }

        let percentage = if total_weight > 0.0 {
            weighted_score / total_weight
        } else {
            0.0
        };
        let band = self.scale.lookup(percentage);

        StudentAverage {
            student_id,
            percentage,
            letter_grade: band.letter.clone(),
            gpa: band.gpa,
            earned_points,
            total_points,
            graded_weight: total_weight / 100.0,
            graded_count,
        }
    }

    /// Selects the graded assignments for `entries` and averages them.
    /// Assignments with unusable weights are logged and skipped.
    pub fn calculate_for(
        &self,
        student_id: Uuid,
        assignments: &[Assignment],
        entries: &[GradeEntry],
    ) -> StudentAverage {
        let selection = weighting::select_graded(assignments, entries);
        self.calculate(student_id, &selection.pairs)
    }
}
