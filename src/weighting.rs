use std::collections::HashMap;

use uuid::Uuid;

use crate::error::ConfigurationError;
use crate::models::{Assignment, GradeEntry};

/// Assignments that count toward one student's average, plus the ones
/// dropped because their weight is unusable.
#[derive(Debug, Clone, Default)]
pub struct GradedSelection<'a> {
    pub pairs: Vec<(&'a Assignment, &'a GradeEntry)>,
    pub rejected: Vec<ConfigurationError>,
}

pub fn validate_weight(assignment: &Assignment) -> Result<(), ConfigurationError> {
    if assignment.weight > 0.0 && assignment.weight.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveWeight {
            assignment_id: assignment.id,
            weight: assignment.weight,
        })
    }
}

/// Pairs each assignment with the student's recorded entry. Assignments
/// without an entry are left out entirely rather than counted as zero.
/// When several entries exist for one assignment the most recently recorded
/// one is used.
pub fn select_graded<'a>(
    assignments: &'a [Assignment],
    entries: &'a [GradeEntry],
) -> GradedSelection<'a> {
    let mut latest: HashMap<Uuid, &GradeEntry> = HashMap::new();
    for entry in entries {
        latest
            .entry(entry.assignment_id)
            .and_modify(|current| {
                if entry.recorded_at >= current.recorded_at {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }

    let mut selection = GradedSelection::default();
    for assignment in assignments {
        if let Err(err) = validate_weight(assignment) {
            tracing::warn!(assignment = %assignment.id, title = %assignment.title, "skipping assignment: {err}");
            selection.rejected.push(err);
            continue;
        }
        if let Some(&entry) = latest.get(&assignment.id) {
            selection.pairs.push((assignment, entry));
        }
    }

    selection
}

/// Each counted assignment's share of the graded weight, summing to 1.
pub fn normalized_weights(pairs: &[(&Assignment, &GradeEntry)]) -> Vec<(Uuid, f64)> {
    let total: f64 = pairs.iter().map(|(assignment, _)| assignment.weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    pairs
        .iter()
        .map(|(assignment, _)| (assignment.id, assignment.weight / total))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn assignment(title: &str, weight: f64, total_points: f64) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: "quiz".to_string(),
            total_points,
            weight,
        }
    }

    fn entry(student_id: Uuid, assignment: &Assignment, earned: f64, day: u32) -> GradeEntry {
        GradeEntry {
            student_id,
            assignment_id: assignment.id,
            earned_points: earned,
            recorded_at: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        }
    }

    #[test]
    fn ungraded_assignments_are_excluded() {
        let student = Uuid::new_v4();
        let assignments = vec![assignment("quiz", 20.0, 50.0), assignment("exam", 80.0, 100.0)];
        let entries = vec![entry(student, &assignments[0], 45.0, 1)];

        let selection = select_graded(&assignments, &entries);
        assert_eq!(selection.pairs.len(), 1);
        assert_eq!(selection.pairs[0].0.title, "quiz");
        assert!(selection.rejected.is_empty());
    }

    #[test]
    fn non_positive_weights_are_rejected_and_skipped() {
        let student = Uuid::new_v4();
        let assignments = vec![
            assignment("quiz", 20.0, 50.0),
            assignment("practice", 0.0, 10.0),
            assignment("bonus", -5.0, 10.0),
        ];
        let entries: Vec<GradeEntry> = assignments
            .iter()
            .map(|a| entry(student, a, 5.0, 2))
            .collect();

        let selection = select_graded(&assignments, &entries);
        assert_eq!(selection.pairs.len(), 1);
        assert_eq!(selection.rejected.len(), 2);
        assert_eq!(
            selection.rejected[0],
            ConfigurationError::NonPositiveWeight {
                assignment_id: assignments[1].id,
                weight: 0.0,
            }
        );
    }

    #[test]
    fn latest_entry_replaces_earlier_one() {
        let student = Uuid::new_v4();
        let assignments = vec![assignment("quiz", 20.0, 50.0)];
        let entries = vec![
            entry(student, &assignments[0], 30.0, 5),
            entry(student, &assignments[0], 10.0, 1),
            entry(student, &assignments[0], 45.0, 9),
        ];

        let selection = select_graded(&assignments, &entries);
        assert_eq!(selection.pairs.len(), 1);
        assert_eq!(selection.pairs[0].1.earned_points, 45.0);
    }

    #[test]
    fn weights_normalize_over_graded_subset() {
        let student = Uuid::new_v4();
        let assignments = vec![
            assignment("quiz", 20.0, 50.0),
            assignment("lab", 20.0, 50.0),
            assignment("exam", 60.0, 100.0),
        ];
        let entries = vec![
            entry(student, &assignments[0], 40.0, 1),
            entry(student, &assignments[1], 40.0, 1),
        ];

        let selection = select_graded(&assignments, &entries);
        let weights = normalized_weights(&selection.pairs);
        assert_eq!(weights.len(), 2);
        assert!(weights.iter().all(|(_, share)| (share - 0.5).abs() < 1e-12));
        assert!(normalized_weights(&[]).is_empty());
    }
}
