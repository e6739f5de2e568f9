use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::GradebookConfig;
use crate::error::RangeViolation;
use crate::models::Assignment;

/// Rejects scores that do not fit the assignment before they reach storage.
pub fn validate_entry(assignment: &Assignment, earned_points: f64) -> Result<(), RangeViolation> {
    let in_range = assignment.total_points > 0.0
        && earned_points >= 0.0
        && earned_points <= assignment.total_points;
    if in_range {
        Ok(())
    } else {
        Err(RangeViolation {
            assignment_id: assignment.id,
            earned_points,
            total_points: assignment.total_points,
        })
    }
}

/// One line of a gradebook CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    pub class_code: String,
    pub student_name: String,
    pub student_email: String,
    pub assignment_title: String,
    pub category: String,
    pub total_points: f64,
    pub weight: Option<f64>,
    pub earned_points: f64,
    pub recorded_at: NaiveDate,
}

/// A row whose weight is resolved and whose score is in range.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub row: ImportRow,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportBatch {
    pub accepted: Vec<ValidatedRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportRow {
    pub fn validate(self, config: &GradebookConfig) -> Result<ValidatedRow, String> {
        let weight = match self.weight.or_else(|| config.weight_for(&self.category)) {
            Some(weight) if weight > 0.0 => weight,
            Some(weight) => {
                return Err(format!(
                    "assignment {} has non-positive weight {weight}",
                    self.assignment_title
                ))
            }
            None => {
                return Err(format!(
                    "assignment {} has no weight and category {} has no default",
                    self.assignment_title, self.category
                ))
            }
        };

        let in_range = self.total_points > 0.0
            && self.earned_points >= 0.0
            && self.earned_points <= self.total_points;
        if !in_range {
            return Err(format!(
                "assignment {}: earned {} outside 0..={}",
                self.assignment_title, self.earned_points, self.total_points
            ));
        }

        Ok(ValidatedRow { row: self, weight })
    }
}

/// Parses CSV rows and validates each one. Unparseable or invalid rows are
/// collected with their line number; the rest are returned for storage.
pub fn read_rows<R: Read>(reader: R, config: &GradebookConfig) -> ImportBatch {
    let mut reader = csv::Reader::from_reader(reader);
    let mut batch = ImportBatch::default();

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            batch.rejected.push(RejectedRow {
                line: 1,
                reason: err.to_string(),
            });
            return batch;
        }
    };

    for result in reader.records() {
        let (line, outcome) = match result {
            Ok(record) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                let outcome = record
                    .deserialize::<ImportRow>(Some(&headers))
                    .map_err(|err| err.to_string())
                    .and_then(|row| row.validate(config));
                (line, outcome)
            }
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or(0);
                (line, Err(err.to_string()))
            }
        };
        match outcome {
            Ok(row) => batch.accepted.push(row),
            Err(reason) => {
                tracing::warn!(line, %reason, "rejected gradebook row");
                batch.rejected.push(RejectedRow { line, reason });
            }
        }
    }

    batch
}
