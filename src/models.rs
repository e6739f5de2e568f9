use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub total_points: f64,
    /// Share of the course grade, in percent.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub student_id: Uuid,
    pub assignment_id: Uuid,
    pub earned_points: f64,
    pub recorded_at: NaiveDate,
}

impl GradeEntry {
    /// Score as a percentage of the assignment's points, clamped to `[0, 100]`.
    pub fn percentage(&self, assignment: &Assignment) -> f64 {
        if assignment.total_points <= 0.0 {
            return 0.0;
        }
        (self.earned_points * 100.0 / assignment.total_points).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Everything the engine needs to grade one class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassSnapshot {
    pub class_code: String,
    pub assignments: Vec<Assignment>,
    pub students: Vec<Student>,
    pub entries: Vec<GradeEntry>,
}

impl ClassSnapshot {
    pub fn entries_for(&self, student_id: Uuid) -> Vec<GradeEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.student_id == student_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAverage {
    pub student_id: Uuid,
    pub percentage: f64,
    pub letter_grade: String,
    pub gpa: f64,
    pub earned_points: f64,
    pub total_points: f64,
    /// Sum of the counted weights as a fraction (`20% + 80%` is `1.0`).
    pub graded_weight: f64,
    pub graded_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterCount {
    pub letter: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStatistics {
    pub total_students: usize,
    pub class_average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub average_gpa: f64,
    /// One entry per band of the scale, highest band first.
    pub distribution: Vec<LetterCount>,
}

impl ClassStatistics {
    pub fn count_for(&self, letter: &str) -> usize {
        self.distribution
            .iter()
            .find(|bucket| bucket.letter == letter)
            .map(|bucket| bucket.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentResult {
    pub student: Student,
    pub average: StudentAverage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassGradebook {
    pub class_code: String,
    pub results: Vec<StudentResult>,
    pub statistics: ClassStatistics,
}
