use crate::average::StudentAverageCalculator;
use crate::config::GradebookConfig;
use crate::models::{
    Assignment, ClassGradebook, ClassSnapshot, GradeEntry, Student, StudentAverage, StudentResult,
};
use crate::scale::GradeScale;
use crate::stats::ClassStatisticsAggregator;

/// Grades whole classes against one validated scale. Holds no per-class
/// state, so a single instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Gradebook {
    scale: GradeScale,
}

impl Gradebook {
    pub fn new(scale: GradeScale) -> Self {
        Self { scale }
    }

    pub fn from_config(config: &GradebookConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.grade_scale()?))
    }

    pub fn scale(&self) -> &GradeScale {
        &self.scale
    }

    pub fn student_average(
        &self,
        student: &Student,
        assignments: &[Assignment],
        entries: &[GradeEntry],
    ) -> StudentAverage {
        StudentAverageCalculator::new(&self.scale).calculate_for(student.id, assignments, entries)
    }

    pub fn class_report(&self, snapshot: &ClassSnapshot) -> ClassGradebook {
        let calculator = StudentAverageCalculator::new(&self.scale);
        let results: Vec<StudentResult> = snapshot
            .students
            .iter()
            .map(|student| {
                let entries = snapshot.entries_for(student.id);
                StudentResult {
                    student: student.clone(),
                    average: calculator.calculate_for(student.id, &snapshot.assignments, &entries),
                }
            })
            .collect();

        let averages: Vec<StudentAverage> =
            results.iter().map(|result| result.average.clone()).collect();
        let statistics = ClassStatisticsAggregator::new(&self.scale).aggregate(&averages);

        tracing::debug!(
            class = %snapshot.class_code,
            students = statistics.total_students,
            average = statistics.class_average,
            "computed class gradebook"
        );

        ClassGradebook {
            class_code: snapshot.class_code.clone(),
            results,
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn student(name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn entry(student: &Student, assignment: &Assignment, earned: f64) -> GradeEntry {
        GradeEntry {
            student_id: student.id,
            assignment_id: assignment.id,
            earned_points: earned,
            recorded_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    fn snapshot() -> ClassSnapshot {
        let quiz = Assignment {
            id: Uuid::new_v4(),
            title: "Quiz".to_string(),
            category: "quiz".to_string(),
            total_points: 50.0,
            weight: 20.0,
        };
        let exam = Assignment {
            id: Uuid::new_v4(),
            title: "Exam".to_string(),
            category: "exam".to_string(),
            total_points: 100.0,
            weight: 80.0,
        };
        let avery = student("Avery");
        let jules = student("Jules");
        let kiara = student("Kiara");
        let entries = vec![
            entry(&avery, &quiz, 45.0),
            entry(&avery, &exam, 70.0),
            entry(&jules, &quiz, 45.0),
        ];

        ClassSnapshot {
            class_code: "BIO-101".to_string(),
            assignments: vec![quiz, exam],
            students: vec![avery, jules, kiara],
            entries,
        }
    }

    #[test]
    fn grades_each_student_and_summarizes() {
        let gradebook = Gradebook::from_config(&GradebookConfig::default()).unwrap();
        let report = gradebook.class_report(&snapshot());

        assert_eq!(report.class_code, "BIO-101");
        assert_eq!(report.results.len(), 3);
        assert!((report.results[0].average.percentage - 74.0).abs() < 1e-9);
        assert!((report.results[1].average.percentage - 90.0).abs() < 1e-9);
        assert_eq!(report.results[2].average.percentage, 0.0);
        assert_eq!(report.results[2].average.graded_count, 0);

        let stats = &report.statistics;
        assert_eq!(stats.total_students, 3);
        assert!((stats.class_average - 164.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.highest, 90.0);
        assert_eq!(stats.lowest, 0.0);
        assert_eq!(stats.count_for("A"), 1);
        assert_eq!(stats.count_for("C"), 1);
        assert_eq!(stats.count_for("F"), 1);
    }

    #[test]
    fn empty_class_does_not_fail() {
        let gradebook = Gradebook::new(GradeScale::default());
        let report = gradebook.class_report(&ClassSnapshot::default());
        assert!(report.results.is_empty());
        assert_eq!(report.statistics.total_students, 0);
        assert_eq!(report.statistics.class_average, 0.0);
    }

    #[test]
    fn single_student_matches_class_report() {
        let gradebook = Gradebook::new(GradeScale::default());
        let snapshot = snapshot();
        let avery = &snapshot.students[0];
        let average = gradebook.student_average(avery, &snapshot.assignments, &snapshot.entries_for(avery.id));
        let report = gradebook.class_report(&snapshot);
        assert_eq!(average, report.results[0].average);
    }

    #[test]
    fn gradebook_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gradebook>();
    }
}
