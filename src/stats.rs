use crate::models::{ClassStatistics, LetterCount, StudentAverage};
use crate::scale::GradeScale;

/// Summarizes a class from its per-student averages.
#[derive(Debug, Clone, Copy)]
pub struct ClassStatisticsAggregator<'a> {
    scale: &'a GradeScale,
}

impl<'a> ClassStatisticsAggregator<'a> {
    pub fn new(scale: &'a GradeScale) -> Self {
        Self { scale }
    }

    /// Every student counts once. An empty class reports zeros and an
    /// all-zero distribution; check `total_students` before trusting them.
    pub fn aggregate(&self, averages: &[StudentAverage]) -> ClassStatistics {
        let mut distribution: Vec<LetterCount> = self
            .scale
            .letters()
            .map(|letter| LetterCount {
                letter: letter.to_string(),
                count: 0,
            })
            .collect();

        if averages.is_empty() {
            return ClassStatistics {
                total_students: 0,
                class_average: 0.0,
                highest: 0.0,
                lowest: 0.0,
                average_gpa: 0.0,
                distribution,
            };
        }

        let mut sum = 0.0;
        let mut gpa_sum = 0.0;
        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;

        for average in averages {
            sum += average.percentage;
            gpa_sum += average.gpa;
            highest = highest.max(average.percentage);
            lowest = lowest.min(average.percentage);

            match distribution
                .iter_mut()
                .find(|bucket| bucket.letter == average.letter_grade)
            {
                Some(bucket) => bucket.count += 1,
                None => tracing::warn!(
                    student = %average.student_id,
                    letter = %average.letter_grade,
                    "letter grade not on the active scale"
                ),
            }
        }

        let count = averages.len() as f64;
        ClassStatistics {
            total_students: averages.len(),
            class_average: sum / count,
            highest,
            lowest,
            average_gpa: gpa_sum / count,
            distribution,
        }
    }
}
