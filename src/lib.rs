//! Weighted grade aggregation for a school gradebook: letter scales,
//! per-student weighted averages and class-wide statistics.

pub mod average;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod scale;
pub mod source;
pub mod stats;
pub mod weighting;

pub use average::StudentAverageCalculator;
pub use config::GradebookConfig;
pub use engine::Gradebook;
pub use error::{ConfigurationError, RangeViolation};
pub use scale::{GradeBand, GradeScale};
pub use source::GradeSource;
pub use stats::ClassStatisticsAggregator;
