use uuid::Uuid;

/// Problems with the grade scale or assignment weights supplied by the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("grade scale has no bands")]
    EmptyScale,
    #[error("band {letter} has invalid bounds {min}..={max}")]
    InvalidBand { letter: String, min: f64, max: f64 },
    #[error("gap between band {lower} (max {lower_max}) and band {upper} (min {upper_min})")]
    BandGap {
        lower: String,
        lower_max: f64,
        upper: String,
        upper_min: f64,
    },
    #[error("band {lower} (max {lower_max}) overlaps band {upper} (min {upper_min})")]
    BandOverlap {
        lower: String,
        lower_max: f64,
        upper: String,
        upper_min: f64,
    },
    #[error("letter {0} appears in more than one band")]
    DuplicateLetter(String),
    #[error("grade scale covers {min}..={max}, expected 0..=100")]
    ScaleDoesNotCoverRange { min: f64, max: f64 },
    #[error("assignment {assignment_id} has non-positive weight {weight}")]
    NonPositiveWeight { assignment_id: Uuid, weight: f64 },
}

/// A recorded score that does not fit its assignment.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("assignment {assignment_id}: earned {earned_points} outside 0..={total_points}")]
pub struct RangeViolation {
    pub assignment_id: Uuid,
    pub earned_points: f64,
    pub total_points: f64,
}
