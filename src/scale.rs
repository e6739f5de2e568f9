use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min: f64,
    pub max: f64,
    pub letter: String,
    pub gpa: f64,
    /// Display hint for the presentation layer.
    #[serde(default)]
    pub color: Option<String>,
}

impl GradeBand {
    pub fn new(letter: &str, min: f64, max: f64, gpa: f64, color: &str) -> Self {
        Self {
            min,
            max,
            letter: letter.to_string(),
            gpa,
            color: Some(color.to_string()),
        }
    }

    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.min && percentage <= self.max
    }
}

/// Validated set of bands, highest band first.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeScale {
    bands: Vec<GradeBand>,
}

impl GradeScale {
    pub fn new(mut bands: Vec<GradeBand>) -> Result<Self, ConfigurationError> {
        if bands.is_empty() {
            return Err(ConfigurationError::EmptyScale);
        }

        for band in &bands {
            if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
                return Err(ConfigurationError::InvalidBand {
                    letter: band.letter.clone(),
                    min: band.min,
                    max: band.max,
                });
            }
        }

        bands.sort_by(|a, b| b.min.total_cmp(&a.min));

        for (i, band) in bands.iter().enumerate() {
            if bands[..i].iter().any(|other| other.letter == band.letter) {
                return Err(ConfigurationError::DuplicateLetter(band.letter.clone()));
            }
        }

        for pair in bands.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.max >= upper.min {
                return Err(ConfigurationError::BandOverlap {
                    lower: lower.letter.clone(),
                    lower_max: lower.max,
                    upper: upper.letter.clone(),
                    upper_min: upper.min,
                });
            }
            // Whole-point scales (`F 0-59`, `D 60-69`) are contiguous; any
            // whole percentage strictly between two bands is a gap.
            if upper.min > lower.max.floor() + 1.0 {
                return Err(ConfigurationError::BandGap {
                    lower: lower.letter.clone(),
                    lower_max: lower.max,
                    upper: upper.letter.clone(),
                    upper_min: upper.min,
                });
            }
        }

        let top = bands[0].max;
        let bottom = bands[bands.len() - 1].min;
        if bottom > 0.0 || top < 100.0 {
            return Err(ConfigurationError::ScaleDoesNotCoverRange {
                min: bottom,
                max: top,
            });
        }

        Ok(Self { bands })
    }

    /// Band for `percentage`. Values above the scale land in the top band and
    /// values below it (negative, NaN) land in the bottom band.
    pub fn lookup(&self, percentage: f64) -> &GradeBand {
        self.bands
            .iter()
            .find(|band| percentage >= band.min)
            .unwrap_or_else(|| self.lowest())
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|band| band.letter.as_str())
    }

    pub fn lowest(&self) -> &GradeBand {
        &self.bands[self.bands.len() - 1]
    }

    pub fn highest(&self) -> &GradeBand {
        &self.bands[0]
    }
}

pub fn default_bands() -> Vec<GradeBand> {
    vec![
        GradeBand::new("A", 90.0, 100.0, 4.0, "#4CAF50"),
        GradeBand::new("B", 80.0, 89.0, 3.0, "#8BC34A"),
        GradeBand::new("C", 70.0, 79.0, 2.0, "#FFC107"),
        GradeBand::new("D", 60.0, 69.0, 1.0, "#FF9800"),
        GradeBand::new("F", 0.0, 59.0, 0.0, "#F44336"),
    ]
}

impl Default for GradeScale {
    fn default() -> Self {
        let mut bands = default_bands();
        bands.sort_by(|a, b| b.min.total_cmp(&a.min));
        Self { bands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_validate() {
        let scale = GradeScale::new(default_bands()).unwrap();
        assert_eq!(scale, GradeScale::default());
        assert_eq!(scale.letters().collect::<Vec<_>>(), ["A", "B", "C", "D", "F"]);
    }

    #[test]
    fn every_whole_percentage_falls_in_exactly_one_band() {
        let scale = GradeScale::default();
        for pct in 0..=100 {
            let pct = pct as f64;
            let matching = scale.bands().iter().filter(|b| b.contains(pct)).count();
            assert_eq!(matching, 1, "{pct} matched {matching} bands");
            assert!(scale.lookup(pct).contains(pct));
        }
    }

    #[test]
    fn lookup_follows_band_minimums() {
        let scale = GradeScale::default();
        assert_eq!(scale.lookup(100.0).letter, "A");
        assert_eq!(scale.lookup(90.0).letter, "A");
        assert_eq!(scale.lookup(89.5).letter, "B");
        assert_eq!(scale.lookup(80.0).letter, "B");
        assert_eq!(scale.lookup(74.0).letter, "C");
        assert_eq!(scale.lookup(60.0).letter, "D");
        assert_eq!(scale.lookup(59.9).letter, "F");
        assert_eq!(scale.lookup(0.0).gpa, 0.0);
    }

    #[test]
    fn out_of_range_values_saturate() {
        let scale = GradeScale::default();
        assert_eq!(scale.lookup(-5.0).letter, "F");
        assert_eq!(scale.lookup(f64::NEG_INFINITY).letter, "F");
        assert_eq!(scale.lookup(f64::NAN).letter, "F");
        assert_eq!(scale.lookup(104.0).letter, "A");
        assert_eq!(scale.lookup(104.0).gpa, 4.0);
    }

    #[test]
    fn unsorted_input_is_ordered_highest_first() {
        let mut bands = default_bands();
        bands.reverse();
        let scale = GradeScale::new(bands).unwrap();
        assert_eq!(scale.highest().letter, "A");
        assert_eq!(scale.lowest().letter, "F");
    }

    #[test]
    fn rejects_empty_scale() {
        assert_eq!(GradeScale::new(vec![]), Err(ConfigurationError::EmptyScale));
    }

    #[test]
    fn rejects_gaps() {
        let bands = vec![
            GradeBand::new("P", 60.0, 100.0, 4.0, "green"),
            GradeBand::new("F", 0.0, 50.0, 0.0, "red"),
        ];
        assert!(matches!(
            GradeScale::new(bands),
            Err(ConfigurationError::BandGap { .. })
        ));
    }

    #[test]
    fn rejects_fractional_bounds_that_skip_a_whole_percentage() {
        let bands = vec![
            GradeBand::new("P", 60.5, 100.0, 4.0, "green"),
            GradeBand::new("F", 0.0, 59.5, 0.0, "red"),
        ];
        assert!(matches!(
            GradeScale::new(bands),
            Err(ConfigurationError::BandGap { .. })
        ));
    }

    #[test]
    fn accepts_fractional_bounds_that_cover_every_whole_percentage() {
        let bands = vec![
            GradeBand::new("P", 60.0, 100.0, 4.0, "green"),
            GradeBand::new("F", 0.0, 59.99, 0.0, "red"),
        ];
        let scale = GradeScale::new(bands).unwrap();
        for pct in 0..=100 {
            let pct = pct as f64;
            let matching = scale.bands().iter().filter(|b| b.contains(pct)).count();
            assert_eq!(matching, 1, "{pct} matched {matching} bands");
        }
        assert_eq!(scale.lookup(59.995).letter, "F");
    }

    #[test]
    fn rejects_overlaps() {
        let bands = vec![
            GradeBand::new("P", 60.0, 100.0, 4.0, "green"),
            GradeBand::new("F", 0.0, 60.0, 0.0, "red"),
        ];
        assert!(matches!(
            GradeScale::new(bands),
            Err(ConfigurationError::BandOverlap { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_letters_and_partial_coverage() {
        let duplicate = vec![
            GradeBand::new("P", 50.0, 100.0, 4.0, "green"),
            GradeBand::new("P", 0.0, 49.0, 0.0, "red"),
        ];
        assert_eq!(
            GradeScale::new(duplicate),
            Err(ConfigurationError::DuplicateLetter("P".to_string()))
        );

        let partial = vec![GradeBand::new("P", 10.0, 100.0, 4.0, "green")];
        assert!(matches!(
            GradeScale::new(partial),
            Err(ConfigurationError::ScaleDoesNotCoverRange { .. })
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let bands = vec![GradeBand::new("X", 100.0, 0.0, 0.0, "grey")];
        assert!(matches!(
            GradeScale::new(bands),
            Err(ConfigurationError::InvalidBand { .. })
        ));
    }
}
