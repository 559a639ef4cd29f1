//! Matching parameters.

use crate::error::{MatchError, Result};

/// Tuning knobs of one matching run, in image pixels unless noted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Minimum candidate search radius. Also bounds the gap between split
    /// fragments of one border, and (times three) the gap between redundant
    /// matches of one gridline.
    pub distance_threshold: f64,
    /// Tolerance of the colinear and close tests used to merge fragments.
    pub colinear_threshold: f64,
    /// Minimum share of the reference border a detected line must cover.
    pub min_overlap_ratio: f64,
    /// Allowed relative shrink of gridline spacing.
    pub variation_lower: f64,
    /// Allowed relative stretch of gridline spacing.
    pub variation_upper: f64,
    /// Solve horizontal and vertical borders on two threads.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 30.0,
            colinear_threshold: 10.0,
            min_overlap_ratio: 0.3,
            variation_lower: 0.2,
            variation_upper: 0.3,
            parallel: false,
        }
    }
}

impl MatchConfig {
    pub fn with_distance_threshold(mut self, d: f64) -> Self {
        self.distance_threshold = d;
        self
    }

    pub fn with_variation(mut self, lower: f64, upper: f64) -> Self {
        self.variation_lower = lower;
        self.variation_upper = upper;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Accepted band of matched-to-reference spacing ratios.
    pub fn scale_range(&self) -> (f64, f64) {
        (1.0 - self.variation_lower, 1.0 + self.variation_upper)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(MatchError::InvalidConfig(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        if !(self.colinear_threshold.is_finite() && self.colinear_threshold > 0.0) {
            return Err(MatchError::InvalidConfig(format!(
                "colinear_threshold must be positive, got {}",
                self.colinear_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.min_overlap_ratio) {
            return Err(MatchError::InvalidConfig(format!(
                "min_overlap_ratio must lie in [0, 1], got {}",
                self.min_overlap_ratio
            )));
        }
        if !(0.0..1.0).contains(&self.variation_lower) {
            return Err(MatchError::InvalidConfig(format!(
                "variation_lower must lie in [0, 1), got {}",
                self.variation_lower
            )));
        }
        if !(self.variation_upper.is_finite() && self.variation_upper >= 0.0) {
            return Err(MatchError::InvalidConfig(format!(
                "variation_upper must be non-negative, got {}",
                self.variation_upper
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scale_range(), (0.8, 1.3));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            MatchConfig::default().with_distance_threshold(0.0),
            MatchConfig::default().with_distance_threshold(f64::NAN),
            MatchConfig::default().with_variation(1.0, 0.3),
            MatchConfig::default().with_variation(0.2, -0.1),
            MatchConfig {
                min_overlap_ratio: 1.5,
                ..MatchConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(MatchError::InvalidConfig(_))
            ));
        }
    }
}
