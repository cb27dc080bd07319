//! Configuration for template validation

use std::ops::RangeInclusive;

use crate::error::TemplateError;

/// Configuration options for [`TemplateValidator`](super::TemplateValidator)
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Number of random trials per panel
    pub max_tests: usize,

    /// Numbers a panel is expected to cover unless it declares its own range
    pub number_range: RangeInclusive<u32>,

    /// Numbers sampled per trial, roughly one lottery draw
    pub sample_size: usize,

    /// Fraction of trials that must pass for a panel to pass
    pub pass_threshold: f64,

    /// Coordinates must lie strictly between 0 and this limit on both axes
    pub coordinate_limit: i32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_tests: 100,
            number_range: 1..=54,
            sample_size: 6,
            pass_threshold: 0.95,
            coordinate_limit: 10_000,
        }
    }
}

impl ValidatorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of trials per panel
    pub fn with_max_tests(mut self, max_tests: usize) -> Self {
        self.max_tests = max_tests;
        self
    }

    /// Set the default expected number range
    pub fn with_number_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.number_range = range;
        self
    }

    /// Set how many numbers each trial samples
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the trial pass-rate threshold
    pub fn with_pass_threshold(mut self, threshold: f64) -> Self {
        self.pass_threshold = threshold;
        self
    }

    /// Set the exclusive upper coordinate bound
    pub fn with_coordinate_limit(mut self, limit: i32) -> Self {
        self.coordinate_limit = limit;
        self
    }

    /// Reject settings that would make every verdict meaningless
    pub fn check(&self) -> Result<(), TemplateError> {
        if self.sample_size == 0 {
            return Err(TemplateError::invalid_setting("sample_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.pass_threshold) {
            return Err(TemplateError::invalid_setting(
                "pass_threshold",
                format!("must lie in 0.0..=1.0, got {}", self.pass_threshold),
            ));
        }
        if self.coordinate_limit <= 0 {
            return Err(TemplateError::invalid_setting(
                "coordinate_limit",
                format!("must be positive, got {}", self.coordinate_limit),
            ));
        }
        Ok(())
    }
}
