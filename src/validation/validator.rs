//! Sampling-based verification of panel coordinate maps
//!
//! Each trial shuffles the numbers present in a panel's map, samples a
//! draw-sized subset and checks that every sampled number has a coordinate
//! inside the plausible image area. Trials are independent, so panels are
//! validated in parallel, each with its own generator derived from the
//! caller's seed.

use std::ops::RangeInclusive;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use super::config::ValidatorConfig;
use super::result::{PanelValidationResult, TemplateValidationResult};
use crate::grid::{Coordinate, PositionMap};

/// A panel's computed coordinate map, ready for validation
#[derive(Debug, Clone, PartialEq)]
pub struct PanelCoordinates {
    pub panel_id: String,
    pub positions: PositionMap,
    /// Numbers the panel should cover; the validator's range when `None`
    pub expected_range: Option<RangeInclusive<u32>>,
}

impl PanelCoordinates {
    pub fn new(panel_id: impl Into<String>, positions: PositionMap) -> Self {
        Self {
            panel_id: panel_id.into(),
            positions,
            expected_range: None,
        }
    }

    pub fn with_expected_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.expected_range = Some(range);
        self
    }
}

/// Randomized structural validator for coordinate maps
#[derive(Debug, Clone, Default)]
pub struct TemplateValidator {
    config: ValidatorConfig,
}

impl TemplateValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate every panel, drawing randomness from generators seeded by `seed`.
    ///
    /// Panels are processed in panel-id order and the i-th panel uses
    /// `seed + i`, so the outcome does not depend on thread scheduling.
    pub fn validate(&self, panels: &[PanelCoordinates], seed: u64) -> TemplateValidationResult {
        let started = Instant::now();

        let mut ordered: Vec<&PanelCoordinates> = panels.iter().collect();
        ordered.sort_by(|a, b| a.panel_id.cmp(&b.panel_id));

        let results: Vec<PanelValidationResult> = ordered
            .par_iter()
            .enumerate()
            .map(|(i, panel)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                self.validate_panel(panel, &mut rng)
            })
            .collect();

        let mut template = TemplateValidationResult::new();
        for result in results {
            if template.panels.contains_key(&result.panel_id) {
                warn!(panel = %result.panel_id, "panel id supplied more than once");
            }
            template.insert(result);
        }
        template.validation_time_ms = started.elapsed().as_millis() as u64;

        info!(
            panels = template.panels.len(),
            configured = template.configured_panels(),
            tests = template.total_tests_run(),
            passed = template.overall_pass(),
            elapsed_ms = template.validation_time_ms,
            "template validation finished"
        );
        template
    }

    /// Run all trials for one panel using the given randomness source
    pub fn validate_panel<R: Rng + ?Sized>(
        &self,
        panel: &PanelCoordinates,
        rng: &mut R,
    ) -> PanelValidationResult {
        let expected = panel
            .expected_range
            .clone()
            .unwrap_or_else(|| self.config.number_range.clone());
        let expected_numbers = (*expected.end() + 1).saturating_sub(*expected.start());

        let mut result = PanelValidationResult::new(panel.panel_id.clone(), expected_numbers);
        result.coordinates_mapped = panel.positions.len();
        if panel.positions.is_empty() {
            info!(panel = %panel.panel_id, "panel not configured, skipping");
            return result;
        }

        let mut numbers: Vec<u32> = panel.positions.keys().copied().collect();
        let sample_size = self.config.sample_size.clamp(1, numbers.len());

        for _ in 0..self.config.max_tests {
            numbers.shuffle(rng);
            let mut trial_passed = true;

            for &number in &numbers[..sample_size] {
                match panel.positions.get(&number) {
                    None => {
                        trial_passed = false;
                        result.record_error(format!("Number {}: no coordinate mapped", number));
                    }
                    Some(&coord) if !self.in_bounds(coord) => {
                        trial_passed = false;
                        result.record_error(format!(
                            "Number {}: coordinate {} outside 0..{}",
                            number, coord, self.config.coordinate_limit
                        ));
                    }
                    Some(_) => {
                        result.numbers_tested.insert(number);
                    }
                }
            }

            result.tests_run += 1;
            if trial_passed {
                result.tests_passed += 1;
            }
        }

        result.update_coverage();
        result.passed = result.tests_run > 0
            && result.pass_rate() >= self.config.pass_threshold
            && result.errors.is_empty();

        if result.passed {
            info!(
                panel = %result.panel_id,
                coverage = result.coverage_percentage,
                "panel passed"
            );
        } else {
            warn!(
                panel = %result.panel_id,
                trials_passed = result.tests_passed,
                trials = result.tests_run,
                errors = result.errors.len(),
                "panel failed validation"
            );
        }
        result
    }

    fn in_bounds(&self, coord: Coordinate) -> bool {
        let limit = self.config.coordinate_limit;
        coord.x > 0 && coord.x < limit && coord.y > 0 && coord.y < limit
    }
}
