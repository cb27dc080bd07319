//! Validation outcomes and the human-readable report

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Outcome of validating a single panel's coordinate map
#[derive(Debug, Clone, PartialEq)]
pub struct PanelValidationResult {
    pub panel_id: String,
    pub passed: bool,
    pub coordinates_mapped: usize,
    pub tests_run: usize,
    pub tests_passed: usize,
    /// Distinct failure descriptions, in the order first seen
    pub errors: Vec<String>,
    /// Every number that was sampled and found sound, across all trials
    pub numbers_tested: BTreeSet<u32>,
    pub coverage_percentage: f64,
    pub expected_numbers: u32,
}

/// Display status of a panel in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Passed,
    NotConfigured,
    Partial,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelStatus::Passed => f.write_str("PASSED"),
            PanelStatus::NotConfigured => f.write_str("NOT CONFIGURED"),
            PanelStatus::Partial => f.write_str("PARTIAL"),
        }
    }
}

impl PanelValidationResult {
    /// An empty result, before any trial has run
    pub fn new(panel_id: impl Into<String>, expected_numbers: u32) -> Self {
        Self {
            panel_id: panel_id.into(),
            passed: false,
            coordinates_mapped: 0,
            tests_run: 0,
            tests_passed: 0,
            errors: Vec::new(),
            numbers_tested: BTreeSet::new(),
            coverage_percentage: 0.0,
            expected_numbers,
        }
    }

    /// Whether the panel has any coordinates at all
    pub fn is_configured(&self) -> bool {
        self.coordinates_mapped > 0
    }

    /// Fraction of trials that passed, 0 when no trial ran
    pub fn pass_rate(&self) -> f64 {
        if self.tests_run == 0 {
            return 0.0;
        }
        self.tests_passed as f64 / self.tests_run as f64
    }

    pub fn status(&self) -> PanelStatus {
        if !self.is_configured() {
            PanelStatus::NotConfigured
        } else if self.passed {
            PanelStatus::Passed
        } else {
            PanelStatus::Partial
        }
    }

    /// Record a failure once, keeping first-seen order
    pub(crate) fn record_error(&mut self, message: String) {
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }

    /// Recompute coverage from the numbers tested so far
    pub(crate) fn update_coverage(&mut self) {
        self.coverage_percentage = if self.expected_numbers == 0 {
            0.0
        } else {
            self.numbers_tested.len() as f64 * 100.0 / self.expected_numbers as f64
        };
    }

    /// Fold another result for the same panel id into this one.
    ///
    /// Two maps under one id are ambiguous, so the merged panel never passes.
    pub(crate) fn absorb(&mut self, other: PanelValidationResult) {
        self.coordinates_mapped += other.coordinates_mapped;
        self.tests_run += other.tests_run;
        self.tests_passed += other.tests_passed;
        self.numbers_tested.extend(other.numbers_tested);
        self.expected_numbers = self.expected_numbers.max(other.expected_numbers);
        self.update_coverage();
        for error in other.errors {
            self.record_error(error);
        }
        self.record_error(format!("Panel id '{}' supplied more than once", self.panel_id));
        self.passed = false;
    }
}

/// Aggregate outcome over every panel of a template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateValidationResult {
    pub panels: BTreeMap<String, PanelValidationResult>,
    pub validation_time_ms: u64,
}

impl TemplateValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a panel result; a second result under the same id is merged
    /// into the first and marks that panel failed
    pub fn insert(&mut self, result: PanelValidationResult) {
        match self.panels.entry(result.panel_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
            Entry::Occupied(mut slot) => slot.get_mut().absorb(result),
        }
    }

    /// Panels that have at least one coordinate mapped
    pub fn configured(&self) -> impl Iterator<Item = &PanelValidationResult> {
        self.panels.values().filter(|p| p.is_configured())
    }

    pub fn configured_panels(&self) -> usize {
        self.configured().count()
    }

    pub fn total_tests_run(&self) -> usize {
        self.panels.values().map(|p| p.tests_run).sum()
    }

    pub fn total_coordinates_mapped(&self) -> usize {
        self.panels.values().map(|p| p.coordinates_mapped).sum()
    }

    /// True when every configured panel passed; unconfigured panels never fail a template
    pub fn overall_pass(&self) -> bool {
        self.configured().all(|p| p.passed)
    }

    /// Mean coverage over configured panels, 0 when none are configured
    pub fn average_coverage(&self) -> f64 {
        let configured = self.configured_panels();
        if configured == 0 {
            return 0.0;
        }
        self.configured().map(|p| p.coverage_percentage).sum::<f64>() / configured as f64
    }

    /// Configured panels that did not pass
    pub fn failed_panels(&self) -> Vec<&str> {
        self.configured()
            .filter(|p| !p.passed)
            .map(|p| p.panel_id.as_str())
            .collect()
    }
}

impl fmt::Display for TemplateValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.overall_pass() { "PASSED" } else { "FAILED" };
        writeln!(f, "TEMPLATE VALIDATION: {}", verdict)?;
        writeln!(
            f,
            "Configured panels: {}/{}",
            self.configured_panels(),
            self.panels.len()
        )?;
        writeln!(f, "Coordinates mapped: {}", self.total_coordinates_mapped())?;
        writeln!(f, "Tests run: {}", self.total_tests_run())?;
        writeln!(f, "Average coverage: {:.1}%", self.average_coverage())?;
        writeln!(f, "Time: {} ms", self.validation_time_ms)?;

        for panel in self.panels.values() {
            writeln!(f)?;
            write!(f, "{}", panel)?;
        }
        Ok(())
    }
}

impl fmt::Display for PanelValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.panel_id, self.status())?;
        if !self.is_configured() {
            return Ok(());
        }
        writeln!(f, "    Coordinates: {}", self.coordinates_mapped)?;
        writeln!(
            f,
            "    Coverage: {:.1}% ({}/{})",
            self.coverage_percentage,
            self.numbers_tested.len(),
            self.expected_numbers
        )?;
        writeln!(f, "    Trials passed: {}/{}", self.tests_passed, self.tests_run)?;
        if !self.errors.is_empty() {
            writeln!(f, "    Errors:")?;
            for error in &self.errors {
                writeln!(f, "      - {}", error)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, mapped: usize, passed: bool, coverage: f64) -> PanelValidationResult {
        let mut result = PanelValidationResult::new(id, 54);
        result.coordinates_mapped = mapped;
        result.passed = passed;
        result.coverage_percentage = coverage;
        result
    }

    #[test]
    fn test_status() {
        assert_eq!(panel("A", 0, false, 0.0).status(), PanelStatus::NotConfigured);
        assert_eq!(panel("A", 54, true, 100.0).status(), PanelStatus::Passed);
        assert_eq!(panel("A", 54, false, 80.0).status(), PanelStatus::Partial);
    }

    #[test]
    fn test_record_error_deduplicates() {
        let mut result = PanelValidationResult::new("A", 54);
        result.record_error("first".to_string());
        result.record_error("second".to_string());
        result.record_error("first".to_string());
        assert_eq!(result.errors, vec!["first", "second"]);
    }

    #[test]
    fn test_unconfigured_panels_are_ignored() {
        let mut template = TemplateValidationResult::new();
        template.insert(panel("A", 54, true, 100.0));
        template.insert(panel("B", 0, false, 0.0));
        template.insert(panel("C", 10, true, 50.0));

        assert!(template.overall_pass());
        assert_eq!(template.configured_panels(), 2);
        assert_eq!(template.total_coordinates_mapped(), 64);
        assert_eq!(template.average_coverage(), 75.0);
        assert!(template.failed_panels().is_empty());
    }

    #[test]
    fn test_failed_panel_fails_template() {
        let mut template = TemplateValidationResult::new();
        template.insert(panel("A", 54, true, 100.0));
        template.insert(panel("B", 54, false, 100.0));
        assert!(!template.overall_pass());
        assert_eq!(template.failed_panels(), vec!["B"]);
    }

    #[test]
    fn test_duplicate_panel_ids_merge_and_fail() {
        let mut first = panel("A", 54, true, 50.0);
        first.tests_run = 10;
        first.tests_passed = 10;
        first.numbers_tested.extend(1..=27);
        let mut second = panel("A", 54, true, 50.0);
        second.tests_run = 10;
        second.tests_passed = 10;
        second.numbers_tested.extend(28..=54);

        let mut template = TemplateValidationResult::new();
        template.insert(first);
        template.insert(second);

        let merged = &template.panels["A"];
        assert_eq!(template.panels.len(), 1);
        assert!(!merged.passed);
        assert_eq!(merged.coordinates_mapped, 108);
        assert_eq!(merged.tests_run, 20);
        assert_eq!(merged.coverage_percentage, 100.0);
        assert_eq!(merged.errors, vec!["Panel id 'A' supplied more than once"]);
        assert!(!template.overall_pass());
        assert_eq!(template.failed_panels(), vec!["A"]);
    }

    #[test]
    fn test_empty_template() {
        let template = TemplateValidationResult::new();
        assert!(template.overall_pass());
        assert_eq!(template.average_coverage(), 0.0);
    }

    #[test]
    fn test_pass_rate() {
        let mut result = PanelValidationResult::new("A", 54);
        assert_eq!(result.pass_rate(), 0.0);
        result.tests_run = 4;
        result.tests_passed = 3;
        assert_eq!(result.pass_rate(), 0.75);
    }
}
