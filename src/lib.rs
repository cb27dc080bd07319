//! Slip Grid - number-cell geometry for scanned lottery slips
//!
//! This library computes the pixel position of every numbered cell inside the
//! play panels of a paper form, optionally refines those positions with anchor
//! coordinates saved from an earlier session, and validates the resulting
//! coordinate maps by random sampling.
//!
//! # Example
//!
//! ```rust
//! use slip_grid::grid::{calculate_number_positions, create_from_corners, Coordinate, FillOrder, GridParams};
//!
//! let params = GridParams::new("A", 5, 10, 1, 50, FillOrder::ColumnBottomToTop);
//! let grid = create_from_corners(Coordinate::new(0, 0), Coordinate::new(100, 200), &params);
//! let positions = calculate_number_positions(&grid);
//!
//! assert_eq!(positions[&1], Coordinate::new(10, 190));
//! assert_eq!(positions[&11], Coordinate::new(30, 190));
//! ```

pub mod error;
pub mod grid;
pub mod template;
pub mod validation;

use std::collections::BTreeMap;

pub use error::TemplateError;
pub use grid::{Coordinate, FillOrder, GridConfig, GridDefinition, GridParams, PositionMap};
pub use template::{PanelTemplate, Template};
pub use validation::{
    PanelValidationResult, TemplateValidationResult, TemplateValidator, ValidatorConfig,
};

use thiserror::Error;

/// Errors that can occur in the mapping pipeline
#[derive(Debug, Error)]
pub enum SlipGridError {
    /// Error loading the template
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Error serializing output
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Configuration for turning a template into coordinate maps
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Grid calculation thresholds
    pub grid: GridConfig,
    /// Refine panels with their saved anchors
    pub use_anchors: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            use_anchors: true,
        }
    }
}

impl MapConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Purely geometric mapping, anchors ignored
    pub fn geometric() -> Self {
        Self::default().with_anchors(false)
    }

    /// Set the grid configuration
    pub fn with_grid(mut self, config: GridConfig) -> Self {
        self.grid = config;
        self
    }

    /// Enable or disable anchor refinement
    pub fn with_anchors(mut self, use_anchors: bool) -> Self {
        self.use_anchors = use_anchors;
        self
    }
}

/// Compute the coordinate map of every panel in a template, keyed by panel id
pub fn map_template(template: &Template, config: &MapConfig) -> BTreeMap<String, PositionMap> {
    template
        .panels
        .iter()
        .map(|panel| (panel.panel_id().to_string(), panel.positions(config)))
        .collect()
}

/// Map every panel and validate the result with the template's validation settings
pub fn validate_template(
    template: &Template,
    config: &MapConfig,
    seed: u64,
) -> TemplateValidationResult {
    validate_template_with(template, config, &template.validation, seed)
}

/// Like [`validate_template`], with explicit validator settings
pub fn validate_template_with(
    template: &Template,
    config: &MapConfig,
    validator_config: &ValidatorConfig,
    seed: u64,
) -> TemplateValidationResult {
    let panels: Vec<_> = template
        .panels
        .iter()
        .map(|panel| panel.coordinates(config))
        .collect();
    TemplateValidator::new(validator_config.clone()).validate(&panels, seed)
}

/// Render coordinate maps as JSON, with decimal-string number keys
pub fn positions_to_json(maps: &BTreeMap<String, PositionMap>) -> Result<String, SlipGridError> {
    let formatted: BTreeMap<&str, BTreeMap<String, Coordinate>> = maps
        .iter()
        .map(|(id, positions)| (id.as_str(), template::format_positions(positions)))
        .collect();
    Ok(serde_json::to_string_pretty(&formatted)?)
}
