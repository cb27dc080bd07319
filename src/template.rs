//! Template files
//!
//! A template describes every play panel of a slip: its two corner points,
//! grid shape, number range, fill order, optional fine-tuning and any anchors
//! saved from an earlier session. Templates are TOML; anchor keys are decimal
//! strings on disk and integers everywhere else.

use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

use crate::error::TemplateError;
use crate::grid::{
    calculator, interpolate, AnchorMap, Coordinate, FillOrder, GridAdjustments, GridDefinition,
    GridParams, PositionMap,
};
use crate::validation::{PanelCoordinates, ValidatorConfig};
use crate::MapConfig;

/// A loaded slip template
#[derive(Debug, Clone)]
pub struct Template {
    /// Optional name for the template
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Validation settings, defaults when the file has no `[validation]` table
    pub validation: ValidatorConfig,
    pub panels: Vec<PanelTemplate>,
}

/// One panel of a template
#[derive(Debug, Clone)]
pub struct PanelTemplate {
    pub params: GridParams,
    /// The two corner clicks, in whatever order they were made
    pub corners: (Coordinate, Coordinate),
    pub anchors: AnchorMap,
    pub expected_range: Option<RangeInclusive<u32>>,
}

/// TOML structure for deserializing templates
#[derive(Deserialize)]
struct TomlTemplate {
    metadata: Option<TomlMetadata>,
    validation: Option<TomlValidation>,
    #[serde(default)]
    panels: Vec<TomlPanel>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlValidation {
    max_tests: Option<usize>,
    number_range: Option<(u32, u32)>,
    sample_size: Option<usize>,
    pass_threshold: Option<f64>,
    coordinate_limit: Option<i32>,
}

#[derive(Deserialize)]
struct TomlPanel {
    id: String,
    corners: [(i32, i32); 2],
    columns: u32,
    rows: u32,
    start: u32,
    end: u32,
    #[serde(default)]
    fill_order: FillOrder,
    expected_range: Option<(u32, u32)>,
    #[serde(default)]
    x_offset: i32,
    #[serde(default)]
    y_offset: i32,
    #[serde(default)]
    horizontal_spacing: i32,
    #[serde(default)]
    vertical_spacing: i32,
    #[serde(default)]
    anchors: BTreeMap<String, (i32, i32)>,
}

impl Template {
    /// Load a template from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a template from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, TemplateError> {
        let parsed: TomlTemplate = toml::from_str(content)?;

        let validation = match parsed.validation {
            Some(v) => v.into_config()?,
            None => ValidatorConfig::default(),
        };

        let mut seen = HashSet::new();
        let mut panels = Vec::with_capacity(parsed.panels.len());
        for panel in parsed.panels {
            if !seen.insert(panel.id.clone()) {
                return Err(TemplateError::duplicate_panel(panel.id));
            }
            panels.push(panel.into_panel()?);
        }

        Ok(Template {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            validation,
            panels,
        })
    }

    pub fn panel(&self, id: &str) -> Option<&PanelTemplate> {
        self.panels.iter().find(|p| p.params.panel_id == id)
    }
}

impl TomlValidation {
    fn into_config(self) -> Result<ValidatorConfig, TemplateError> {
        let mut config = ValidatorConfig::default();
        if let Some(max_tests) = self.max_tests {
            config = config.with_max_tests(max_tests);
        }
        if let Some(range) = self.number_range {
            config = config.with_number_range(checked_range("validation number_range", range)?);
        }
        if let Some(sample_size) = self.sample_size {
            config = config.with_sample_size(sample_size);
        }
        if let Some(threshold) = self.pass_threshold {
            config = config.with_pass_threshold(threshold);
        }
        if let Some(limit) = self.coordinate_limit {
            config = config.with_coordinate_limit(limit);
        }
        config.check()?;
        Ok(config)
    }
}

impl TomlPanel {
    fn into_panel(self) -> Result<PanelTemplate, TemplateError> {
        let mut anchors = AnchorMap::new();
        for (key, &pos) in &self.anchors {
            let number =
                parse_number(key).ok_or_else(|| TemplateError::invalid_number(&self.id, key))?;
            if anchors.insert(number, Coordinate::from(pos)).is_some() {
                return Err(TemplateError::duplicate_anchor(&self.id, number));
            }
        }

        let expected_range = self
            .expected_range
            .map(|range| checked_range(format!("panel '{}' expected_range", self.id), range))
            .transpose()?;

        let adjustments = GridAdjustments::new()
            .with_offset(self.x_offset, self.y_offset)
            .with_spacing(self.horizontal_spacing, self.vertical_spacing);
        let params = GridParams::new(
            self.id,
            self.columns,
            self.rows,
            self.start,
            self.end,
            self.fill_order,
        )
        .with_adjustments(adjustments);

        Ok(PanelTemplate {
            params,
            corners: (self.corners[0].into(), self.corners[1].into()),
            anchors,
            expected_range,
        })
    }
}

fn checked_range(
    context: impl Into<String>,
    (start, end): (u32, u32),
) -> Result<RangeInclusive<u32>, TemplateError> {
    if start > end {
        return Err(TemplateError::invalid_range(context, start, end));
    }
    Ok(start..=end)
}

/// Parse a decimal-string number key.
///
/// Only plain ASCII digits are accepted, so every number has a single
/// spelling apart from leading zeros.
pub fn parse_number(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&n| n > 0)
}

/// Convert a position map to decimal-string keys for output
pub fn format_positions(positions: &PositionMap) -> BTreeMap<String, Coordinate> {
    positions
        .iter()
        .map(|(n, pos)| (n.to_string(), *pos))
        .collect()
}

impl PanelTemplate {
    pub fn panel_id(&self) -> &str {
        &self.params.panel_id
    }

    /// Grid for this panel, fitted to the anchors unless the config says otherwise
    pub fn grid(&self, config: &MapConfig) -> GridDefinition {
        let (a, b) = self.corners;
        if config.use_anchors {
            interpolate::create_learned_grid_with_config(
                &self.anchors,
                a,
                b,
                &self.params,
                &config.grid,
            )
        } else {
            calculator::create_from_corners(a, b, &self.params)
        }
    }

    /// Number positions for this panel
    pub fn positions(&self, config: &MapConfig) -> PositionMap {
        let grid = self.grid(config);
        if config.use_anchors {
            interpolate::calculate_optimized_positions_with_config(
                &grid,
                &self.anchors,
                &config.grid,
            )
        } else {
            calculator::calculate_number_positions(&grid)
        }
    }

    /// Positions bundled for the validator
    pub fn coordinates(&self, config: &MapConfig) -> PanelCoordinates {
        let coords = PanelCoordinates::new(self.panel_id(), self.positions(config));
        match &self.expected_range {
            Some(range) => coords.with_expected_range(range.clone()),
            None => coords,
        }
    }
}
