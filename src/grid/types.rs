//! Core types for panel grids

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An integer pixel position on the scanned slip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for (i32, i32) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Mapping from a number to the pixel center of its cell.
///
/// Ordered so that iteration (and anything seeded from it) is deterministic.
pub type PositionMap = BTreeMap<u32, Coordinate>;

/// Known, trusted pixel positions for some numbers of a panel
pub type AnchorMap = BTreeMap<u32, Coordinate>;

/// The order in which consecutive numbers populate a panel's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOrder {
    /// Numbers advance up a column, then move to the next column
    #[default]
    ColumnBottomToTop,
    /// Numbers advance down a column, then move to the next column
    ColumnTopToBottom,
    /// Numbers advance rightward along a row, then move to the next row
    RowLeftToRight,
    /// Numbers advance leftward along a row, then move to the next row
    RowRightToLeft,
}

impl FillOrder {
    pub const ALL: [FillOrder; 4] = [
        FillOrder::ColumnBottomToTop,
        FillOrder::ColumnTopToBottom,
        FillOrder::RowLeftToRight,
        FillOrder::RowRightToLeft,
    ];

    /// Machine-readable name, as used in template files
    pub fn name(&self) -> &'static str {
        match self {
            FillOrder::ColumnBottomToTop => "column_bottom_to_top",
            FillOrder::ColumnTopToBottom => "column_top_to_bottom",
            FillOrder::RowLeftToRight => "row_left_to_right",
            FillOrder::RowRightToLeft => "row_right_to_left",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FillOrder::ColumnBottomToTop => "Column, bottom to top",
            FillOrder::ColumnTopToBottom => "Column, top to bottom",
            FillOrder::RowLeftToRight => "Row, left to right",
            FillOrder::RowRightToLeft => "Row, right to left",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FillOrder::ColumnBottomToTop => {
                "Numbers advance up a column, then move to the next column to the right"
            }
            FillOrder::ColumnTopToBottom => {
                "Numbers advance down a column, then move to the next column to the right"
            }
            FillOrder::RowLeftToRight => {
                "Numbers advance rightward along a row, then move to the next row down"
            }
            FillOrder::RowRightToLeft => {
                "Numbers advance leftward along a row, then move to the next row down"
            }
        }
    }
}

impl fmt::Display for FillOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FillOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FillOrder::ALL
            .into_iter()
            .find(|order| order.name() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = FillOrder::ALL.iter().map(|o| o.name()).collect();
                format!(
                    "unknown fill order '{}' (valid: {})",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Fine-tuning deltas applied on top of the corner geometry, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridAdjustments {
    pub x_offset: i32,
    pub y_offset: i32,
    pub horizontal_spacing: i32,
    pub vertical_spacing: i32,
}

impl GridAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the whole grid
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    /// Add extra space between neighbouring cells
    pub fn with_spacing(mut self, horizontal: i32, vertical: i32) -> Self {
        self.horizontal_spacing = horizontal;
        self.vertical_spacing = vertical;
        self
    }
}

/// Everything about a panel's grid except its corner geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridParams {
    pub panel_id: String,
    pub columns: u32,
    pub rows: u32,
    pub start_number: u32,
    pub end_number: u32,
    pub fill_order: FillOrder,
    pub adjustments: GridAdjustments,
}

impl GridParams {
    pub fn new(
        panel_id: impl Into<String>,
        columns: u32,
        rows: u32,
        start_number: u32,
        end_number: u32,
        fill_order: FillOrder,
    ) -> Self {
        Self {
            panel_id: panel_id.into(),
            columns,
            rows,
            start_number,
            end_number,
            fill_order,
            adjustments: GridAdjustments::default(),
        }
    }

    pub fn with_adjustments(mut self, adjustments: GridAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Build a definition spanning the given canonical corners
    pub fn to_definition(&self, top_left: Coordinate, bottom_right: Coordinate) -> GridDefinition {
        GridDefinition {
            top_left,
            bottom_right,
            columns: self.columns,
            rows: self.rows,
            start_number: self.start_number,
            end_number: self.end_number,
            fill_order: self.fill_order,
            panel_id: self.panel_id.clone(),
            adjustments: self.adjustments,
        }
    }
}

/// The geometric and numeric configuration of one panel's number grid.
///
/// A definition may be transiently incomplete while a collaborator is still
/// editing it; consumers check [`GridDefinition::is_valid`] and treat an
/// invalid definition as producing zero-sized or empty results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDefinition {
    pub top_left: Coordinate,
    pub bottom_right: Coordinate,
    pub columns: u32,
    pub rows: u32,
    pub start_number: u32,
    pub end_number: u32,
    pub fill_order: FillOrder,
    pub panel_id: String,
    pub adjustments: GridAdjustments,
}

impl GridDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        top_left: Coordinate,
        bottom_right: Coordinate,
        columns: u32,
        rows: u32,
        start_number: u32,
        end_number: u32,
        fill_order: FillOrder,
        panel_id: impl Into<String>,
    ) -> Self {
        Self {
            top_left,
            bottom_right,
            columns,
            rows,
            start_number,
            end_number,
            fill_order,
            panel_id: panel_id.into(),
            adjustments: GridAdjustments::default(),
        }
    }

    pub fn with_adjustments(mut self, adjustments: GridAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Whether the definition can be mapped.
    ///
    /// Both extents must be positive and fit in an `i32`.
    pub fn is_valid(&self) -> bool {
        let extent = 1..=i64::from(i32::MAX);
        self.columns > 0
            && self.rows > 0
            && self.start_number > 0
            && self.end_number >= self.start_number
            && extent.contains(&self.wide_width())
            && extent.contains(&self.wide_height())
    }

    /// Horizontal extent, saturated to the `i32` range
    pub fn width(&self) -> i32 {
        saturate(self.wide_width())
    }

    /// Vertical extent, saturated to the `i32` range
    pub fn height(&self) -> i32 {
        saturate(self.wide_height())
    }

    fn wide_width(&self) -> i64 {
        i64::from(self.bottom_right.x) - i64::from(self.top_left.x)
    }

    fn wide_height(&self) -> i64 {
        i64::from(self.bottom_right.y) - i64::from(self.top_left.y)
    }

    /// Width of one cell, or 0 for an invalid definition
    pub fn cell_width(&self) -> i32 {
        if !self.is_valid() {
            return 0;
        }
        saturate(self.wide_width() / i64::from(self.columns))
    }

    /// Height of one cell, or 0 for an invalid definition
    pub fn cell_height(&self) -> i32 {
        if !self.is_valid() {
            return 0;
        }
        saturate(self.wide_height() / i64::from(self.rows))
    }

    /// Column pitch including horizontal spacing
    pub fn adjusted_cell_width(&self) -> i32 {
        if !self.is_valid() {
            return 0;
        }
        self.cell_width()
            .saturating_add(self.adjustments.horizontal_spacing)
    }

    /// Row pitch including vertical spacing
    pub fn adjusted_cell_height(&self) -> i32 {
        if !self.is_valid() {
            return 0;
        }
        self.cell_height()
            .saturating_add(self.adjustments.vertical_spacing)
    }

    pub fn adjusted_top_left_x(&self) -> i32 {
        self.top_left.x.saturating_add(self.adjustments.x_offset)
    }

    pub fn adjusted_top_left_y(&self) -> i32 {
        self.top_left.y.saturating_add(self.adjustments.y_offset)
    }

    /// How many numbers the grid holds, or 0 for an invalid definition
    pub fn total_numbers(&self) -> u32 {
        if !self.is_valid() {
            return 0;
        }
        self.end_number - self.start_number + 1
    }

    /// Whether `number` lies in the inclusive number range
    pub fn holds(&self, number: u32) -> bool {
        number >= self.start_number && number <= self.end_number
    }

    /// Check if a pixel lies inside the corner rectangle
    pub fn contains(&self, point: Coordinate) -> bool {
        point.x >= self.top_left.x
            && point.x <= self.bottom_right.x
            && point.y >= self.top_left.y
            && point.y <= self.bottom_right.y
    }
}

/// Clamp a widened pixel value back into `i32`
pub(crate) fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
