//! Number to cell mapping
//!
//! Stateless functions mapping between a number and its (column, row,
//! pixel-center) position inside a [`GridDefinition`]. Every function checks
//! validity first: an invalid definition yields `None` or an empty result.

use tracing::debug;

use super::config::GridConfig;
use super::types::{saturate, Coordinate, FillOrder, GridDefinition, GridParams, PositionMap};

/// Column and row of the cell holding `number`
pub fn cell_for_number(grid: &GridDefinition, number: u32) -> Option<(u32, u32)> {
    if !grid.is_valid() || !grid.holds(number) {
        return None;
    }

    let index = number - grid.start_number;
    let (columns, rows) = (grid.columns, grid.rows);

    let cell = match grid.fill_order {
        FillOrder::ColumnBottomToTop => (index / rows, rows - 1 - (index % rows)),
        FillOrder::ColumnTopToBottom => (index / rows, index % rows),
        FillOrder::RowLeftToRight => (index % columns, index / columns),
        FillOrder::RowRightToLeft => (columns - 1 - (index % columns), index / columns),
    };
    Some(cell)
}

/// Column of the cell holding `number`, or `None` when out of range or invalid
pub fn column_for_number(grid: &GridDefinition, number: u32) -> Option<u32> {
    cell_for_number(grid, number).map(|(column, _)| column)
}

/// Row of the cell holding `number`, or `None` when out of range or invalid
pub fn row_for_number(grid: &GridDefinition, number: u32) -> Option<u32> {
    cell_for_number(grid, number).map(|(_, row)| row)
}

/// Pixel center of the cell holding `number`.
///
/// The cell origin advances by the adjusted (spaced) cell size while the
/// centering uses the plain cell size. Results beyond the `i32` range
/// saturate.
pub fn position_for_number(grid: &GridDefinition, number: u32) -> Option<Coordinate> {
    let (column, row) = cell_for_number(grid, number)?;
    let x = i64::from(grid.adjusted_top_left_x())
        + i64::from(column) * i64::from(grid.adjusted_cell_width())
        + i64::from(grid.cell_width() / 2);
    let y = i64::from(grid.adjusted_top_left_y())
        + i64::from(row) * i64::from(grid.adjusted_cell_height())
        + i64::from(grid.cell_height() / 2);
    Some(Coordinate::new(saturate(x), saturate(y)))
}

/// All numbers placed in `column`, in ascending order
pub fn numbers_in_column(grid: &GridDefinition, column: u32) -> Vec<u32> {
    numbers_where(grid, |(c, _)| c == column)
}

/// All numbers placed in `row`, in ascending order
pub fn numbers_in_row(grid: &GridDefinition, row: u32) -> Vec<u32> {
    numbers_where(grid, |(_, r)| r == row)
}

fn numbers_where(grid: &GridDefinition, pred: impl Fn((u32, u32)) -> bool) -> Vec<u32> {
    if !grid.is_valid() {
        return Vec::new();
    }
    (grid.start_number..=grid.end_number)
        .filter(|&n| cell_for_number(grid, n).is_some_and(&pred))
        .collect()
}

/// Pixel centers for every number in `start_number..=end_number`
pub fn calculate_number_positions(grid: &GridDefinition) -> PositionMap {
    if !grid.is_valid() {
        debug!(panel = %grid.panel_id, "invalid grid definition, no positions");
        return PositionMap::new();
    }
    (grid.start_number..=grid.end_number)
        .filter_map(|n| position_for_number(grid, n).map(|pos| (n, pos)))
        .collect()
}

/// Whether a mark of the given size fits inside one cell
pub fn mark_fits_in_cell(grid: &GridDefinition, mark_width: i32, mark_height: i32) -> bool {
    grid.is_valid() && mark_width <= grid.cell_width() && mark_height <= grid.cell_height()
}

/// Whether marks of the given size would crowd neighbouring cells
pub fn will_marks_overlap(grid: &GridDefinition, mark_width: i32, mark_height: i32) -> bool {
    will_marks_overlap_with_config(grid, mark_width, mark_height, &GridConfig::default())
}

pub fn will_marks_overlap_with_config(
    grid: &GridDefinition,
    mark_width: i32,
    mark_height: i32,
    config: &GridConfig,
) -> bool {
    if !grid.is_valid() {
        return false;
    }
    let limit_w = grid.cell_width() as f64 * config.mark_overlap_ratio;
    let limit_h = grid.cell_height() as f64 * config.mark_overlap_ratio;
    mark_width as f64 > limit_w || mark_height as f64 > limit_h
}

/// Suggested (width, height) for marks on this grid
pub fn suggest_optimal_mark_size(grid: &GridDefinition) -> (i32, i32) {
    suggest_optimal_mark_size_with_config(grid, &GridConfig::default())
}

pub fn suggest_optimal_mark_size_with_config(
    grid: &GridDefinition,
    config: &GridConfig,
) -> (i32, i32) {
    let scale = |size: i32| {
        let scaled = (size as f64 * config.suggested_mark_ratio) as i32;
        scaled.max(config.min_mark_size)
    };
    (scale(grid.cell_width()), scale(grid.cell_height()))
}

/// Normalize two arbitrarily ordered corners into (top-left, bottom-right)
pub fn normalize_corners(a: Coordinate, b: Coordinate) -> (Coordinate, Coordinate) {
    (
        Coordinate::new(a.x.min(b.x), a.y.min(b.y)),
        Coordinate::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Build a definition from two corner clicks in any order
pub fn create_from_corners(a: Coordinate, b: Coordinate, params: &GridParams) -> GridDefinition {
    let (top_left, bottom_right) = normalize_corners(a, b);
    params.to_definition(top_left, bottom_right)
}
