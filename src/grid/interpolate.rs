//! Anchor-driven grid refinement
//!
//! Anchors are trusted pixel positions for some numbers, usually loaded from a
//! previously saved template. Printing and scanning tolerances make the pure
//! geometric formulas drift, so when enough anchors are available they are
//! used to fit a tighter bounding box ([`create_learned_grid`]) and to
//! interpolate the positions of the remaining numbers
//! ([`calculate_optimized_positions`]).

use tracing::debug;

use super::calculator::{self, normalize_corners};
use super::config::GridConfig;
use super::types::{saturate, AnchorMap, Coordinate, GridDefinition, GridParams, PositionMap};

/// Anchors whose number lies in `start..=end`
pub fn anchors_in_range(anchors: &AnchorMap, start: u32, end: u32) -> AnchorMap {
    if end < start {
        return AnchorMap::new();
    }
    anchors
        .range(start..=end)
        .map(|(&n, &pos)| (n, pos))
        .collect()
}

/// Build a grid whose bounding box is fitted to the anchors when they are dense enough
pub fn create_learned_grid(
    anchors: &AnchorMap,
    corner_a: Coordinate,
    corner_b: Coordinate,
    params: &GridParams,
) -> GridDefinition {
    create_learned_grid_with_config(anchors, corner_a, corner_b, params, &GridConfig::default())
}

pub fn create_learned_grid_with_config(
    anchors: &AnchorMap,
    corner_a: Coordinate,
    corner_b: Coordinate,
    params: &GridParams,
    config: &GridConfig,
) -> GridDefinition {
    let geometric = calculator::create_from_corners(corner_a, corner_b, params);
    let relevant = anchors_in_range(anchors, params.start_number, params.end_number);

    let range_size = (params.end_number + 1).saturating_sub(params.start_number);
    let threshold = config.dense_anchor_threshold(range_size);
    if relevant.is_empty() || relevant.len() < threshold {
        debug!(
            panel = %params.panel_id,
            anchors = relevant.len(),
            threshold,
            "too few anchors for a learned box, using corners"
        );
        return geometric;
    }

    let Some((min, max)) = anchor_extent(&relevant) else {
        return geometric;
    };
    let pad = |low: i32, high: i32| {
        let extent = i64::from(high) - i64::from(low);
        (extent as f64 * config.anchor_padding_ratio).round() as i64
    };
    let (pad_x, pad_y) = (pad(min.x, max.x), pad(min.y, max.y));

    let (user_tl, user_br) = normalize_corners(corner_a, corner_b);
    let reach = i64::from(config.max_overreach);
    let top_left = Coordinate::new(
        saturate((i64::from(min.x) - pad_x).max(i64::from(user_tl.x) - reach)),
        saturate((i64::from(min.y) - pad_y).max(i64::from(user_tl.y) - reach)),
    );
    let bottom_right = Coordinate::new(
        saturate((i64::from(max.x) + pad_x).min(i64::from(user_br.x) + reach)),
        saturate((i64::from(max.y) + pad_y).min(i64::from(user_br.y) + reach)),
    );

    let learned = params.to_definition(top_left, bottom_right);
    if !learned.is_valid() {
        debug!(
            panel = %params.panel_id,
            "learned box is degenerate, using corners"
        );
        return geometric;
    }

    debug!(
        panel = %params.panel_id,
        anchors = relevant.len(),
        top_left = %top_left,
        bottom_right = %bottom_right,
        "fitted learned grid"
    );
    learned
}

/// Smallest (top-left, bottom-right) pair enclosing every anchor
fn anchor_extent(anchors: &AnchorMap) -> Option<(Coordinate, Coordinate)> {
    let mut points = anchors.values();
    let first = *points.next()?;
    Some(points.fold((first, first), |(min, max), p| {
        (
            Coordinate::new(min.x.min(p.x), min.y.min(p.y)),
            Coordinate::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

/// Positions for every number in the grid, honoring anchors exactly.
///
/// With fewer than three in-range anchors this is identical to
/// [`calculator::calculate_number_positions`]. Otherwise anchors are copied
/// verbatim and every other number is interpolated from anchors sharing its
/// row, then from anchors sharing its column, and finally placed by the
/// geometric formula.
pub fn calculate_optimized_positions(grid: &GridDefinition, anchors: &AnchorMap) -> PositionMap {
    calculate_optimized_positions_with_config(grid, anchors, &GridConfig::default())
}

pub fn calculate_optimized_positions_with_config(
    grid: &GridDefinition,
    anchors: &AnchorMap,
    config: &GridConfig,
) -> PositionMap {
    if !grid.is_valid() {
        return PositionMap::new();
    }

    let relevant = anchors_in_range(anchors, grid.start_number, grid.end_number);
    if relevant.len() < config.min_interpolation_anchors {
        debug!(
            panel = %grid.panel_id,
            anchors = relevant.len(),
            "too few anchors to interpolate, using geometry"
        );
        return calculator::calculate_number_positions(grid);
    }

    // Cell of each anchor, computed once
    let anchor_cells: Vec<(u32, u32, Coordinate)> = relevant
        .iter()
        .filter_map(|(&n, &pos)| {
            calculator::cell_for_number(grid, n).map(|(col, row)| (col, row, pos))
        })
        .collect();

    let mut positions = relevant.clone();
    let mut interpolated = 0usize;
    for number in grid.start_number..=grid.end_number {
        if positions.contains_key(&number) {
            continue;
        }
        let Some((column, row)) = calculator::cell_for_number(grid, number) else {
            continue;
        };

        let same_row: Vec<(u32, Coordinate)> = anchor_cells
            .iter()
            .filter(|(_, r, _)| *r == row)
            .map(|&(c, _, pos)| (c, pos))
            .collect();
        let position = if same_row.len() >= 2 {
            interpolated += 1;
            Some(interpolate_along(same_row, column, |p| p.x))
        } else {
            let same_column: Vec<(u32, Coordinate)> = anchor_cells
                .iter()
                .filter(|(c, _, _)| *c == column)
                .map(|&(_, r, pos)| (r, pos))
                .collect();
            if same_column.len() >= 2 {
                interpolated += 1;
                Some(interpolate_along(same_column, row, |p| p.y))
            } else {
                calculator::position_for_number(grid, number)
            }
        };

        if let Some(position) = position {
            positions.insert(number, position);
        }
    }

    debug!(
        panel = %grid.panel_id,
        anchors = relevant.len(),
        interpolated,
        "computed hybrid positions"
    );
    positions
}

/// Linear interpolation of a cell index along a line of anchors.
///
/// `samples` pairs each anchor's cell index (column or row) with its pixel
/// position; they are ordered by `axis`. Targets outside the anchored span
/// are extrapolated from the nearest pair.
fn interpolate_along(
    mut samples: Vec<(u32, Coordinate)>,
    target: u32,
    axis: fn(&Coordinate) -> i32,
) -> Coordinate {
    samples.sort_by_key(|(_, pos)| axis(pos));

    let bracket = samples.windows(2).position(|pair| {
        let (a, b) = (pair[0].0, pair[1].0);
        a.min(b) <= target && target <= a.max(b)
    });
    let start = match bracket {
        Some(i) => i,
        None => {
            let first = samples[0].0;
            let last = samples[samples.len() - 1].0;
            if first.abs_diff(target) <= last.abs_diff(target) {
                0
            } else {
                samples.len() - 2
            }
        }
    };

    let (index_a, pos_a) = samples[start];
    let (index_b, pos_b) = samples[start + 1];
    if index_a == index_b {
        return pos_a;
    }

    let t = (target as f64 - index_a as f64) / (index_b as f64 - index_a as f64);
    // `as` saturates at the i32 bounds
    let lerp = |a: i32, b: i32| (f64::from(a) + t * (f64::from(b) - f64::from(a))).round() as i32;
    Coordinate::new(lerp(pos_a.x, pos_b.x), lerp(pos_a.y, pos_b.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::calculator::calculate_number_positions;
    use crate::grid::types::FillOrder;

    fn anchors(points: &[(u32, i32, i32)]) -> AnchorMap {
        points
            .iter()
            .map(|&(n, x, y)| (n, Coordinate::new(x, y)))
            .collect()
    }

    fn row_grid() -> GridDefinition {
        // 5x2 cells of 20x20
        GridDefinition::new(
            Coordinate::new(0, 0),
            Coordinate::new(100, 40),
            5,
            2,
            1,
            10,
            FillOrder::RowLeftToRight,
            "rows",
        )
    }

    #[test]
    fn test_anchors_in_range() {
        let all = anchors(&[(1, 0, 0), (5, 0, 0), (60, 0, 0)]);
        let filtered = anchors_in_range(&all, 2, 54);
        assert_eq!(filtered.keys().copied().collect::<Vec<_>>(), vec![5]);
        assert!(anchors_in_range(&all, 10, 2).is_empty());
    }

    #[test]
    fn test_row_interpolation() {
        let grid = row_grid();
        let known = anchors(&[(1, 12, 10), (3, 52, 12), (5, 92, 14)]);
        let positions = calculate_optimized_positions(&grid, &known);

        assert_eq!(positions.len(), 10);
        assert_eq!(positions[&2], Coordinate::new(32, 11));
        assert_eq!(positions[&4], Coordinate::new(72, 13));
        // Second row has no anchors on either axis
        assert_eq!(positions[&6], Coordinate::new(10, 30));
    }

    #[test]
    fn test_row_extrapolation() {
        let grid = row_grid();
        let known = anchors(&[(1, 10, 10), (2, 31, 10), (3, 52, 10)]);
        let positions = calculate_optimized_positions(&grid, &known);
        assert_eq!(positions[&5], Coordinate::new(94, 10));
    }

    #[test]
    fn test_column_interpolation() {
        // 2x5 cells of 20x20
        let grid = GridDefinition::new(
            Coordinate::new(0, 0),
            Coordinate::new(40, 100),
            2,
            5,
            1,
            10,
            FillOrder::ColumnTopToBottom,
            "cols",
        );
        let known = anchors(&[(1, 11, 10), (5, 11, 90), (6, 30, 10)]);
        let positions = calculate_optimized_positions(&grid, &known);

        assert_eq!(positions[&2], Coordinate::new(11, 30));
        assert_eq!(positions[&3], Coordinate::new(11, 50));
        assert_eq!(positions[&7], Coordinate::new(30, 30));
        assert_eq!(positions[&10], Coordinate::new(30, 90));
    }

    #[test]
    fn test_anchors_are_never_overwritten() {
        let grid = row_grid();
        let known = anchors(&[(1, 3, 4), (2, 77, 1), (7, 50, 50), (9, 1, 39)]);
        let positions = calculate_optimized_positions(&grid, &known);
        for (n, pos) in &known {
            assert_eq!(positions[n], *pos);
        }
    }

    #[test]
    fn test_few_anchors_fall_back_to_geometry() {
        let grid = row_grid();
        let known = anchors(&[(1, 3, 4), (2, 77, 1), (99, 0, 0)]);
        assert_eq!(
            calculate_optimized_positions(&grid, &known),
            calculate_number_positions(&grid)
        );
    }

    fn params() -> GridParams {
        GridParams::new("A", 5, 10, 1, 50, FillOrder::ColumnBottomToTop)
    }

    #[test]
    fn test_sparse_anchors_keep_corners() {
        let known = anchors(&[(1, 15, 195), (2, 15, 175)]);
        let learned = create_learned_grid(
            &known,
            Coordinate::new(100, 200),
            Coordinate::new(0, 0),
            &params(),
        );
        assert_eq!(learned.top_left, Coordinate::new(0, 0));
        assert_eq!(learned.bottom_right, Coordinate::new(100, 200));
    }

    #[test]
    fn test_dense_anchors_fit_box() {
        let base = calculator::create_from_corners(
            Coordinate::new(0, 0),
            Coordinate::new(100, 200),
            &params(),
        );
        let shifted: AnchorMap = calculate_number_positions(&base)
            .into_iter()
            .map(|(n, p)| (n, Coordinate::new(p.x + 5, p.y + 5)))
            .collect();

        let learned = create_learned_grid(
            &shifted,
            Coordinate::new(0, 0),
            Coordinate::new(100, 200),
            &params(),
        );
        assert_eq!(learned.top_left, Coordinate::new(7, -3));
        assert_eq!(learned.bottom_right, Coordinate::new(103, 213));
    }

    #[test]
    fn test_learned_box_is_clamped() {
        let known: AnchorMap = (1..=11)
            .map(|n| {
                let step = n as i32 - 1;
                (n, Coordinate::new(-200 + step * 50, -100 + step * 40))
            })
            .collect();
        let learned = create_learned_grid(
            &known,
            Coordinate::new(0, 0),
            Coordinate::new(100, 200),
            &params(),
        );
        assert_eq!(learned.top_left, Coordinate::new(-50, -50));
        assert_eq!(learned.bottom_right, Coordinate::new(150, 250));
    }

    #[test]
    fn test_extreme_anchor_extent() {
        let known: AnchorMap = (1..=10)
            .map(|n| {
                let x = if n % 2 == 0 { 2_000_000_000 } else { -2_000_000_000 };
                (n, Coordinate::new(x, n as i32 * 10))
            })
            .collect();
        let learned = create_learned_grid(
            &known,
            Coordinate::new(0, 0),
            Coordinate::new(100, 200),
            &params(),
        );
        assert_eq!(learned.top_left, Coordinate::new(-50, 1));
        assert_eq!(learned.bottom_right, Coordinate::new(150, 109));

        let positions = calculate_optimized_positions(&learned, &known);
        assert_eq!(positions.len(), 50);
        for (n, pos) in &known {
            assert_eq!(positions[n], *pos);
        }
    }

    #[test]
    fn test_anchors_at_i32_bounds() {
        let known = anchors(&[(1, i32::MIN, 10), (2, i32::MAX, 10), (3, 0, 10)]);
        let positions = calculate_optimized_positions(&row_grid(), &known);
        assert_eq!(positions[&4], Coordinate::new(i32::MIN + 1, 10));
        assert_eq!(positions[&5], Coordinate::new(i32::MIN, 10));

        let corners = (Coordinate::new(i32::MIN, 0), Coordinate::new(i32::MAX, 200));
        let spread: AnchorMap = (1..=10)
            .map(|n| {
                let x = if n % 2 == 0 { i32::MAX } else { i32::MIN };
                (n, Coordinate::new(x, n as i32 * 10))
            })
            .collect();
        let learned = create_learned_grid(&spread, corners.0, corners.1, &params());
        assert!(!learned.is_valid());
        assert!(calculate_optimized_positions(&learned, &spread).is_empty());
    }

    #[test]
    fn test_degenerate_anchor_box_falls_back() {
        let known: AnchorMap = (1..=10).map(|n| (n, Coordinate::new(40, n as i32 * 10))).collect();
        let learned = create_learned_grid(
            &known,
            Coordinate::new(0, 0),
            Coordinate::new(100, 200),
            &params(),
        );
        assert_eq!(learned.top_left, Coordinate::new(0, 0));
        assert_eq!(learned.bottom_right, Coordinate::new(100, 200));
    }
}
