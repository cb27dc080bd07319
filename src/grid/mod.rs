//! Panel grid geometry
//!
//! This module maps lottery numbers to pixel positions inside a rectangular
//! play panel, either purely from the panel's corners or refined by anchors.

pub mod calculator;
pub mod config;
pub mod interpolate;
pub mod types;

pub use calculator::{
    calculate_number_positions, column_for_number, create_from_corners, mark_fits_in_cell,
    numbers_in_column, numbers_in_row, position_for_number, row_for_number,
    suggest_optimal_mark_size, will_marks_overlap,
};
pub use config::GridConfig;
pub use interpolate::{calculate_optimized_positions, create_learned_grid};
pub use types::*;
