//! Configuration for grid calculation and anchor interpolation

/// Tunable ratios and thresholds for grid calculation
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Marks larger than this fraction of a cell dimension overlap their neighbours
    pub mark_overlap_ratio: f64,

    /// Fraction of the cell size suggested for marks
    pub suggested_mark_ratio: f64,

    /// Smallest suggested mark size per axis, in pixels
    pub min_mark_size: i32,

    /// Anchor count above which the anchor set is always dense enough to fit a box
    pub dense_anchor_cap: usize,

    /// Padding added around the anchor bounding box, as a fraction of its size
    pub anchor_padding_ratio: f64,

    /// How far a learned box may extend past the user-supplied corners, in pixels
    pub max_overreach: i32,

    /// Fewest in-range anchors needed before interpolation replaces geometry
    pub min_interpolation_anchors: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            mark_overlap_ratio: 0.9,
            suggested_mark_ratio: 0.8,
            min_mark_size: 10,
            dense_anchor_cap: 10,
            anchor_padding_ratio: 0.1,
            max_overreach: 50,
            min_interpolation_anchors: 3,
        }
    }
}

impl GridConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlap ratio for marks
    pub fn with_mark_overlap_ratio(mut self, ratio: f64) -> Self {
        self.mark_overlap_ratio = ratio;
        self
    }

    /// Set the suggested mark ratio and the per-axis minimum
    pub fn with_suggested_mark(mut self, ratio: f64, min_size: i32) -> Self {
        self.suggested_mark_ratio = ratio;
        self.min_mark_size = min_size;
        self
    }

    /// Set the anchor box padding ratio
    pub fn with_anchor_padding(mut self, ratio: f64) -> Self {
        self.anchor_padding_ratio = ratio;
        self
    }

    /// Set the maximum overreach of a learned box past the corners
    pub fn with_max_overreach(mut self, pixels: i32) -> Self {
        self.max_overreach = pixels;
        self
    }

    /// Set the minimum anchor count for interpolation
    pub fn with_min_interpolation_anchors(mut self, count: usize) -> Self {
        self.min_interpolation_anchors = count;
        self
    }

    /// Anchor count required before a learned box is fitted for a range of `range_size` numbers
    pub fn dense_anchor_threshold(&self, range_size: u32) -> usize {
        self.dense_anchor_cap.min(range_size as usize / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.mark_overlap_ratio, 0.9);
        assert_eq!(config.suggested_mark_ratio, 0.8);
        assert_eq!(config.min_mark_size, 10);
        assert_eq!(config.dense_anchor_cap, 10);
        assert_eq!(config.anchor_padding_ratio, 0.1);
        assert_eq!(config.max_overreach, 50);
        assert_eq!(config.min_interpolation_anchors, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GridConfig::new()
            .with_max_overreach(20)
            .with_min_interpolation_anchors(5);

        assert_eq!(config.max_overreach, 20);
        assert_eq!(config.min_interpolation_anchors, 5);
    }

    #[test]
    fn test_dense_anchor_threshold() {
        let config = GridConfig::default();
        assert_eq!(config.dense_anchor_threshold(54), 10);
        assert_eq!(config.dense_anchor_threshold(10), 5);
        assert_eq!(config.dense_anchor_threshold(1), 0);
    }
}
