// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growth tuning parameters.

use kurbo::Rect;

use crate::types::RoadClass;

/// Tuning of a growth run.
///
/// The defaults grow a few hundred segments around the origin. Angles are in
/// degrees. The generator does not validate its configuration; call
/// [`GrowthConfig::validate`] on values that come from outside.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthConfig {
    /// Region covered by the root quadtree node. Segments may grow past it.
    pub world_bounds: Rect,
    /// Entries a quadtree node holds before it splits.
    pub quadtree_max_objects: usize,
    /// Deepest quadtree level.
    pub quadtree_max_levels: u32,
    /// Length of street segments.
    pub street_segment_length: f64,
    /// Length of highway segments.
    pub highway_segment_length: f64,
    /// Width of street segments.
    pub street_segment_width: f64,
    /// Width of highway segments.
    pub highway_segment_width: f64,
    /// Generation stops once this many segments are accepted.
    pub segment_count_limit: usize,
    /// Generation stops after this many dequeues.
    pub derivation_step_limit: usize,
    /// Chance of each street branch draw.
    pub street_branch_probability: f64,
    /// Chance of each highway branch draw.
    pub highway_branch_probability: f64,
    /// Density above which streets continue and branch.
    pub street_branch_population_threshold: f64,
    /// Density above which highways branch.
    pub highway_branch_population_threshold: f64,
    /// Extra priority steps before a street branching off a highway is grown.
    pub street_branch_delay_from_highway: u32,
    /// Smallest angle between two roads that may cross.
    pub min_intersection_deviation: f64,
    /// Radius within which segment ends are joined.
    pub snap_distance: f64,
    /// Largest random deviation of a branch from the perpendicular.
    pub branch_angle_deviation: f64,
    /// Largest random deviation of a highway continuation.
    pub forward_angle_deviation: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            world_bounds: Rect::new(-20_000.0, -20_000.0, 20_000.0, 20_000.0),
            quadtree_max_objects: 10,
            quadtree_max_levels: 10,
            street_segment_length: 300.0,
            highway_segment_length: 400.0,
            street_segment_width: 6.0,
            highway_segment_width: 16.0,
            segment_count_limit: 500,
            derivation_step_limit: 10_000,
            street_branch_probability: 0.4,
            highway_branch_probability: 0.05,
            street_branch_population_threshold: 0.1,
            highway_branch_population_threshold: 0.1,
            street_branch_delay_from_highway: 5,
            min_intersection_deviation: 30.0,
            snap_distance: 50.0,
            branch_angle_deviation: 3.0,
            forward_angle_deviation: 15.0,
        }
    }
}

/// A [`GrowthConfig`] rule that does not hold.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A segment length is zero, negative or not a number.
    #[error("{field} must be positive, got {value}")]
    NonPositiveLength {
        /// Name of the offending field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A segment width is zero, negative or not a number.
    #[error("{field} must be positive, got {value}")]
    NonPositiveWidth {
        /// Name of the offending field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The snap distance is zero, negative or not a number.
    #[error("snap_distance must be positive, got {0}")]
    NonPositiveSnapDistance(f64),
    /// A probability or population threshold lies outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange {
        /// Name of the offending field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// An angle deviation is negative or not a number.
    #[error("{field} must not be negative, got {value}")]
    NegativeAngleDeviation {
        /// Name of the offending field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The minimum intersection deviation lies outside `[0, 90]` degrees.
    #[error("min_intersection_deviation must be within [0, 90] degrees, got {0}")]
    IntersectionDeviationOutOfRange(f64),
    /// The world bounds have no area.
    #[error("world_bounds must have a positive area, got {0:?}")]
    EmptyWorldBounds(Rect),
    /// A count limit is zero.
    #[error("{0} must be non-zero")]
    ZeroLimit(&'static str),
}

impl GrowthConfig {
    /// Length of new segments of `class`.
    pub fn segment_length(&self, class: RoadClass) -> f64 {
        match class {
            RoadClass::Highway => self.highway_segment_length,
            RoadClass::Street => self.street_segment_length,
        }
    }

    /// Width of segments of `class`.
    pub fn segment_width(&self, class: RoadClass) -> f64 {
        match class {
            RoadClass::Highway => self.highway_segment_width,
            RoadClass::Street => self.street_segment_width,
        }
    }

    /// Check every rule, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("street_segment_length", self.street_segment_length),
            ("highway_segment_length", self.highway_segment_length),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::NonPositiveLength { field, value });
            }
        }
        for (field, value) in [
            ("street_segment_width", self.street_segment_width),
            ("highway_segment_width", self.highway_segment_width),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::NonPositiveWidth { field, value });
            }
        }
        if !is_positive(self.snap_distance) {
            return Err(ConfigError::NonPositiveSnapDistance(self.snap_distance));
        }
        for (field, value) in [
            ("street_branch_probability", self.street_branch_probability),
            ("highway_branch_probability", self.highway_branch_probability),
            (
                "street_branch_population_threshold",
                self.street_branch_population_threshold,
            ),
            (
                "highway_branch_population_threshold",
                self.highway_branch_population_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }
        for (field, value) in [
            ("branch_angle_deviation", self.branch_angle_deviation),
            ("forward_angle_deviation", self.forward_angle_deviation),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeAngleDeviation { field, value });
            }
        }
        if !(0.0..=90.0).contains(&self.min_intersection_deviation) {
            return Err(ConfigError::IntersectionDeviationOutOfRange(
                self.min_intersection_deviation,
            ));
        }
        if !(is_positive(self.world_bounds.width()) && is_positive(self.world_bounds.height())) {
            return Err(ConfigError::EmptyWorldBounds(self.world_bounds));
        }
        if self.segment_count_limit == 0 {
            return Err(ConfigError::ZeroLimit("segment_count_limit"));
        }
        if self.derivation_step_limit == 0 {
            return Err(ConfigError::ZeroLimit("derivation_step_limit"));
        }
        if self.quadtree_max_objects == 0 {
            return Err(ConfigError::ZeroLimit("quadtree_max_objects"));
        }
        Ok(())
    }
}

/// False for NaN.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GrowthConfig::default().validate(), Ok(()));
    }

    #[test]
    fn reports_first_violation() {
        let config = GrowthConfig {
            highway_segment_length: 0.0,
            snap_distance: -1.0,
            ..GrowthConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveLength {
                field: "highway_segment_length",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        let probability = GrowthConfig {
            street_branch_probability: 1.5,
            ..GrowthConfig::default()
        };
        let err = probability.validate().expect_err("probability above one");
        assert_eq!(
            err.to_string(),
            "street_branch_probability must be within [0, 1], got 1.5"
        );

        let nan = GrowthConfig {
            street_segment_width: f64::NAN,
            ..GrowthConfig::default()
        };
        assert!(
            matches!(nan.validate(), Err(ConfigError::NonPositiveWidth { .. })),
            "NaN widths are rejected"
        );

        let deviation = GrowthConfig {
            min_intersection_deviation: 120.0,
            ..GrowthConfig::default()
        };
        assert_eq!(
            deviation.validate(),
            Err(ConfigError::IntersectionDeviationOutOfRange(120.0))
        );

        let bounds = GrowthConfig {
            world_bounds: Rect::new(0.0, 0.0, 0.0, 10.0),
            ..GrowthConfig::default()
        };
        assert!(
            matches!(bounds.validate(), Err(ConfigError::EmptyWorldBounds(_))),
            "zero-width bounds are rejected"
        );

        let limit = GrowthConfig {
            derivation_step_limit: 0,
            ..GrowthConfig::default()
        };
        assert_eq!(
            limit.validate(),
            Err(ConfigError::ZeroLimit("derivation_step_limit"))
        );
    }

    #[test]
    fn class_lookups() {
        let config = GrowthConfig::default();
        assert_eq!(config.segment_length(RoadClass::Highway), 400.0);
        assert_eq!(config.segment_width(RoadClass::Street), 6.0);
    }
}
