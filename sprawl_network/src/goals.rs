// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global goals: where a freshly accepted segment wants to grow next.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use rand::Rng;

use crate::config::GrowthConfig;
use crate::segment::Segment;
use crate::types::RoadClass;

/// Population density over the plane, in `[0, 1]`.
///
/// Any `Fn(f64, f64) -> f64` is a density field:
///
/// ```
/// use sprawl_network::DensityField;
///
/// let uniform = |_x: f64, _y: f64| 0.5;
/// assert_eq!(uniform.density(10.0, -3.0), 0.5);
/// ```
pub trait DensityField {
    /// Density at `(x, y)`.
    fn density(&self, x: f64, y: f64) -> f64;
}

impl<F: Fn(f64, f64) -> f64> DensityField for F {
    fn density(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Mean of the densities at both endpoints of `segment`.
pub fn road_density<D: DensityField + ?Sized>(field: &D, segment: &Segment) -> f64 {
    let (start, end) = (segment.start(), segment.end());
    (field.density(start.x, start.y) + field.density(end.x, end.y)) / 2.0
}

/// A random non-zero angle in `(-limit, limit)` that favours small values.
///
/// Candidates are drawn uniformly and rejected with probability
/// `|v|^3 / limit^3`. A non-positive limit yields 0 without drawing.
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R, limit: f64) -> f64 {
    if limit.is_nan() || limit <= 0.0 {
        return 0.0;
    }
    let norm = limit.powi(3);
    loop {
        let value = rng.random_range(-limit..limit);
        if value != 0.0 && rng.random::<f64>() >= value.abs().powi(3) / norm {
            return value;
        }
    }
}

/// A successor candidate together with its extra queue delay.
#[derive(Clone, Debug)]
pub struct Proposal {
    /// The detached candidate segment, starting at the parent's end.
    pub segment: Segment,
    /// Priority steps added on top of the parent's priority plus one.
    pub delay: u32,
}

fn toward(
    parent: &Segment,
    config: &GrowthConfig,
    direction: f64,
    length: f64,
    class: RoadClass,
) -> Segment {
    Segment::from_direction(
        parent.end(),
        direction,
        length,
        class,
        config.segment_width(class),
    )
}

/// Candidate successors of an accepted segment.
///
/// Severed segments propose nothing. Highways always continue, taking a
/// randomly deviated heading when it is strictly denser than straight ahead,
/// and may branch into a perpendicular highway. Streets continue only where
/// the density ahead exceeds the street threshold. Either class may then
/// spawn a perpendicular street, delayed when branching off a highway.
///
/// Random draws happen in a fixed order, so a seeded `rng` reproduces the
/// same proposals. The network is not touched.
pub fn propose_successors<D: DensityField + ?Sized, R: Rng + ?Sized>(
    parent: &Segment,
    config: &GrowthConfig,
    field: &D,
    rng: &mut R,
) -> Vec<Proposal> {
    let mut out = Vec::new();
    if parent.is_severed() {
        return out;
    }
    let direction = parent.direction();
    let length = parent.length();
    let class = parent.class();

    let straight = toward(parent, config, direction, length, class);
    let straight_density = road_density(field, &straight);

    if class.is_highway() {
        let deviated = toward(
            parent,
            config,
            direction + random_angle(rng, config.forward_angle_deviation),
            length,
            class,
        );
        let deviated_density = road_density(field, &deviated);
        let density = if deviated_density > straight_density {
            out.push(Proposal {
                segment: deviated,
                delay: 0,
            });
            deviated_density
        } else {
            out.push(Proposal {
                segment: straight,
                delay: 0,
            });
            straight_density
        };
        if density > config.highway_branch_population_threshold {
            let p = config.highway_branch_probability;
            let side = if rng.random::<f64>() < p {
                Some(-90.0)
            } else if rng.random::<f64>() < p {
                Some(90.0)
            } else {
                None
            };
            if let Some(side) = side {
                let heading = direction + side + random_angle(rng, config.branch_angle_deviation);
                out.push(Proposal {
                    segment: toward(parent, config, heading, length, class),
                    delay: 0,
                });
            }
        }
    } else if straight_density > config.street_branch_population_threshold {
        out.push(Proposal {
            segment: straight,
            delay: 0,
        });
    }

    if straight_density > config.street_branch_population_threshold {
        let p = config.street_branch_probability;
        let side = if rng.random::<f64>() < p {
            Some(-90.0)
        } else if rng.random::<f64>() < p {
            Some(90.0)
        } else {
            None
        };
        if let Some(side) = side {
            let heading = direction + side + random_angle(rng, config.branch_angle_deviation);
            let delay = if class.is_highway() {
                config.street_branch_delay_from_highway
            } else {
                0
            };
            out.push(Proposal {
                segment: toward(
                    parent,
                    config,
                    heading,
                    config.street_segment_length,
                    RoadClass::Street,
                ),
                delay,
            });
        }
    }
    out
}
