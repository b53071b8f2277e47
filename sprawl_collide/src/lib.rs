// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry and collision kernel for road networks.
//!
//! This crate provides the narrow phase used when growing a road network,
//! built on top of [`kurbo`]. Broad-phase culling is left to a spatial index
//! such as `sprawl_index`.
//!
//! # Key pieces
//!
//! - [`line_segment_intersection`] – proper crossings of two segments, with
//!   the parameter along the first one for "nearest crossing" decisions.
//! - [`rect_rect_intersection`] and [`rect_circle_intersection`] – separating
//!   axis and disk tests over rectangles given as four corners.
//! - [`arm_points`] – miter offset points at a polyline joint, for mesh
//!   builders that widen road centerlines.
//! - [`Shape`], [`Collider`] and the [`Collidable`] trait – shapes with a
//!   revision-tagged AABB cache, and the seam through which road segments and
//!   external entities share one spatial index.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use sprawl_collide::{Collidable, Collider};
//!
//! let road = Collider::line(Point::new(0.0, 0.0), Point::new(400.0, 0.0), 16.0);
//! let crossing = Collider::line(Point::new(200.0, -150.0), Point::new(200.0, 150.0), 6.0);
//! assert!(road.collide(&crossing).is_some());
//! assert_eq!(road.aabb().max_x, 400.0);
//! ```

#![no_std]

mod collider;
mod kernel;

pub use collider::{Collidable, Collider, Shape, ThickLine};
pub use kernel::{
    EPSILON, HomogeneousLine, SegmentCrossing, arm_points, line_corners, line_line_intersection,
    line_segment_intersection, oriented_rect_corners, project, rect_circle_intersection,
    rect_rect_intersection,
};
