// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision shapes with a revision-tagged AABB cache.

use core::cell::Cell;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Circle, Point, Vec2};
use sprawl_index::Aabb2D;

use crate::kernel::{line_corners, rect_circle_intersection, rect_rect_intersection};

/// A straight segment with a width.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThickLine {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
    /// Full width across the centerline.
    pub width: f64,
}

impl ThickLine {
    /// Create a thick line.
    pub const fn new(start: Point, end: Point, width: f64) -> Self {
        Self { start, end, width }
    }

    /// Whether both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Corners of the covered rectangle; see [`line_corners`].
    pub fn corners(&self) -> [Point; 4] {
        line_corners(self.start, self.end, self.width)
    }
}

/// Geometry of a collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// An arbitrary rectangle given as four corners in winding order.
    Rectangle([Point; 4]),
    /// A thick straight segment.
    Line(ThickLine),
    /// A disk.
    Circle(Circle),
}

impl Shape {
    /// Axis-aligned bounds of the shape.
    ///
    /// Lines are bounded by their endpoints only; the width is ignored.
    pub fn aabb(&self) -> Aabb2D<f64> {
        match self {
            Self::Rectangle(corners) => corners_aabb(corners),
            Self::Line(line) => Aabb2D::new(
                line.start.x.min(line.end.x),
                line.start.y.min(line.end.y),
                line.start.x.max(line.end.x),
                line.start.y.max(line.end.y),
            ),
            Self::Circle(circle) => {
                let Circle { center, radius } = *circle;
                Aabb2D::new(
                    center.x - radius,
                    center.y - radius,
                    center.x + radius,
                    center.y + radius,
                )
            }
        }
    }

    /// Narrow-phase test against another shape.
    ///
    /// Returns the translation that moves `self` out of `other`. Tests that
    /// involve a rectangle-like shape and a circle only detect contact and
    /// report a zero offset. Degenerate lines collide with nothing.
    pub fn collide(&self, other: &Self) -> Option<Vec2> {
        use Shape::{Circle as C, Line as L, Rectangle as R};
        match (self, other) {
            (L(line), _) | (_, L(line)) if line.is_degenerate() => None,
            (R(a), R(b)) => rect_rect_intersection(a, b),
            (R(a), L(b)) => rect_rect_intersection(a, &b.corners()),
            (L(a), R(b)) => rect_rect_intersection(&a.corners(), b),
            (L(a), L(b)) => rect_rect_intersection(&a.corners(), &b.corners()),
            (R(corners), C(circle)) | (C(circle), R(corners)) => {
                rect_circle_intersection(corners, circle.center, circle.radius)
                    .then_some(Vec2::ZERO)
            }
            (L(line), C(circle)) | (C(circle), L(line)) => {
                rect_circle_intersection(&line.corners(), circle.center, circle.radius)
                    .then_some(Vec2::ZERO)
            }
            (C(a), C(b)) => circle_circle(a, b),
        }
    }
}

fn corners_aabb(corners: &[Point; 4]) -> Aabb2D<f64> {
    let first = Aabb2D::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
    corners[1..]
        .iter()
        .fold(first, |acc, c| acc.union(Aabb2D::new(c.x, c.y, c.x, c.y)))
}

fn circle_circle(a: &Circle, b: &Circle) -> Option<Vec2> {
    if a.radius <= 0.0 || b.radius <= 0.0 {
        return None;
    }
    let between = a.center - b.center;
    let distance = between.hypot();
    let reach = a.radius + b.radius;
    if distance >= reach {
        return None;
    }
    let push = reach - distance;
    if distance == 0.0 {
        Some(Vec2::new(0.0, push))
    } else {
        Some(between * (push / distance))
    }
}

/// A [`Shape`] that tracks its own revision.
///
/// Every mutator bumps the revision; the AABB is rebuilt lazily the first time
/// it is read at a new revision.
#[derive(Clone, Debug)]
pub struct Collider {
    shape: Shape,
    revision: u64,
    aabb: Cell<Option<(u64, Aabb2D<f64>)>>,
}

impl Collider {
    /// Wrap a shape at revision zero.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            revision: 0,
            aabb: Cell::new(None),
        }
    }

    /// Convenience constructor for a [`Shape::Line`].
    pub fn line(start: Point, end: Point, width: f64) -> Self {
        Self::new(Shape::Line(ThickLine::new(start, end, width)))
    }

    /// The current shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The line geometry, when this collider is a line.
    pub fn as_line(&self) -> Option<&ThickLine> {
        match &self.shape {
            Shape::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Axis-aligned bounds, cached per revision.
    pub fn aabb(&self) -> Aabb2D<f64> {
        match self.aabb.get() {
            Some((revision, aabb)) if revision == self.revision => aabb,
            _ => {
                let aabb = self.shape.aabb();
                self.aabb.set(Some((self.revision, aabb)));
                aabb
            }
        }
    }

    /// Replace the shape.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.revision += 1;
    }

    fn edit_line(&mut self, f: impl FnOnce(&mut ThickLine)) {
        if let Shape::Line(line) = &mut self.shape {
            f(line);
            self.revision += 1;
        }
    }

    /// Move the start of a line. Other shapes are left untouched.
    pub fn set_start(&mut self, start: Point) {
        self.edit_line(|line| line.start = start);
    }

    /// Move the end of a line. Other shapes are left untouched.
    pub fn set_end(&mut self, end: Point) {
        self.edit_line(|line| line.end = end);
    }

    /// Change the width of a line. Other shapes are left untouched.
    pub fn set_width(&mut self, width: f64) {
        self.edit_line(|line| line.width = width);
    }

    /// Replace the corners of a rectangle. Other shapes are left untouched.
    pub fn set_corners(&mut self, corners: [Point; 4]) {
        if let Shape::Rectangle(c) = &mut self.shape {
            *c = corners;
            self.revision += 1;
        }
    }

    /// Move the center of a circle. Other shapes are left untouched.
    pub fn set_center(&mut self, center: Point) {
        if let Shape::Circle(circle) = &mut self.shape {
            circle.center = center;
            self.revision += 1;
        }
    }

    /// Change the radius of a circle. Other shapes are left untouched.
    pub fn set_radius(&mut self, radius: f64) {
        if let Shape::Circle(circle) = &mut self.shape {
            circle.radius = radius;
            self.revision += 1;
        }
    }
}

/// Anything that owns a [`Collider`].
///
/// Road segments implement this, and so can any external entity (buildings,
/// props) that needs to share the spatial index with them.
pub trait Collidable {
    /// The collider describing this entity.
    fn collider(&self) -> &Collider;

    /// Cached axis-aligned bounds of the collider.
    fn aabb(&self) -> Aabb2D<f64> {
        self.collider().aabb()
    }

    /// Narrow-phase test; see [`Shape::collide`].
    fn collide<C: Collidable + ?Sized>(&self, other: &C) -> Option<Vec2> {
        self.collider().shape().collide(other.collider().shape())
    }
}

impl Collidable for Collider {
    fn collider(&self) -> &Collider {
        self
    }
}
