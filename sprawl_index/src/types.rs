// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boxes and the scalar arithmetic the quadtree needs.

use core::fmt::Debug;

/// Arithmetic needed to measure boxes and split them into quadrants.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// The additive identity.
    const ZERO: Self;

    /// `a + b`, saturating for integers.
    fn add(a: Self, b: Self) -> Self;

    /// `a - b`, saturating for integers.
    fn sub(a: Self, b: Self) -> Self;

    /// The value halfway between `a` and `b`, without intermediate overflow.
    fn mid(a: Self, b: Self) -> Self;

    /// The smaller of the two; `a` when they are unordered.
    #[inline]
    fn min(a: Self, b: Self) -> Self {
        if b < a { b } else { a }
    }

    /// The larger of the two; `a` when they are unordered.
    #[inline]
    fn max(a: Self, b: Self) -> Self {
        if b > a { b } else { a }
    }
}

macro_rules! float_scalar {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ZERO: Self = 0.0;

            #[inline]
            fn add(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline]
            fn sub(a: Self, b: Self) -> Self {
                a - b
            }

            #[inline]
            fn mid(a: Self, b: Self) -> Self {
                a + (b - a) * 0.5
            }
        }
    )*};
}

float_scalar!(f32, f64);

impl Scalar for i64 {
    const ZERO: Self = 0;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Shared bits plus half the differing ones; rounds towards negative infinity.
        (a & b) + ((a ^ b) >> 1)
    }
}

/// An axis-aligned box, `min` corner to `max` corner, edges included.
///
/// With the y axis pointing down, `min_y` is the top edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Left edge.
    pub min_x: T,
    /// Top edge.
    pub min_y: T,
    /// Right edge.
    pub max_x: T,
    /// Bottom edge.
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// A box from its edges.
    #[inline]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// A box from its top-left corner and its size.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self::new(x, y, T::add(x, w), T::add(y, h))
    }

    /// The smallest box holding every point, or `None` for no points.
    ///
    /// ```
    /// use sprawl_index::Aabb2D;
    ///
    /// let b = Aabb2D::from_points([(3.0, -1.0), (-2.0, 4.0), (0.0, 0.0)]);
    /// assert_eq!(b, Some(Aabb2D::new(-2.0, -1.0, 3.0, 4.0)));
    /// ```
    pub fn from_points<I: IntoIterator<Item = (T, T)>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;
        Some(points.fold(Self::new(x, y, x, y), |b, (x, y)| {
            Self::new(
                T::min(b.min_x, x),
                T::min(b.min_y, y),
                T::max(b.max_x, x),
                T::max(b.max_y, y),
            )
        }))
    }

    /// Horizontal size; zero for inverted boxes.
    #[inline]
    pub fn width(&self) -> T {
        T::max(T::sub(self.max_x, self.min_x), T::ZERO)
    }

    /// Vertical size; zero for inverted boxes.
    #[inline]
    pub fn height(&self) -> T {
        T::max(T::sub(self.max_y, self.min_y), T::ZERO)
    }

    /// Whether the box has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.max_x > self.min_x && self.max_y > self.min_y)
    }

    /// The x of the vertical midline and the y of the horizontal midline.
    #[inline]
    pub fn midpoint(&self) -> (T, T) {
        (T::mid(self.min_x, self.max_x), T::mid(self.min_y, self.max_y))
    }

    /// Whether `(x, y)` lies inside or on the boundary.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.contains_point(other.min_x, other.min_y) && self.contains_point(other.max_x, other.max_y)
    }

    /// Whether the two boxes share at least one point. Touching edges count.
    ///
    /// ```
    /// use sprawl_index::Aabb2D;
    ///
    /// let road = Aabb2D::new(0.0, -8.0, 400.0, 8.0);
    /// assert!(road.overlaps(&Aabb2D::new(400.0, 0.0, 700.0, 0.0)));
    /// assert!(!road.overlaps(&Aabb2D::new(401.0, 0.0, 700.0, 0.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    /// The smallest box holding both.
    #[inline]
    pub fn union(&self, other: Self) -> Self {
        Self::new(
            T::min(self.min_x, other.min_x),
            T::min(self.min_y, other.min_y),
            T::max(self.max_x, other.max_x),
            T::max(self.max_y, other.max_y),
        )
    }
}
