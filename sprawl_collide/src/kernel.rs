// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure geometry and collision functions.
//!
//! Rectangles are passed as four corners in winding order. The order produced
//! by [`line_corners`] and [`oriented_rect_corners`] is the one the SAT axes of
//! [`rect_rect_intersection`] are chosen for.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

/// Tolerance shared by the parametric and near-parallel tests.
pub const EPSILON: f64 = 0.001;

/// Squared length below which a vector is treated as zero.
const ZERO_LENGTH2: f64 = 1e-10;

/// A proper crossing of two line segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentCrossing {
    /// The crossing point.
    pub point: Point,
    /// Parameter of `point` along the first segment, in `(EPSILON, 1 - EPSILON)`.
    pub t: f64,
}

/// A line in the plane as `a * x + b * y + c = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HomogeneousLine {
    /// Coefficient of `x`.
    pub a: f64,
    /// Coefficient of `y`.
    pub b: f64,
    /// Constant term.
    pub c: f64,
}

impl HomogeneousLine {
    /// Create a line from its three coefficients.
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
}

/// Intersect segment `p1..p2` with segment `q1..q2`.
///
/// Only proper crossings count: both parameters must lie strictly inside
/// `(EPSILON, 1 - EPSILON)`, so segments that merely touch at an endpoint do
/// not intersect. Parallel and collinear segments never intersect.
///
/// ```
/// use kurbo::Point;
/// use sprawl_collide::line_segment_intersection;
///
/// let hit = line_segment_intersection(
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 2.0),
///     Point::new(0.0, 2.0),
///     Point::new(2.0, 0.0),
/// )
/// .unwrap();
/// assert_eq!(hit.point, Point::new(1.0, 1.0));
/// assert_eq!(hit.t, 0.5);
/// ```
pub fn line_segment_intersection(
    p1: Point,
    p2: Point,
    q1: Point,
    q2: Point,
) -> Option<SegmentCrossing> {
    let r = p2 - p1;
    let s = q2 - q1;
    let qp = q1 - p1;
    let num = qp.cross(r);
    let den = r.cross(s);
    if den == 0.0 {
        // Parallel, or collinear when `num` is zero as well.
        return None;
    }
    let u = num / den;
    let t = qp.cross(s) / den;
    let inside = |v: f64| v > EPSILON && v < 1.0 - EPSILON;
    if inside(t) && inside(u) {
        Some(SegmentCrossing {
            point: p1 + t * r,
            t,
        })
    } else {
        None
    }
}

/// Intersect two lines in homogeneous form.
///
/// Returns `None` when the lines are parallel.
pub fn line_line_intersection(l1: HomogeneousLine, l2: HomogeneousLine) -> Option<Vec2> {
    let det = l2.a * l1.b - l1.a * l2.b;
    if det == 0.0 {
        return None;
    }
    Some(Vec2::new(l2.b * l1.c - l1.b * l2.c, l1.a * l2.c - l2.a * l1.c) / det)
}

/// Vector projection of `v` onto `onto`; zero when `onto` has no length.
pub fn project(v: Vec2, onto: Vec2) -> Vec2 {
    let len2 = onto.hypot2();
    if len2 < ZERO_LENGTH2 {
        return Vec2::ZERO;
    }
    onto * (v.dot(onto) / len2)
}

fn normalized(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < 1e-5 { Vec2::ZERO } else { v / len }
}

/// Offset points of a thick polyline at the joint `joint` between the arms
/// towards `prev` and `next`.
///
/// Returns `(elbow, joint)`: the left and right points at distance
/// `width / 2` from both arm centerlines. Near-parallel arms fall back to the
/// averaged normal of the two arms (or their difference for a U-turn).
///
/// ```
/// use kurbo::Point;
/// use sprawl_collide::arm_points;
///
/// let (elbow, joint) = arm_points(
///     Point::new(2.0, 2.0),
///     Point::new(0.0, 0.0),
///     Point::new(-2.0, 2.0),
///     2_f64.sqrt(),
/// );
/// assert!((elbow - Point::new(0.0, -1.0)).hypot() < 1e-9);
/// assert!((joint - Point::new(0.0, 1.0)).hypot() < 1e-9);
/// ```
pub fn arm_points(prev: Point, joint: Point, next: Point, width: f64) -> (Point, Point) {
    let a0 = normalized(prev - joint);
    let a1 = normalized(next - joint);
    let r = 0.5 * width;
    let dot = a0.dot(a1);
    if dot.abs() < 1.0 - EPSILON {
        let left = line_line_intersection(
            HomogeneousLine::new(-a0.y, a0.x, r),
            HomogeneousLine::new(-a1.y, a1.x, -r),
        )
        .unwrap_or(Vec2::ZERO);
        let right = line_line_intersection(
            HomogeneousLine::new(-a0.y, a0.x, -r),
            HomogeneousLine::new(-a1.y, a1.x, r),
        )
        .unwrap_or(Vec2::ZERO);
        (joint + left, joint + right)
    } else {
        let n = if dot > EPSILON {
            normalized(Vec2::new(-a0.y - a1.y, a0.x + a1.x))
        } else {
            normalized(Vec2::new(-a0.y + a1.y, a0.x - a1.x))
        };
        (joint - r * n, joint + r * n)
    }
}

/// Corners of the rectangle covered by a segment of the given width.
///
/// The order is `start + n, start - n, end - n, end + n` where `n` is the
/// left half-width normal. A zero-length segment yields four copies of
/// `start`.
pub fn line_corners(start: Point, end: Point, width: f64) -> [Point; 4] {
    let direction = end - start;
    let perp = Vec2::new(-direction.y, direction.x);
    let len = perp.hypot();
    let n = if len > 0.0 {
        perp * (0.5 * width / len)
    } else {
        Vec2::ZERO
    };
    [start + n, start - n, end - n, end + n]
}

/// Corners of a rectangle rotated by `direction` (radians, 0 along +y).
///
/// `half_diagonal` is the distance from the center to every corner and
/// `aspect_angle` the angle between the diagonal and the heading; `PI / 4`
/// gives a square.
pub fn oriented_rect_corners(
    center: Point,
    direction: f64,
    half_diagonal: f64,
    aspect_angle: f64,
) -> [Point; 4] {
    let a0 = aspect_angle + direction;
    let a1 = direction - aspect_angle;
    let at = |angle: f64| {
        Point::new(
            center.x + half_diagonal * angle.sin(),
            center.y + half_diagonal * angle.cos(),
        )
    };
    [
        at(a0),
        at(a1),
        at(core::f64::consts::PI + a0),
        at(core::f64::consts::PI + a1),
    ]
}

/// Separating-axis test between two rectangles given as corners.
///
/// Returns the minimum translation vector that moves `corners0` out of
/// `corners1`, or `None` when they are separated. A degenerate rectangle
/// (zero-length axis) never intersects.
///
/// Swapping the arguments yields the opposite vector. Axes are compared up to
/// sign, and pushes of equal length are resolved by axis direction, so ties
/// do not depend on argument order. The one exception is two rectangles
/// centered on each other along the chosen axis: both orders then push along
/// the positive axis.
pub fn rect_rect_intersection(corners0: &[Point; 4], corners1: &[Point; 4]) -> Option<Vec2> {
    let edges = [
        corners0[3] - corners0[0],
        corners0[3] - corners0[2],
        corners1[0] - corners1[1],
        corners1[0] - corners1[3],
    ];
    let extent = |corners: &[Point; 4], axis: Vec2| {
        corners
            .iter()
            .map(|c| c.to_vec2().dot(axis))
            .fold((f64::MAX, -f64::MAX), |(lo, hi), p| (lo.min(p), hi.max(p)))
    };

    let mut pushes = [(0.0, Vec2::ZERO, Vec2::ZERO); 4];
    for (slot, edge) in pushes.iter_mut().zip(edges) {
        if edge.hypot2() < ZERO_LENGTH2 {
            return None;
        }
        let mut axis = edge / edge.hypot();
        if axis.x < 0.0 || (axis.x == 0.0 && axis.y < 0.0) {
            axis = -axis;
        }
        let (min_a, max_a) = extent(corners0, axis);
        let (min_b, max_b) = extent(corners1, axis);
        if max_a < min_b || max_b < min_a {
            return None;
        }
        let down = max_a - min_b;
        let up = max_b - min_a;
        let toward_up = if ties(down, up) {
            min_a + max_a >= min_b + max_b
        } else {
            up < down
        };
        *slot = if toward_up {
            (up, axis, axis * up)
        } else {
            (down, axis, axis * -down)
        };
    }

    let least = pushes.iter().map(|p| p.0).fold(f64::MAX, f64::min);
    pushes
        .iter()
        .filter(|p| ties(p.0, least))
        .min_by(|a, b| a.1.y.total_cmp(&b.1.y))
        .map(|p| p.2)
}

/// Whether two push lengths are equal up to rounding.
fn ties(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Whether a rectangle given as corners touches a circle.
///
/// Tests the corners, then the perpendicular feet on every edge, then whether
/// the center lies inside. A non-positive radius never intersects.
pub fn rect_circle_intersection(corners: &[Point; 4], center: Point, radius: f64) -> bool {
    if radius <= 0.0 {
        return false;
    }
    let r2 = radius * radius;
    if corners.iter().any(|c| (center - *c).hypot2() <= r2) {
        return true;
    }
    for i in 0..corners.len() {
        let start = corners[i];
        let end = corners[(i + 1) % corners.len()];
        let e0 = center - start;
        let e1 = end - start;
        let foot = project(e0, e1);
        let d2 = (center - (start + foot)).hypot2();
        let signed = if e0.dot(e1) < 0.0 { -1.0 } else { 1.0 } * foot.hypot2();
        if signed > 0.0 && signed < e1.hypot2() && d2 <= r2 {
            return true;
        }
    }
    let a0 = corners[3] - corners[0];
    let a1 = corners[3] - corners[2];
    let e0 = center - corners[0];
    let e1 = center - corners[2];
    !(e0.dot(a0) < 0.0
        || project(e0, a0).hypot2() > a0.hypot2()
        || e1.dot(a1) < 0.0
        || project(e1, a1).hypot2() > a1.hypot2())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn crossing_diagonals_meet_in_the_middle() {
        let hit = line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        )
        .expect("diagonals cross");
        assert_eq!(hit.point, Point::new(1.0, 1.0));
        assert_eq!(hit.t, 0.5);
    }

    #[test]
    fn touching_parallel_and_collinear_do_not_intersect() {
        let o = Point::ORIGIN;
        // Shared endpoint.
        assert!(
            line_segment_intersection(o, Point::new(1.0, 0.0), o, Point::new(0.0, 1.0)).is_none()
        );
        // T junction at the end of the second segment.
        assert!(
            line_segment_intersection(
                Point::new(-1.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(0.0, 0.0)
            )
            .is_none()
        );
        // Parallel.
        assert!(
            line_segment_intersection(
                o,
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0)
            )
            .is_none()
        );
        // Collinear overlap.
        assert!(
            line_segment_intersection(
                o,
                Point::new(2.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(3.0, 0.0)
            )
            .is_none()
        );
    }

    #[test]
    fn homogeneous_lines() {
        // x - 1 = 0 and y - 2 = 0.
        let p = line_line_intersection(
            HomogeneousLine::new(1.0, 0.0, -1.0),
            HomogeneousLine::new(0.0, 1.0, -2.0),
        )
        .expect("perpendicular lines meet");
        assert!((p - Vec2::new(1.0, 2.0)).hypot() < 1e-12);
        assert!(
            line_line_intersection(
                HomogeneousLine::new(1.0, 1.0, 0.0),
                HomogeneousLine::new(2.0, 2.0, 5.0)
            )
            .is_none()
        );
    }

    #[test]
    fn arm_points_right_angle() {
        let (elbow, joint) = arm_points(
            Point::new(2.0, 2.0),
            Point::new(0.0, 0.0),
            Point::new(-2.0, 2.0),
            2_f64.sqrt(),
        );
        assert!(close(elbow, Point::new(0.0, -1.0)), "elbow was {elbow:?}");
        assert!(close(joint, Point::new(0.0, 1.0)), "joint was {joint:?}");
    }

    #[test]
    fn arm_points_straight_and_u_turn() {
        // Straight through: offsets are perpendicular to the road.
        let (elbow, joint) = arm_points(
            Point::new(-1.0, 0.0),
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            2.0,
        );
        assert!((elbow.x).abs() < 1e-9 && (elbow.y.abs() - 1.0).abs() < 1e-9);
        assert!(close(joint, Point::new(-elbow.x, -elbow.y)));

        // Folding back onto itself.
        let (elbow, joint) = arm_points(
            Point::new(1.0, 0.0),
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            2.0,
        );
        assert!(close(elbow, Point::new(0.0, -1.0)), "elbow was {elbow:?}");
        assert!(close(joint, Point::new(0.0, 1.0)), "joint was {joint:?}");
    }

    #[test]
    fn line_corners_order() {
        let c = line_corners(Point::ORIGIN, Point::new(10.0, 0.0), 4.0);
        assert_eq!(
            c,
            [
                Point::new(0.0, 2.0),
                Point::new(0.0, -2.0),
                Point::new(10.0, -2.0),
                Point::new(10.0, 2.0)
            ]
        );
    }

    #[test]
    fn oriented_square() {
        let h = 2_f64.sqrt();
        let c = oriented_rect_corners(Point::ORIGIN, 0.0, h, core::f64::consts::FRAC_PI_4);
        assert!(close(c[0], Point::new(1.0, 1.0)));
        assert!(close(c[1], Point::new(-1.0, 1.0)));
        assert!(close(c[2], Point::new(-1.0, -1.0)));
        assert!(close(c[3], Point::new(1.0, -1.0)));
    }

    #[test]
    fn sat_overlap_and_separation() {
        let a = line_corners(Point::ORIGIN, Point::new(10.0, 0.0), 2.0);
        let b = line_corners(Point::new(5.0, -5.0), Point::new(5.0, 0.5), 2.0);
        let offset = rect_rect_intersection(&a, &b).expect("rectangles overlap");
        // Smallest push is along y: the tip of `b` pokes 1.5 into `a`.
        assert!((offset - Vec2::new(0.0, 1.5)).hypot() < 1e-9, "offset {offset:?}");

        let far = line_corners(Point::new(0.0, 10.0), Point::new(10.0, 10.0), 2.0);
        assert!(rect_rect_intersection(&a, &far).is_none());
    }

    #[test]
    fn sat_is_symmetric() {
        let a = line_corners(Point::ORIGIN, Point::new(10.0, 3.0), 2.0);
        let cases = [
            line_corners(Point::new(4.0, -4.0), Point::new(6.0, 4.0), 3.0),
            line_corners(Point::new(20.0, 0.0), Point::new(30.0, 0.0), 3.0),
            oriented_rect_corners(Point::new(9.0, 3.0), 0.3, 2.0, 0.6),
            oriented_rect_corners(Point::new(1.0, 1.0), 2.1, 1.5, 0.4),
            line_corners(Point::new(-1.0, 0.5), Point::new(3.0, 2.0), 4.0),
        ];
        for b in &cases {
            let ab = rect_rect_intersection(&a, b);
            let ba = rect_rect_intersection(b, &a);
            assert_eq!(ab.is_some(), ba.is_some(), "asymmetric result for {b:?}");
            if let (Some(ab), Some(ba)) = (ab, ba) {
                assert!((ab + ba).hypot() < 1e-9, "{ab:?} and {ba:?} are not opposite");
            }
        }
    }

    #[test]
    fn sat_equal_pushes_pick_the_same_axis_both_ways() {
        // Corner overlap of half a unit along both x and y.
        let a = line_corners(Point::new(-1.0, 0.0), Point::new(1.0, 0.0), 2.0);
        let b = line_corners(Point::new(1.5, 0.5), Point::new(1.5, 2.5), 2.0);
        let ab = rect_rect_intersection(&a, &b).expect("corners overlap");
        let ba = rect_rect_intersection(&b, &a).expect("corners overlap");
        assert!((ab - Vec2::new(-0.5, 0.0)).hypot() < 1e-9, "offset {ab:?}");
        assert!((ab + ba).hypot() < 1e-9, "{ab:?} and {ba:?} are not opposite");
    }

    #[test]
    fn sat_degenerate_rectangle() {
        let a = line_corners(Point::ORIGIN, Point::new(10.0, 0.0), 2.0);
        let point = line_corners(Point::new(5.0, 0.0), Point::new(5.0, 0.0), 2.0);
        assert!(rect_rect_intersection(&a, &point).is_none());
    }

    #[test]
    fn rect_circle_cases() {
        let r = line_corners(Point::ORIGIN, Point::new(10.0, 0.0), 2.0);
        // Near a corner.
        assert!(rect_circle_intersection(&r, Point::new(-0.5, 1.5), 1.0));
        // Near an edge.
        assert!(rect_circle_intersection(&r, Point::new(5.0, 1.8), 1.0));
        // Inside.
        assert!(rect_circle_intersection(&r, Point::new(5.0, 0.0), 0.1));
        // Outside.
        assert!(!rect_circle_intersection(&r, Point::new(5.0, 5.0), 1.0));
        // Degenerate radius.
        assert!(!rect_circle_intersection(&r, Point::new(5.0, 0.0), 0.0));
    }

    #[test]
    fn projection_onto_zero_is_zero() {
        assert_eq!(project(Vec2::new(1.0, 2.0), Vec2::ZERO), Vec2::ZERO);
        assert_eq!(
            project(Vec2::new(3.0, 4.0), Vec2::new(2.0, 0.0)),
            Vec2::new(3.0, 0.0)
        );
    }
}
