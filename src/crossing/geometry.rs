//! Planar geometry kernel: vector difference, strict segment intersection and
//! full-circle signed angles.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A point in pixel space.
pub type Point = Point2<f64>;

/// Directed segment between two points.
///
/// Used both for fences (fixed at authoring time) and for a track's motion
/// between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    #[inline]
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Zero-length segment located at `p`.
    #[inline]
    pub fn degenerate(p: Point) -> Self {
        Self { from: p, to: p }
    }

    /// Direction vector `to - from`.
    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        vector(&self.from, &self.to)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// Same segment traversed the other way.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        is_finite_point(&self.from) && is_finite_point(&self.to)
    }

    /// Whether this segment properly crosses `other`.
    #[inline]
    pub fn crosses(&self, other: &Segment) -> bool {
        segments_intersect(&self.from, &self.to, &other.from, &other.to)
    }
}

/// Coordinate difference `p2 - p1`.
#[inline]
pub fn vector(p1: &Point, p2: &Point) -> Vector2<f64> {
    p2 - p1
}

/// Whether both coordinates of `p` are finite.
#[inline]
pub fn is_finite_point(p: &Point) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

/// Scalar 2D cross product `u.x * v.y - u.y * v.x`.
#[inline]
pub fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Strict intersection test between segment `a0-a1` and segment `b0-b1`.
///
/// Each endpoint of one segment must lie strictly on opposite sides of the
/// other segment's supporting line. Collinear overlap, touching endpoints,
/// zero-length segments and non-finite coordinates all report `false`.
pub fn segments_intersect(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> bool {
    if ![a0, a1, b0, b1].into_iter().all(is_finite_point) {
        return false;
    }

    let a = vector(a0, a1);
    let b = vector(b0, b1);

    let d1 = cross(&b, &vector(b0, a0));
    let d2 = cross(&b, &vector(b0, a1));
    let d3 = cross(&a, &vector(a0, b0));
    let d4 = cross(&a, &vector(a0, b1));

    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Rotation from `u` to `v` in degrees, in `[0, 360)`.
///
/// The unsigned angle from `acos` is reflected to `360 - angle` whenever
/// `cross(u, v)` is negative. A zero-length or non-finite input yields `0.0`.
pub fn signed_angle_degrees(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    let norms = u.norm() * v.norm();
    if norms == 0.0 || !norms.is_finite() {
        return 0.0;
    }

    let cos = (u.dot(v) / norms).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();
    if !angle.is_finite() {
        return 0.0;
    }

    let signed = if cross(u, v) < 0.0 {
        360.0 - angle
    } else {
        angle
    };

    // 360 - 0 lands on the excluded upper bound
    if signed >= 360.0 { 0.0 } else { signed }
}
