//! 3-D geometry primitives for the molecular medium.
//!
//! Contains helper types and functions for:
//! - Points and vectors in nanometer-scale 3-D space
//! - Tube segments (two endpoints) with length/direction queries
//! - Point-to-segment and segment-to-segment distance (clamped projections)
//! - Axis-aligned destination volumes
//!
//! Distances use squared forms where possible to avoid sqrt in hot paths;
//! the motor walk and nearest-tube scans call these once per segment per step.

use serde::{Deserialize, Serialize};

/// A point (or free vector) in 3-D space. Units are nanometers throughout
/// the molecular model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub fn add(&self, other: &Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, s: f64) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared Euclidean norm (avoids a sqrt when only comparing magnitudes).
    pub fn norm2(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Unit vector in the same direction. Degenerate (near-zero) vectors are
    /// returned unchanged rather than divided by ~0.
    pub fn normalized(&self) -> Point3 {
        let n = self.norm();
        if n < 1e-12 { *self } else { self.scale(1.0 / n) }
    }
}

/// Squared Euclidean distance between two points.
pub fn distance2(a: &Point3, b: &Point3) -> f64 {
    a.sub(b).norm2()
}

/// Euclidean distance between two points.
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    distance2(a, b).sqrt()
}

/// A directed tube segment: the motor walks from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment3 {
    pub start: Point3,
    pub end: Point3,
}

impl Segment3 {
    pub fn new(start: Point3, end: Point3) -> Self {
        Segment3 { start, end }
    }

    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// Unit direction vector from start to end.
    pub fn direction(&self) -> Point3 {
        self.end.sub(&self.start).normalized()
    }

    /// Distance from a point to this segment using projection with a clamped
    /// parameter t, so endpoints are handled without special cases.
    ///
    /// # Parameters
    ///
    /// * `p` - The query point
    ///
    /// # Returns
    ///
    /// The shortest Euclidean distance from `p` to any point of the segment.
    pub fn distance_to_point(&self, p: &Point3) -> f64 {
        let d = self.end.sub(&self.start);
        let len2 = d.norm2();
        if len2 < 1e-24 {
            // Degenerate segment: treat as a point
            return distance(&self.start, p);
        }
        let t = (p.sub(&self.start).dot(&d) / len2).clamp(0.0, 1.0);
        let closest = self.start.add(&d.scale(t));
        distance(&closest, p)
    }

    /// Closest approach between two segments.
    ///
    /// Returns the minimum distance and the midpoint of the connecting
    /// segment at closest approach. Parallel and degenerate configurations
    /// fall back to clamped endpoint projections.
    pub fn closest_approach(&self, other: &Segment3) -> (f64, Point3) {
        let d1 = self.end.sub(&self.start);
        let d2 = other.end.sub(&other.start);
        let r = self.start.sub(&other.start);

        let a = d1.norm2();
        let e = d2.norm2();
        let f = d2.dot(&r);

        let (s, t);
        if a < 1e-24 && e < 1e-24 {
            // Both segments degenerate to points
            s = 0.0;
            t = 0.0;
        } else if a < 1e-24 {
            s = 0.0;
            t = (f / e).clamp(0.0, 1.0);
        } else {
            let c = d1.dot(&r);
            if e < 1e-24 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else {
                let b = d1.dot(&d2);
                let denom = a * e - b * b;
                // Parallel segments have denom == 0; any s works, pick 0
                let s_raw = if denom.abs() > 1e-24 { (b * f - c * e) / denom } else { 0.0 };
                let s_clamped = s_raw.clamp(0.0, 1.0);
                let t_raw = (b * s_clamped + f) / e;
                let t_clamped = t_raw.clamp(0.0, 1.0);
                // Re-project s after clamping t to keep both on their segments
                s = ((b * t_clamped - c) / a).clamp(0.0, 1.0);
                t = t_clamped;
            }
        }

        let p1 = self.start.add(&d1.scale(s));
        let p2 = other.start.add(&d2.scale(t));
        (distance(&p1, &p2), p1.add(&p2).scale(0.5))
    }
}

/// Axis-aligned box given by two opposite corners, used as the motor's
/// destination volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub lower: Point3,
    pub upper: Point3,
}

impl Aabb {
    /// Build a box from two opposite corners in any order.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Aabb {
            lower: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            upper: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box of the given half-extent centered on a point.
    pub fn around(center: Point3, half_extent: f64) -> Self {
        let h = Point3::new(half_extent, half_extent, half_extent);
        Aabb {
            lower: center.sub(&h),
            upper: center.add(&h),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.lower.x
            && p.x <= self.upper.x
            && p.y >= self.lower.y
            && p.y <= self.upper.y
            && p.z >= self.lower.z
            && p.z <= self.upper.z
    }
}
