//! Reflective boundary surfaces for unbound Brownian motion.
//!
//! The environment can declare spherical barrier surfaces the diffusing motor
//! cannot cross. A Brownian displacement whose segment intersects a barrier is
//! reflected specularly about the tangent plane at the first crossing point,
//! keeping the motor on the side it started from.

use super::geometry::{Point3, Segment3};

/// A spherical reflective barrier, e.g. a vesicle membrane enclosing the
/// experiment volume.
#[derive(Debug, Clone, Copy)]
pub struct ReflectiveSphere {
    pub center: Point3,
    pub radius: f64,
}

impl ReflectiveSphere {
    pub fn new(center: Point3, radius: f64) -> Self {
        ReflectiveSphere { center, radius }
    }

    /// First intersection of a displacement segment with the sphere surface.
    ///
    /// Solves the quadratic |start + t*d - center|^2 = r^2 for t in [0, 1]
    /// and returns the crossing point with the smallest t, or `None` when the
    /// segment does not touch the surface.
    pub fn first_intersection(&self, segment: &Segment3) -> Option<Point3> {
        let d = segment.end.sub(&segment.start);
        let m = segment.start.sub(&self.center);

        let a = d.norm2();
        if a < 1e-24 {
            return None;
        }
        let b = 2.0 * m.dot(&d);
        let c = m.norm2() - self.radius * self.radius;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        // Smallest root first; accept the earliest crossing inside the segment
        for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
            if (0.0..=1.0).contains(&t) {
                return Some(segment.start.add(&d.scale(t)));
            }
        }
        None
    }

    /// Specular reflection of a blocked candidate position.
    ///
    /// `from` is the (legal) current position, `candidate` the position the
    /// Brownian step proposed. If the displacement crosses the surface, the
    /// candidate is mirrored about the tangent plane at the crossing point and
    /// the reflected position is returned; otherwise the candidate is returned
    /// unchanged.
    pub fn reflect(&self, from: &Point3, candidate: &Point3) -> Point3 {
        let segment = Segment3::new(*from, *candidate);
        let Some(contact) = self.first_intersection(&segment) else {
            return *candidate;
        };

        let normal = contact.sub(&self.center).normalized();
        let overshoot = candidate.sub(&contact);
        let reflected = overshoot.sub(&normal.scale(2.0 * overshoot.dot(&normal)));
        contact.add(&reflected)
    }
}
