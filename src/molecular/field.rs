//! Microtubule network generation and queries.
//!
//! The molecular medium is threaded by a network of microtubules. Each tube is
//! a chain of straight segments; a molecular motor either diffuses freely or
//! binds to a tube and walks along it. This module generates the network from
//! configured characteristics, derives its coarse vector field, and answers
//! the geometric queries the motor-walk strategy needs:
//! - `nearest_tube_within_radius`: which segment (if any) can a motor bind to
//! - `all_segment_overlaps`: inter-tube contact points, for diagnostics
//! - `vector_field`: one direction sample per segment, for export
//!
//! Tube stiffness is expressed as a persistence length: the deflection angle
//! between consecutive segments is drawn from a Gaussian with
//! sigma = sqrt(2 * segment_length / persistence_length), the worm-like-chain
//! relation. A structural-entropy metric accumulated during generation
//! quantifies the directional disorder of the realized network.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::geometry::{Point3, Segment3};

/// Nominal microtubule radius (nm). A motor within this distance of a segment
/// is considered in contact for the overlap diagnostics.
pub const TUBE_RADIUS: f64 = 15.0;

/// Aggregate parameters of the tube network.
///
/// `intra_tube_angle` and `inter_tube_angle` are descriptive characteristics
/// of the modeled cytoskeleton (degrees); the realized per-joint deflection is
/// governed by `persistence_length`.
#[derive(Debug, Clone, Deserialize)]
pub struct TubeCharacteristics {
    /// Number of tubes in the network.
    pub num_tubes: usize,
    /// Total length of one tube (nm).
    pub tube_length: f64,
    /// Number of sequential segments per tube.
    pub segments_per_tube: usize,
    /// Mean angle between segments of the same tube (degrees).
    pub intra_tube_angle: f64,
    /// Mean angle between distinct tubes (degrees).
    pub inter_tube_angle: f64,
    /// Tubes per unit volume.
    pub density: f64,
    /// Persistence length (nm): stiffness of the generated tubes.
    pub persistence_length: f64,
    /// Volume the tube starting points are scattered within (nm^3).
    pub volume: f64,
}

impl TubeCharacteristics {
    /// Length of a single segment (nm).
    pub fn segment_length(&self) -> f64 {
        self.tube_length / self.segments_per_tube as f64
    }
}

/// One directional sample of the derived vector field: the direction of a
/// tube segment anchored at its starting point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VectorSample {
    pub origin: Point3,
    pub direction: Point3,
}

/// The generated microtubule network.
///
/// Segments are stored tube-major, segment-minor: segment `i` belongs to tube
/// `i / segments_per_tube` and is segment `i % segments_per_tube` within it.
/// Regeneration replaces the geometry wholesale; it must not run while a walk
/// still references the old network.
pub struct MicrotubuleField {
    characteristics: TubeCharacteristics,
    segments: Vec<Segment3>,
    structural_entropy: f64,
}

impl MicrotubuleField {
    /// Generate a network from the given characteristics.
    ///
    /// Tube starting points are independently Gaussian-scattered with
    /// sigma = volume^(1/4) per axis; each tube then grows segment by segment,
    /// deflecting at every joint by a Gaussian angle around a uniformly random
    /// perpendicular axis.
    pub fn generate(characteristics: TubeCharacteristics, rng: &mut impl Rng) -> Self {
        let mut field = MicrotubuleField {
            characteristics,
            segments: Vec::new(),
            structural_entropy: 0.0,
        };
        field.regenerate(rng);
        field
    }

    /// Build a network from explicit segments (no randomness). Used by tests
    /// and by callers replaying an exported geometry.
    pub fn from_segments(segments: Vec<Segment3>, characteristics: TubeCharacteristics) -> Self {
        MicrotubuleField {
            characteristics,
            segments,
            structural_entropy: 0.0,
        }
    }

    /// Replace the network with a fresh realization of the configured
    /// characteristics, recomputing the structural entropy.
    pub fn regenerate(&mut self, rng: &mut impl Rng) {
        let ts = &self.characteristics;
        let scatter_sigma = ts.volume.powf(0.25);
        let seg_len = ts.segment_length();
        let deflection_sigma = (2.0 * seg_len / ts.persistence_length).sqrt();

        let scatter = Normal::new(0.0, scatter_sigma).expect("invalid scatter sigma");
        let deflection = Normal::new(0.0, deflection_sigma).expect("invalid deflection sigma");

        self.segments.clear();
        self.segments.reserve(ts.num_tubes * ts.segments_per_tube);
        self.structural_entropy = 0.0;

        for _ in 0..ts.num_tubes {
            let start = Point3::new(scatter.sample(rng), scatter.sample(rng), scatter.sample(rng));
            let entropy = grow_tube(&mut self.segments, start, seg_len, ts.segments_per_tube, &deflection, rng);
            self.structural_entropy += entropy;
        }

        log::debug!(
            "regenerated tube network: {} tubes x {} segments, persistence {} nm, structural entropy {:.3}",
            ts.num_tubes,
            ts.segments_per_tube,
            ts.persistence_length,
            self.structural_entropy
        );
    }

    pub fn characteristics(&self) -> &TubeCharacteristics {
        &self.characteristics
    }

    /// All segments, tube-major, segment-minor.
    pub fn segments(&self) -> &[Segment3] {
        &self.segments
    }

    pub fn segments_per_tube(&self) -> usize {
        self.characteristics.segments_per_tube
    }

    /// Directional disorder accumulated over the last generation.
    pub fn structural_entropy(&self) -> f64 {
        self.structural_entropy
    }

    /// Index of the nearest segment within `radius` of `point`, or `None`
    /// when no tube is in reach. Callers treat `None` as "keep floating".
    pub fn nearest_tube_within_radius(&self, point: &Point3, radius: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            let d = segment.distance_to_point(point);
            if d <= radius && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Contact points between segments of distinct tubes, in scan order.
    ///
    /// Segments of the same tube share joints by construction and are skipped.
    /// This is a diagnostic of network connectivity, not a routing input.
    pub fn all_segment_overlaps(&self) -> Vec<Point3> {
        let per_tube = self.characteristics.segments_per_tube;
        let mut contacts = Vec::new();
        for i in 0..self.segments.len() {
            for j in (i + 1)..self.segments.len() {
                if per_tube > 0 && i / per_tube == j / per_tube {
                    continue;
                }
                let (d, midpoint) = self.segments[i].closest_approach(&self.segments[j]);
                if d <= TUBE_RADIUS {
                    contacts.push(midpoint);
                }
            }
        }
        contacts
    }

    /// Derive the coarse vector field: one sample per segment, in segment
    /// order, each pointing along its segment.
    pub fn vector_field(&self) -> Vec<VectorSample> {
        self.segments
            .iter()
            .map(|s| VectorSample {
                origin: s.start,
                direction: s.direction(),
            })
            .collect()
    }

    /// Regenerate the network once per supplied persistence length and record
    /// `(persistence length, structural entropy)` pairs in sweep order.
    ///
    /// The field is left holding the realization of the last swept length.
    pub fn persistence_entropy_sweep(&mut self, lengths: &[f64], rng: &mut impl Rng) -> Vec<(f64, f64)> {
        let mut results = Vec::with_capacity(lengths.len());
        for &length in lengths {
            self.characteristics.persistence_length = length;
            self.regenerate(rng);
            results.push((length, self.structural_entropy));
        }
        results
    }
}

/// Grow one tube of `segments` sequential segments starting at `start` and
/// append them to `out`. Returns the tube's structural-entropy contribution:
/// the differential entropy `0.5 * ln(2*pi*e*s^2)` of the realized deflection
/// angles, where `s` is their sample standard deviation.
fn grow_tube(
    out: &mut Vec<Segment3>,
    start: Point3,
    segment_length: f64,
    segments: usize,
    deflection: &Normal<f64>,
    rng: &mut impl Rng,
) -> f64 {
    let mut position = start;
    let mut direction = random_unit_vector(rng);
    let mut angles = Vec::with_capacity(segments.saturating_sub(1));

    for i in 0..segments {
        if i > 0 {
            let angle = deflection.sample(rng);
            direction = deflect(&direction, angle, rng);
            angles.push(angle);
        }
        let end = position.add(&direction.scale(segment_length));
        out.push(Segment3::new(position, end));
        position = end;
    }

    sample_entropy(&angles)
}

/// Uniformly random unit vector (normalized Gaussian triple).
fn random_unit_vector(rng: &mut impl Rng) -> Point3 {
    let n = Normal::new(0.0, 1.0).expect("unit normal");
    loop {
        let v = Point3::new(n.sample(rng), n.sample(rng), n.sample(rng));
        if v.norm2() > 1e-12 {
            return v.normalized();
        }
    }
}

/// Rotate `direction` by `angle` radians about a uniformly random axis
/// perpendicular to it (Rodrigues' formula, with the axial term vanishing
/// because the axis is perpendicular).
fn deflect(direction: &Point3, angle: f64, rng: &mut impl Rng) -> Point3 {
    let axis = random_perpendicular(direction, rng);
    let rotated = direction.scale(angle.cos()).add(&axis.cross(direction).scale(angle.sin()));
    rotated.normalized()
}

fn random_perpendicular(direction: &Point3, rng: &mut impl Rng) -> Point3 {
    loop {
        let g = random_unit_vector(rng);
        let perp = g.sub(&direction.scale(g.dot(direction)));
        if perp.norm2() > 1e-12 {
            return perp.normalized();
        }
    }
}

/// Differential entropy of a Gaussian fitted to the sample. Samples that are
/// too small or constant contribute nothing.
fn sample_entropy(angles: &[f64]) -> f64 {
    if angles.len() < 2 {
        return 0.0;
    }
    let n = angles.len() as f64;
    let mean = angles.iter().sum::<f64>() / n;
    let variance = angles.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / (n - 1.0);
    if variance <= 0.0 {
        return 0.0;
    }
    0.5 * (2.0 * std::f64::consts::PI * std::f64::consts::E * variance).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn characteristics() -> TubeCharacteristics {
        TubeCharacteristics {
            num_tubes: 25,
            tube_length: 100.0,
            segments_per_tube: 10,
            intra_tube_angle: 30.0,
            inter_tube_angle: 10.0,
            density: 10.0,
            persistence_length: 50.0,
            volume: 25.0,
        }
    }

    #[test]
    fn generation_produces_connected_tubes_of_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = MicrotubuleField::generate(characteristics(), &mut rng);

        assert_eq!(field.segments().len(), 25 * 10);
        let seg_len = field.characteristics().segment_length();
        for (i, segment) in field.segments().iter().enumerate() {
            assert!((segment.length() - seg_len).abs() < 1e-9);
            // Consecutive segments of a tube are connected end to start
            if i % 10 != 0 {
                let prev = &field.segments()[i - 1];
                assert!(crate::molecular::geometry::distance(&prev.end, &segment.start) < 1e-9);
            }
        }
    }

    #[test]
    fn entropy_grows_as_persistence_length_shrinks() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = MicrotubuleField::generate(characteristics(), &mut rng);

        let sweep = field.persistence_entropy_sweep(&[1000.0, 10.0], &mut rng);
        assert_eq!(sweep.len(), 2);
        let (_, entropy_stiff) = sweep[0];
        let (_, entropy_floppy) = sweep[1];
        assert!(entropy_floppy > entropy_stiff);
    }

    #[test]
    fn nearest_tube_query_honors_the_radius() {
        let segments = vec![
            Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)),
            Segment3::new(Point3::new(0.0, 100.0, 0.0), Point3::new(10.0, 100.0, 0.0)),
        ];
        let mut ts = characteristics();
        ts.segments_per_tube = 1;
        let field = MicrotubuleField::from_segments(segments, ts);

        assert_eq!(field.nearest_tube_within_radius(&Point3::new(5.0, 3.0, 0.0), 15.0), Some(0));
        assert_eq!(field.nearest_tube_within_radius(&Point3::new(5.0, 97.0, 0.0), 15.0), Some(1));
        assert_eq!(field.nearest_tube_within_radius(&Point3::new(5.0, 50.0, 0.0), 15.0), None);
    }

    #[test]
    fn overlaps_report_inter_tube_contacts_only() {
        // Two tubes crossing at the origin plus one far away
        let segments = vec![
            Segment3::new(Point3::new(-10.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)),
            Segment3::new(Point3::new(0.0, -10.0, 0.0), Point3::new(0.0, 10.0, 0.0)),
            Segment3::new(Point3::new(500.0, 500.0, 500.0), Point3::new(510.0, 500.0, 500.0)),
        ];
        let mut ts = characteristics();
        ts.segments_per_tube = 1;
        let field = MicrotubuleField::from_segments(segments, ts);

        let contacts = field.all_segment_overlaps();
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].norm() < 1e-9);
    }

    #[test]
    fn vector_field_follows_segment_directions() {
        let segments = vec![Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0))];
        let mut ts = characteristics();
        ts.segments_per_tube = 1;
        let field = MicrotubuleField::from_segments(segments, ts);

        let vf = field.vector_field();
        assert_eq!(vf.len(), 1);
        assert!((vf[0].direction.x - 1.0).abs() < 1e-12);
        assert_eq!(vf[0].origin, Point3::new(0.0, 0.0, 0.0));
    }
}
