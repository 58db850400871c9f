//! Molecular motor motion: Brownian diffusion and microtubule walking.
//!
//! A molecular motor carries the message physically. Unbound, it diffuses by
//! Brownian motion (Gaussian step per axis, reflective boundaries honored).
//! Within capture radius of a microtubule it can bind and walk the tube
//! segment by segment to the tube's end. A full transit alternates the two
//! until the motor enters the destination volume or a budget runs out.
//!
//! Motion and time are coupled: every Brownian step advances the simulated
//! clock by the configured time step whether or not the step made progress,
//! and every walked segment advances it by segment length / movement rate.
//! All randomness is drawn from one seeded generator, so runs are
//! reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use super::boundary::ReflectiveSphere;
use super::field::MicrotubuleField;
use super::geometry::{Aabb, Point3};
use crate::simulation::carrier::MessageCarrier;
use crate::simulation::field::Field;
use crate::simulation::medium::CommunicationInterface;
use crate::simulation::motion::Motion;

/// Parameters of the molecular transport model. Distances in nanometers,
/// times in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct MolecularParameters {
    /// Mass diffusivity D of the unbound motor (nm^2/s).
    pub diffusion_coefficient: f64,
    /// Duration of one Brownian step (s).
    pub time_step: f64,
    /// Distance within which a motor can bind to a tube (nm).
    pub capture_radius: f64,
    /// Walking speed of a bound motor (nm/s).
    pub movement_rate: f64,
    /// Probability that a motor within capture radius actually binds.
    pub binding_probability: f64,
    /// Brownian steps before a tube search is abandoned.
    pub float_step_budget: usize,
    /// Float/walk cycles before a transit gives up.
    pub transit_cycle_budget: usize,
    /// Half-extent of the cubic destination volume around the receiver (nm).
    pub destination_half_extent: f64,
}

impl Default for MolecularParameters {
    fn default() -> Self {
        MolecularParameters {
            diffusion_coefficient: 1.0,
            time_step: 0.1,
            capture_radius: 15.0,
            movement_rate: 1000.0,
            binding_probability: 1.0,
            float_step_budget: 100,
            transit_cycle_budget: 50,
            destination_half_extent: 500.0,
        }
    }
}

/// Outcome of a point-to-destination transit.
#[derive(Debug, Clone, Copy)]
pub struct Transit {
    /// Simulated time the transit took (s).
    pub elapsed: f64,
    /// Whether the destination volume was entered before the budget ran out.
    pub reached: bool,
}

/// The molecular Motion strategy and its walk primitives.
pub struct MolecularMotion {
    params: MolecularParameters,
    boundaries: Vec<ReflectiveSphere>,
    rng: StdRng,
    clock: f64,
    trace: Vec<Point3>,
}

impl MolecularMotion {
    pub fn new(params: MolecularParameters, seed: u64) -> Self {
        MolecularMotion {
            params,
            boundaries: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            clock: 0.0,
            trace: Vec::new(),
        }
    }

    /// Add a reflective boundary surface the unbound motor cannot cross.
    pub fn add_boundary(&mut self, boundary: ReflectiveSphere) {
        self.boundaries.push(boundary);
    }

    /// Simulated time accumulated by all motion so far (s).
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    pub fn reset_clock(&mut self) {
        self.clock = 0.0;
    }

    /// Positions visited during the last transit, in visit order.
    pub fn trace(&self) -> &[Point3] {
        &self.trace
    }

    /// One Brownian step from `position`.
    ///
    /// Draws an independent Gaussian offset per axis with standard deviation
    /// `sqrt(2 * D * dt)`, then reflects the candidate off any boundary the
    /// displacement crosses. Advances the clock by `dt` regardless of
    /// outcome.
    pub fn brownian_step(&mut self, position: Point3) -> Point3 {
        let sigma = (2.0 * self.params.diffusion_coefficient * self.params.time_step).sqrt();
        let normal = Normal::new(0.0, sigma).expect("invalid brownian sigma");

        let candidate = Point3::new(
            position.x + normal.sample(&mut self.rng),
            position.y + normal.sample(&mut self.rng),
            position.z + normal.sample(&mut self.rng),
        );

        // A grazing step can remain past a curved surface after one specular
        // reflection; re-reflect until the displacement is clear, and reject
        // the step outright if it never clears.
        let mut landed = candidate;
        for _ in 0..4 {
            let mut adjusted = landed;
            for boundary in &self.boundaries {
                adjusted = boundary.reflect(&position, &adjusted);
            }
            if adjusted == landed {
                break;
            }
            landed = adjusted;
        }
        let displacement = crate::molecular::geometry::Segment3::new(position, landed);
        if self.boundaries.iter().any(|b| b.first_intersection(&displacement).is_some()) {
            landed = position;
        }

        self.clock += self.params.time_step;
        landed
    }

    /// Diffuse for exactly `steps` Brownian steps, recording each visited
    /// position into `trace`. Returns the final position.
    pub fn free_float(&mut self, start: Point3, steps: usize, trace: &mut Vec<Point3>) -> Point3 {
        let mut position = start;
        for _ in 0..steps {
            trace.push(position);
            position = self.brownian_step(position);
        }
        position
    }

    /// Diffuse until a tube comes within capture radius or the step budget is
    /// exhausted.
    ///
    /// # Returns
    ///
    /// The final position and `Some(segment index)` on tube contact, or
    /// `None` when the budget ran out with no tube in reach; the caller
    /// decides whether to keep floating or give up.
    pub fn float_to_tube(&mut self, start: Point3, field: &MicrotubuleField, trace: &mut Vec<Point3>) -> (Point3, Option<usize>) {
        let mut position = start;
        for _ in 0..self.params.float_step_budget {
            trace.push(position);
            position = self.brownian_step(position);
            if let Some(segment) = field.nearest_tube_within_radius(&position, self.params.capture_radius) {
                log::debug!("motor contact with segment {}", segment);
                return (position, Some(segment));
            }
        }
        (position, None)
    }

    /// Bind to the nearest tube and walk it to its end.
    ///
    /// The binding gate fires with the configured probability (certainty in
    /// the reference model). If no tube is within capture radius of `start`
    /// the walk aborts with no state change and returns `None`. Otherwise the
    /// motor walks forward segment by segment to the end of the parent tube,
    /// recording each segment endpoint in `trace` and advancing the clock by
    /// segment length / movement rate per segment; mid-tube unbinding is not
    /// modeled. Returns the end position.
    pub fn motor_walk(&mut self, start: Point3, field: &MicrotubuleField, trace: &mut Vec<Point3>) -> Option<Point3> {
        if self.rng.gen_range(0.0..1.0) > self.params.binding_probability {
            log::debug!("motor did not bind");
            return None;
        }

        let segment_index = field.nearest_tube_within_radius(&start, self.params.capture_radius)?;

        let per_tube = field.segments_per_tube();
        let segment_of_tube = segment_index % per_tube;
        let segments_to_go = per_tube - segment_of_tube;

        let mut position = start;
        for i in segment_index..segment_index + segments_to_go {
            let segment = field.segments()[i];
            position = segment.end;
            trace.push(position);
            self.clock += segment.length() / self.params.movement_rate;
        }
        Some(position)
    }

    /// Full point-to-destination transit: alternate unbound floating and tube
    /// walking until the destination volume is entered or the cycle budget is
    /// exhausted. The visited-position trace is retained for export.
    pub fn move_to_destination(&mut self, start: Point3, destination: &Aabb, field: &MicrotubuleField) -> Transit {
        let started_at = self.clock;
        let mut trace = std::mem::take(&mut self.trace);
        trace.clear();

        let mut position = start;
        let mut reached = destination.contains(&position);

        for _ in 0..self.params.transit_cycle_budget {
            if reached {
                break;
            }

            let (floated, contact) = self.float_to_tube(position, field, &mut trace);
            position = floated;
            if contact.is_some() {
                if let Some(walked) = self.motor_walk(position, field, &mut trace) {
                    position = walked;
                }
            }
            reached = destination.contains(&position);
        }

        trace.push(position);
        self.trace = trace;

        Transit {
            elapsed: self.clock - started_at,
            reached,
        }
    }
}

impl Motion for MolecularMotion {
    /// Propagation delay is the simulated transit time of a motor walked from
    /// the source position to a destination volume centered on the receiver.
    /// A transit that exhausts its budget still took the time it took; the
    /// carrier arrives after that delay regardless.
    fn compute_delay(&mut self, src: &CommunicationInterface, dst: &CommunicationInterface, _carrier: &MessageCarrier, field: &Field) -> f64 {
        let Some(tubes) = field.microtubule() else {
            log::warn!("molecular motion without a microtubule field; delivering at zero delay");
            return 0.0;
        };

        let destination = Aabb::around(dst.position(), self.params.destination_half_extent);
        let transit = self.move_to_destination(src.position(), &destination, tubes);
        if !transit.reached {
            log::debug!("transit budget exhausted before reaching device {}; delay {} s", dst.device_id(), transit.elapsed);
        }
        transit.elapsed
    }

    /// The molecular medium does not alter the carrier's content.
    fn transform(&mut self, _src: &CommunicationInterface, _dst: &CommunicationInterface, _carrier: &mut MessageCarrier, _field: &Field) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecular::field::TubeCharacteristics;
    use crate::molecular::geometry::Segment3;

    fn params() -> MolecularParameters {
        MolecularParameters::default()
    }

    fn straight_tube_field(segments_per_tube: usize, segment_length: f64) -> MicrotubuleField {
        let segments: Vec<Segment3> = (0..segments_per_tube)
            .map(|i| {
                let x = i as f64 * segment_length;
                Segment3::new(Point3::new(x, 0.0, 0.0), Point3::new(x + segment_length, 0.0, 0.0))
            })
            .collect();
        let ts = TubeCharacteristics {
            num_tubes: 1,
            tube_length: segment_length * segments_per_tube as f64,
            segments_per_tube,
            intra_tube_angle: 30.0,
            inter_tube_angle: 10.0,
            density: 10.0,
            persistence_length: 50.0,
            volume: 25.0,
        };
        MicrotubuleField::from_segments(segments, ts)
    }

    #[test]
    fn brownian_displacement_variance_matches_2_d_dt_n() {
        let n_steps = 50;
        let walks = 600;
        let mut motion = MolecularMotion::new(params(), 12345);

        let mut finals = Vec::with_capacity(walks);
        for _ in 0..walks {
            let mut trace = Vec::new();
            let end = motion.free_float(Point3::new(0.0, 0.0, 0.0), n_steps, &mut trace);
            finals.push(end.x);
        }

        let mean = finals.iter().sum::<f64>() / walks as f64;
        let variance = finals.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (walks as f64 - 1.0);

        // Expected per-axis variance 2*D*dt*N = 2*1.0*0.1*50 = 10
        let expected = 2.0 * 1.0 * 0.1 * n_steps as f64;
        assert!(
            (variance - expected).abs() < expected * 0.3,
            "variance {} not within 30% of {}",
            variance,
            expected
        );
    }

    #[test]
    fn every_brownian_step_advances_the_clock() {
        let mut motion = MolecularMotion::new(params(), 1);
        let mut trace = Vec::new();
        motion.free_float(Point3::new(0.0, 0.0, 0.0), 7, &mut trace);
        assert!((motion.elapsed() - 7.0 * 0.1).abs() < 1e-12);
        assert_eq!(trace.len(), 7);
    }

    #[test]
    fn reflected_walk_stays_inside_the_boundary() {
        let mut p = params();
        p.diffusion_coefficient = 50.0; // large steps to force boundary hits
        let mut motion = MolecularMotion::new(p, 99);
        motion.add_boundary(ReflectiveSphere::new(Point3::new(0.0, 0.0, 0.0), 30.0));

        let mut position = Point3::new(0.0, 0.0, 0.0);
        for _ in 0..500 {
            position = motion.brownian_step(position);
            assert!(position.norm() <= 30.0 + 1e-9, "motor escaped the reflective boundary at {:?}", position);
        }
    }

    #[test]
    fn motor_walk_records_one_waypoint_per_segment() {
        let k = 4;
        let segment_length = 10.0;
        let field = straight_tube_field(k, segment_length);
        let mut p = params();
        p.movement_rate = 5.0;
        let mut motion = MolecularMotion::new(p, 3);

        // Start within capture radius of the first segment
        let mut trace = Vec::new();
        let end = motion.motor_walk(Point3::new(0.0, 3.0, 0.0), &field, &mut trace).unwrap();

        assert_eq!(trace.len(), k);
        assert_eq!(end, Point3::new(40.0, 0.0, 0.0));
        // Elapsed time is the sum of per-segment length / movement rate
        assert!((motion.elapsed() - k as f64 * segment_length / 5.0).abs() < 1e-12);
    }

    #[test]
    fn motor_walk_from_mid_tube_walks_to_the_end_only() {
        let field = straight_tube_field(5, 10.0);
        let mut motion = MolecularMotion::new(params(), 3);

        let mut trace = Vec::new();
        let end = motion.motor_walk(Point3::new(25.0, 1.0, 0.0), &field, &mut trace).unwrap();

        // Started on segment 2 of 5: three segments walked
        assert_eq!(trace.len(), 3);
        assert_eq!(end, Point3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn motor_walk_without_a_tube_in_radius_aborts() {
        let field = straight_tube_field(3, 10.0);
        let mut motion = MolecularMotion::new(params(), 3);

        let mut trace = Vec::new();
        let result = motion.motor_walk(Point3::new(0.0, 500.0, 0.0), &field, &mut trace);
        assert!(result.is_none());
        assert!(trace.is_empty());
        assert_eq!(motion.elapsed(), 0.0);
    }

    #[test]
    fn float_to_tube_gives_up_after_the_step_budget() {
        let field = straight_tube_field(3, 10.0);
        let mut p = params();
        p.float_step_budget = 20;
        p.diffusion_coefficient = 0.01; // barely moves: will not reach the tube
        let mut motion = MolecularMotion::new(p, 8);

        let mut trace = Vec::new();
        let (_, contact) = motion.float_to_tube(Point3::new(0.0, 10_000.0, 0.0), &field, &mut trace);
        assert!(contact.is_none());
        assert_eq!(trace.len(), 20);
    }

    #[test]
    fn transit_starting_inside_the_destination_is_immediate() {
        let field = straight_tube_field(3, 10.0);
        let mut motion = MolecularMotion::new(params(), 21);

        let destination = Aabb::around(Point3::new(0.0, 0.0, 0.0), 50.0);
        let transit = motion.move_to_destination(Point3::new(5.0, 5.0, 5.0), &destination, &field);
        assert!(transit.reached);
        assert_eq!(transit.elapsed, 0.0);
    }

    #[test]
    fn transit_near_a_tube_reaches_a_destination_at_its_end() {
        // Tube leads straight to the destination volume; the motor starts
        // within capture radius, so a bind-and-walk reaches the end.
        let field = straight_tube_field(10, 100.0);
        let mut motion = MolecularMotion::new(params(), 5);

        let destination = Aabb::around(Point3::new(1000.0, 0.0, 0.0), 200.0);
        let transit = motion.move_to_destination(Point3::new(0.0, 5.0, 0.0), &destination, &field);
        assert!(transit.reached);
        assert!(transit.elapsed > 0.0);
        // The trace ends inside the destination volume
        let last = motion.trace().last().unwrap();
        assert!(destination.contains(last));
    }
}
