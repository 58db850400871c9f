//! Motion strategies: propagation delay and in-transit carrier transformation.
//!
//! A Motion strategy answers two questions for every (source, destination)
//! pair of a dispatch: how long does the carrier take to arrive, and what does
//! the medium do to it on the way. The default strategy is the contract
//! baseline (zero delay, identity transform); the electromagnetic strategy
//! applies geometric delay and table-driven path loss; the molecular strategy
//! (see `crate::molecular::motion`) runs a Brownian/tube-walk transit.

use crate::molecular::geometry::distance;
use crate::simulation::carrier::MessageCarrier;
use crate::simulation::field::Field;
use crate::simulation::medium::CommunicationInterface;
use crate::simulation::signal_math::{db_to_linear, linear_to_db};
use crate::simulation::tables::{PATH_LOSS_DB, floor_bucket};

/// Strategy computing propagation delay and applying the field's effect to a
/// carrier in transit. Implementations may hold a random source, so both
/// operations take `&mut self`.
pub trait Motion {
    /// Propagation delay (seconds) from `src` to `dst`.
    fn compute_delay(&mut self, src: &CommunicationInterface, dst: &CommunicationInterface, carrier: &MessageCarrier, field: &Field) -> f64;

    /// Transform the carrier as received at `dst`, in place.
    fn transform(&mut self, src: &CommunicationInterface, dst: &CommunicationInterface, carrier: &mut MessageCarrier, field: &Field);
}

/// Null strategy: zero delay, carrier unchanged. Every concrete strategy
/// refines this baseline.
pub struct DefaultMotion;

impl Motion for DefaultMotion {
    fn compute_delay(&mut self, _src: &CommunicationInterface, _dst: &CommunicationInterface, _carrier: &MessageCarrier, _field: &Field) -> f64 {
        0.0
    }

    fn transform(&mut self, _src: &CommunicationInterface, _dst: &CommunicationInterface, _carrier: &mut MessageCarrier, _field: &Field) {}
}

/// Electromagnetic motion: geometric wave delay plus calibrated path loss.
pub struct EmMotion {
    wave_speed: f64,
}

impl EmMotion {
    /// # Parameters
    ///
    /// * `wave_speed` - Propagation speed of the wave in the medium (m/s)
    pub fn new(wave_speed: f64) -> Self {
        EmMotion { wave_speed }
    }
}

impl Motion for EmMotion {
    /// Euclidean distance divided by the configured wave speed. Pure function
    /// of geometry; no random component.
    fn compute_delay(&mut self, src: &CommunicationInterface, dst: &CommunicationInterface, _carrier: &MessageCarrier, _field: &Field) -> f64 {
        let d = distance(&src.position(), &dst.position());
        let delay = d / self.wave_speed;
        log::debug!("EM delay: distance {:.6e} m / speed {:.3e} m/s = {:.6e} s", d, self.wave_speed, delay);
        delay
    }

    /// Attenuate the carrier's spectrum in place with the calibrated path
    /// loss for the floor-bucketed distance.
    ///
    /// Per sub-channel: convert the spectral density to dB, subtract the
    /// table's loss entry, convert back to linear. Carriers without a
    /// waveform (non-EM perturbation) pass through unchanged.
    fn transform(&mut self, src: &CommunicationInterface, dst: &CommunicationInterface, carrier: &mut MessageCarrier, _field: &Field) {
        let d = distance(&src.position(), &dst.position());
        let bucket = floor_bucket(d);

        let Some(waveform) = carrier.waveform_mut() else {
            log::warn!("EM motion applied to a carrier without a waveform; leaving it unchanged");
            return;
        };

        for (density, loss_db) in waveform.spectrum.iter_mut().zip(&PATH_LOSS_DB[bucket]) {
            *density = db_to_linear(linear_to_db(*density) - loss_db);
        }
    }
}
