//! Specificity strategies: receiver-side decodability of a delivered carrier.
//!
//! Specificity is the acceptance test of the physical layer: a delivered
//! carrier that fails it is silently dropped, which models "the message did
//! not arrive" on a best-effort channel. The default strategy accepts
//! unconditionally; the electromagnetic strategy gates on exact link-parameter
//! agreement and then on the Shannon bound for the calibrated noise at the
//! receiver's distance.

use crate::common::scene::EmParameters;
use crate::molecular::geometry::distance;
use crate::simulation::carrier::MessageCarrier;
use crate::simulation::medium::CommunicationInterface;
use crate::simulation::signal_math::{BOLTZMANN, LOG2_10, linear_to_db};
use crate::simulation::tables::{MOLECULAR_NOISE_KELVIN, floor_bucket};

/// Strategy deciding whether a delivered carrier is decodable at the
/// receiver.
pub trait Specificity {
    fn check_compatibility(&self, src: &CommunicationInterface, dst: &CommunicationInterface, carrier: &MessageCarrier) -> bool;
}

/// Null strategy: every delivered carrier is decodable.
pub struct DefaultSpecificity;

impl Specificity for DefaultSpecificity {
    fn check_compatibility(&self, _src: &CommunicationInterface, _dst: &CommunicationInterface, _carrier: &MessageCarrier) -> bool {
        true
    }
}

/// Electromagnetic specificity: exact link-parameter match, then a
/// Shannon-capacity test against the distance-dependent molecular noise
/// profile.
///
/// The receiver is configured with the link parameters it expects from the
/// transmitter (the same values the transmitter-side perturbation was built
/// from); a matching deployment configures both sides from one parameter set.
pub struct EmSpecificity {
    bandwidth: f64,
    sub_channel_width: f64,
    central_frequency: f64,
}

impl EmSpecificity {
    pub fn new(params: &EmParameters) -> Self {
        EmSpecificity {
            bandwidth: params.bandwidth,
            sub_channel_width: params.sub_channel_width,
            central_frequency: params.central_frequency,
        }
    }

    /// Aggregate Shannon capacity (bit/s) of the received spectrum at the
    /// given source-receiver distance.
    ///
    /// Per sub-channel: received power is `10*log10(density * width)` dB,
    /// noise power is `10*log10(k_B * T)` dB from the calibrated noise
    /// temperature, and the capacity contribution is
    /// `width * log2(10^(SINR_dB / 10))`, accumulated in the analytically
    /// equivalent form `width * SINR_dB / 10 * log2(10)`.
    fn channel_capacity(&self, carrier_distance: f64, spectrum: &[f64]) -> f64 {
        let bucket = floor_bucket(carrier_distance);
        let noise_row = &MOLECULAR_NOISE_KELVIN[bucket];

        let mut capacity = 0.0;
        for (density, noise_kelvin) in spectrum.iter().zip(noise_row) {
            let power_db = linear_to_db(density * self.sub_channel_width);
            let noise_db = linear_to_db(BOLTZMANN * noise_kelvin);
            let sinr_db = power_db - noise_db;
            capacity += self.sub_channel_width * sinr_db / 10.0 * LOG2_10;
        }
        capacity
    }
}

impl Specificity for EmSpecificity {
    fn check_compatibility(&self, src: &CommunicationInterface, dst: &CommunicationInterface, carrier: &MessageCarrier) -> bool {
        let Some(waveform) = carrier.waveform() else {
            log::debug!("EM specificity: carrier has no waveform, dropping");
            return false;
        };

        // Strict equality gate: any parameter disagreement is undecodable,
        // regardless of geometry or power.
        if waveform.bandwidth != self.bandwidth
            || waveform.sub_channel_width != self.sub_channel_width
            || waveform.central_frequency != self.central_frequency
        {
            log::debug!("EM specificity: link parameter mismatch, dropping");
            return false;
        }

        let transmission_rate = 1.0 / waveform.pulse_interval;
        let d = distance(&src.position(), &dst.position());
        let capacity = self.channel_capacity(d, &waveform.spectrum);

        let decodable = capacity >= transmission_rate;
        log::debug!(
            "EM specificity: distance {:.6e} m, capacity {:.4e} bit/s vs rate {:.4e} bit/s -> {}",
            d,
            capacity,
            transmission_rate,
            if decodable { "accept" } else { "drop" }
        );
        decodable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecular::geometry::Point3;
    use crate::simulation::field::Field;
    use crate::simulation::motion::{EmMotion, Motion};
    use crate::simulation::perturbation::{DefaultPerturbation, EmPerturbation, Perturbation};
    use crate::simulation::tables::PATH_LOSS_DB;

    fn iface(device_id: u32, position: Point3) -> CommunicationInterface {
        CommunicationInterface::new(device_id, position, Box::new(DefaultPerturbation), Box::new(DefaultSpecificity))
    }

    fn em_params() -> EmParameters {
        EmParameters {
            power_tx: 1.0,
            pulse_duration: 1e-6,
            pulse_interval: 1e-3,
            central_frequency: 2.4e9,
            bandwidth: 1e6,
            sub_channel_width: 1e5,
            wave_speed: 3.0e8,
        }
    }

    fn em_carrier(params: &EmParameters) -> MessageCarrier {
        EmPerturbation::new(params).create_carrier(&[0u8], 0.0).unwrap()
    }

    #[test]
    fn any_single_mismatching_parameter_rejects() {
        let src = iface(1, Point3::new(0.0, 0.0, 0.0));
        let dst = iface(2, Point3::new(0.0001, 0.0, 0.0));
        let specificity = EmSpecificity::new(&em_params());

        let mut bandwidth_off = em_params();
        bandwidth_off.bandwidth = 2e6;
        assert!(!specificity.check_compatibility(&src, &dst, &em_carrier(&bandwidth_off)));

        let mut width_off = em_params();
        width_off.sub_channel_width = 2e5;
        assert!(!specificity.check_compatibility(&src, &dst, &em_carrier(&width_off)));

        let mut frequency_off = em_params();
        frequency_off.central_frequency = 2.5e9;
        assert!(!specificity.check_compatibility(&src, &dst, &em_carrier(&frequency_off)));

        // Matching parameters at short range are decodable
        assert!(specificity.check_compatibility(&src, &dst, &em_carrier(&em_params())));
    }

    #[test]
    fn carrier_without_waveform_is_rejected() {
        let src = iface(1, Point3::new(0.0, 0.0, 0.0));
        let dst = iface(2, Point3::new(0.0001, 0.0, 0.0));
        let specificity = EmSpecificity::new(&em_params());
        assert!(!specificity.check_compatibility(&src, &dst, &MessageCarrier::bare(vec![0])));
    }

    #[test]
    fn capacity_decision_matches_hand_computation_at_bucket_4() {
        // 1 MHz / 100 kHz / 2.4 GHz both sides, distance 0.0005 m: floor
        // bucketing selects calibration row 4 for both path loss and noise.
        let params = em_params();
        let src = iface(1, Point3::new(0.0, 0.0, 0.0));
        let dst = iface(2, Point3::new(0.0005, 0.0, 0.0));

        let mut carrier = em_carrier(&params);
        EmMotion::new(params.wave_speed).transform(&src, &dst, &mut carrier, &Field::Generic);

        // Hand computation from the static tables: the received density is
        // the flat transmit density minus the row-4 loss (in dB), and each
        // sub-channel contributes width * SINR_dB/10 * log2(10).
        let tx_density_db = linear_to_db(1.0 / (10.0 * 1e5));
        let mut expected_capacity = 0.0;
        for i in 0..10 {
            let power_db = tx_density_db - PATH_LOSS_DB[4][i] + linear_to_db(1e5);
            let noise_db = linear_to_db(BOLTZMANN * MOLECULAR_NOISE_KELVIN[4][i]);
            expected_capacity += 1e5 * (power_db - noise_db) / 10.0 * LOG2_10;
        }

        let specificity = EmSpecificity::new(&params);
        let capacity = specificity.channel_capacity(0.0005, &carrier.waveform().unwrap().spectrum);
        assert!((capacity - expected_capacity).abs() < expected_capacity.abs() * 1e-9);

        // The symbol rate (1 kbit/s) is far below the computed capacity:
        // the carrier is accepted.
        assert!(capacity >= 1.0 / params.pulse_interval);
        assert!(specificity.check_compatibility(&src, &dst, &carrier));
    }

    #[test]
    fn symbol_rate_above_capacity_is_dropped() {
        let mut params = em_params();
        params.pulse_interval = 1e-15; // ~1 Pbit/s symbol rate
        let src = iface(1, Point3::new(0.0, 0.0, 0.0));
        let dst = iface(2, Point3::new(0.002, 0.0, 0.0));

        let mut carrier = em_carrier(&params);
        EmMotion::new(params.wave_speed).transform(&src, &dst, &mut carrier, &Field::Generic);

        let specificity = EmSpecificity::new(&params);
        assert!(!specificity.check_compatibility(&src, &dst, &carrier));
    }
}
