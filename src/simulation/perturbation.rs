//! Perturbation strategies: turning a raw payload into a message carrier.
//!
//! The perturbation encodes the transmitter-side physical parameters into the
//! carrier at transmission time. The default strategy wraps the payload with
//! no physical metadata; the electromagnetic strategy attaches a flat power
//! spectral density over the configured sub-channel grid.

use crate::common::scene::EmParameters;
use crate::simulation::carrier::{EmWaveform, MessageCarrier};

/// Carrier construction failures. These are configuration errors surfaced
/// eagerly at transmit time rather than degenerate carriers propagated to a
/// confusing downstream failure.
#[derive(Debug)]
pub enum CarrierError {
    /// `floor(bandwidth / sub_channel_width)` evaluated to zero: the carrier
    /// would have an empty spectrum.
    DegenerateSpectrum { bandwidth: f64, sub_channel_width: f64 },
}

impl std::fmt::Display for CarrierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CarrierError::DegenerateSpectrum { bandwidth, sub_channel_width } => write!(
                f,
                "degenerate spectrum: bandwidth {} Hz / sub-channel width {} Hz yields zero sub-channels",
                bandwidth, sub_channel_width
            ),
        }
    }
}

impl std::error::Error for CarrierError {}

/// Strategy building a carrier from a raw payload at transmission time.
pub trait Perturbation {
    /// Build the in-flight carrier for `payload`, stamped with the current
    /// simulated time.
    fn create_carrier(&self, payload: &[u8], now: f64) -> Result<MessageCarrier, CarrierError>;
}

/// Null perturbation: the payload travels with no physical metadata.
pub struct DefaultPerturbation;

impl Perturbation for DefaultPerturbation {
    fn create_carrier(&self, payload: &[u8], _now: f64) -> Result<MessageCarrier, CarrierError> {
        Ok(MessageCarrier::bare(payload.to_vec()))
    }
}

/// Electromagnetic perturbation: spreads the configured transmit power evenly
/// over a contiguous sub-channel grid centered on the carrier frequency.
pub struct EmPerturbation {
    power_tx: f64,
    pulse_duration: f64,
    pulse_interval: f64,
    central_frequency: f64,
    bandwidth: f64,
    sub_channel_width: f64,
}

impl EmPerturbation {
    pub fn new(params: &EmParameters) -> Self {
        EmPerturbation {
            power_tx: params.power_tx,
            pulse_duration: params.pulse_duration,
            pulse_interval: params.pulse_interval,
            central_frequency: params.central_frequency,
            bandwidth: params.bandwidth,
            sub_channel_width: params.sub_channel_width,
        }
    }
}

impl Perturbation for EmPerturbation {
    /// Build an EM carrier.
    ///
    /// The number of sub-channels is `floor(bandwidth / sub_channel_width)`;
    /// each carries a flat spectral density of
    /// `power_tx / (sub_channels * sub_channel_width)` W/Hz. The total
    /// duration is the per-symbol pulse duration times the payload size.
    fn create_carrier(&self, payload: &[u8], now: f64) -> Result<MessageCarrier, CarrierError> {
        let sub_channels = (self.bandwidth / self.sub_channel_width) as usize;
        if sub_channels == 0 {
            return Err(CarrierError::DegenerateSpectrum {
                bandwidth: self.bandwidth,
                sub_channel_width: self.sub_channel_width,
            });
        }

        let start_frequency = self.central_frequency - self.sub_channel_width * sub_channels as f64 / 2.0;
        let frequencies: Vec<f64> = (0..sub_channels).map(|i| start_frequency + i as f64 * self.sub_channel_width).collect();

        let density = self.power_tx / (sub_channels as f64 * self.sub_channel_width);
        let spectrum = vec![density; sub_channels];

        let duration = self.pulse_duration * payload.len() as f64;

        log::debug!(
            "EM carrier: {} sub-channels around {} Hz, density {:.3e} W/Hz, duration {:.3e} s",
            sub_channels,
            self.central_frequency,
            density,
            duration
        );

        Ok(MessageCarrier::with_waveform(
            payload.to_vec(),
            EmWaveform {
                spectrum,
                frequencies,
                duration,
                pulse_duration: self.pulse_duration,
                pulse_interval: self.pulse_interval,
                start_time: now,
                central_frequency: self.central_frequency,
                bandwidth: self.bandwidth,
                sub_channel_width: self.sub_channel_width,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn spectrum_has_floor_b_over_w_flat_entries() {
        let perturbation = EmPerturbation::new(&em_params());
        let carrier = perturbation.create_carrier(&[0u8; 4], 0.5).unwrap();
        let waveform = carrier.waveform().unwrap();

        assert_eq!(waveform.spectrum.len(), 10);
        let expected = 1.0 / (10.0 * 1e5);
        for &density in &waveform.spectrum {
            assert!((density - expected).abs() < 1e-18);
        }
        assert_eq!(waveform.frequencies.len(), 10);
        // Grid is centered on the carrier frequency
        assert!((waveform.frequencies[0] - (2.4e9 - 5e5)).abs() < 1e-3);
        assert!((waveform.duration - 4e-6).abs() < 1e-18);
        assert!((waveform.start_time - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_sub_channels_is_a_configuration_error() {
        let mut params = em_params();
        params.bandwidth = 1e4; // narrower than one sub-channel
        let perturbation = EmPerturbation::new(&params);
        assert!(matches!(
            perturbation.create_carrier(&[0u8], 0.0),
            Err(CarrierError::DegenerateSpectrum { .. })
        ));
    }

    #[test]
    fn default_perturbation_wraps_payload_only() {
        let carrier = DefaultPerturbation.create_carrier(&[9, 8, 7], 0.0).unwrap();
        assert_eq!(carrier.payload(), &[9, 8, 7]);
        assert!(carrier.waveform().is_none());
    }
}
