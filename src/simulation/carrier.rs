//! Message carrier: the in-flight representation of a transmission.
//!
//! A carrier owns the opaque payload handed to the transmit call plus the
//! physical metadata the configured model attached to it. The electromagnetic
//! model extends the carrier with a power-spectral-density vector over a
//! discrete set of sub-channels; propagation attenuates that spectrum in
//! place. Carriers are owned by their in-flight delivery event and never
//! shared across concurrent transmissions.

/// Electromagnetic waveform metadata attached to a carrier by the EM
/// perturbation strategy. All times in seconds, frequencies in Hz, spectral
/// densities in W/Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct EmWaveform {
    /// Power spectral density, one entry per sub-channel.
    pub spectrum: Vec<f64>,
    /// Center frequency of each sub-channel, ascending.
    pub frequencies: Vec<f64>,
    /// Total transmission duration (pulse duration x payload size).
    pub duration: f64,
    /// Duration of a single pulse.
    pub pulse_duration: f64,
    /// Interval between pulses; its reciprocal is the symbol rate.
    pub pulse_interval: f64,
    /// Simulated time the transmission started.
    pub start_time: f64,
    pub central_frequency: f64,
    pub bandwidth: f64,
    pub sub_channel_width: f64,
}

/// The in-flight transmission unit: opaque payload plus optional physical
/// metadata. Built by a Perturbation strategy, transformed by a Motion
/// strategy during propagation, read-only after delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageCarrier {
    payload: Vec<u8>,
    waveform: Option<EmWaveform>,
}

impl MessageCarrier {
    /// A bare carrier with no physical metadata (default perturbation).
    pub fn bare(payload: Vec<u8>) -> Self {
        MessageCarrier { payload, waveform: None }
    }

    /// A carrier with an electromagnetic waveform attached.
    pub fn with_waveform(payload: Vec<u8>, waveform: EmWaveform) -> Self {
        MessageCarrier {
            payload,
            waveform: Some(waveform),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Unwrap the payload for delivery to the upper layer.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn waveform(&self) -> Option<&EmWaveform> {
        self.waveform.as_ref()
    }

    pub fn waveform_mut(&mut self) -> Option<&mut EmWaveform> {
        self.waveform.as_mut()
    }
}
