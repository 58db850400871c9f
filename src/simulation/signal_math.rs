//! Power-scale conversions shared by the electromagnetic strategies.
//!
//! The path-loss and noise calibration tables are expressed in decibels while
//! carrier spectra are linear (W/Hz), so the EM motion and specificity
//! strategies convert back and forth at every sub-channel.

/// Boltzmann constant (J/K), used to turn the noise-temperature table into a
/// noise power.
pub const BOLTZMANN: f64 = 1.380658e-23;

/// log2(10), for Shannon-capacity accumulation in decibel form.
pub const LOG2_10: f64 = 3.321928094887362;

/// Convert a linear power quantity to decibels.
///
/// # Formula
///
/// ```text
/// P(dB) = 10 x log10(P)
/// ```
///
/// For `linear <= 0` the result is NaN or -inf; spectra are validated to be
/// positive before any conversion.
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Convert a decibel quantity back to linear scale.
///
/// # Formula
///
/// ```text
/// P = 10^(P(dB) / 10)
/// ```
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}
