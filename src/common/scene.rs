//! Scene loading, parsing, and validation logic.
//!
//! A scene JSON file describes one simulation setup: the devices sharing the
//! medium, which physical model the medium uses, and the parameters of that
//! model. Validation runs before anything is built so that configuration
//! errors fail fast instead of surfacing as degenerate carriers or walks.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

use crate::molecular::field::TubeCharacteristics;
use crate::molecular::geometry::Point3;
use crate::molecular::motion::MolecularParameters;

/// Error type for scene loading failures.
#[derive(Debug)]
pub enum SceneLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            SceneLoadError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
            SceneLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Which physical model the medium applies to carriers in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediumModel {
    /// No motion strategy: zero delay, carrier unchanged, accept always.
    Default,
    /// Wave propagation with calibrated path loss and Shannon acceptance.
    Electromagnetic,
    /// Molecular motor transport over a microtubule network.
    Molecular,
}

/// Parameters of the electromagnetic link shared by the perturbation, motion,
/// and specificity strategies. A deployment configures transmitter and
/// receiver from the same set.
#[derive(Debug, Clone, Deserialize)]
pub struct EmParameters {
    /// Transmit power (W), spread evenly over the sub-channel grid.
    pub power_tx: f64,
    /// Duration of one pulse (s); total carrier duration is this times the
    /// payload size.
    pub pulse_duration: f64,
    /// Interval between pulses (s); its reciprocal is the symbol rate the
    /// Shannon check must support.
    pub pulse_interval: f64,
    /// Center frequency of the link (Hz).
    pub central_frequency: f64,
    /// Total occupied bandwidth (Hz).
    pub bandwidth: f64,
    /// Width of one sub-channel (Hz).
    pub sub_channel_width: f64,
    /// Propagation speed of the wave in the medium (m/s).
    pub wave_speed: f64,
}

/// One communicating device: identity plus position in the medium.
///
/// Coordinates are interpreted in the unit system of the configured model:
/// meters for the electromagnetic medium, nanometers for the molecular one.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub device_id: u32,
    pub position: Point3,
}

/// A spherical reflective barrier of the molecular medium.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryConfig {
    pub center: Point3,
    pub radius: f64,
}

/// Root structure representing the entire scene.
#[derive(Deserialize)]
pub struct Scene {
    /// Physical model of the medium.
    pub medium_model: MediumModel,
    /// EM link parameters (required for the electromagnetic model).
    #[serde(default)]
    pub em_parameters: Option<EmParameters>,
    /// Molecular transport parameters (required for the molecular model).
    #[serde(default)]
    pub molecular_parameters: Option<MolecularParameters>,
    /// Microtubule network characteristics (required for the molecular model).
    #[serde(default)]
    pub tube_characteristics: Option<TubeCharacteristics>,
    /// Reflective boundary surfaces of the molecular medium.
    #[serde(default)]
    pub boundaries: Vec<BoundaryConfig>,
    /// All devices present in the scene.
    pub devices: Vec<DeviceConfig>,
}

/// Load and parse a scene from a file.
///
/// # Parameters
///
/// * `path` - Path to the scene JSON file
///
/// # Returns
///
/// Parsed and validated Scene or an error.
pub fn load_scene(path: &str) -> Result<Scene, SceneLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))
        .map_err(|e| SceneLoadError::FileReadError(e.to_string()))?;

    let scene: Scene = serde_json::from_str(&data)
        .context("Invalid JSON format")
        .map_err(|e| SceneLoadError::ParseError(e.to_string()))?;

    validate_scene(&scene).map_err(SceneLoadError::ValidationError)?;

    Ok(scene)
}

/// Validate scene configuration.
///
/// Checks for issues that would otherwise cause confusing runtime behavior:
/// missing model parameters, non-positive physical quantities, a sub-channel
/// grid that evaluates to zero channels, duplicate device IDs.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description
/// otherwise.
pub fn validate_scene(scene: &Scene) -> Result<(), String> {
    const MAX_DEVICES: usize = 10000;

    if scene.devices.is_empty() {
        return Err("Scene must contain at least one device".to_string());
    }
    if scene.devices.len() > MAX_DEVICES {
        return Err(format!("Device count {} exceeds maximum of {}", scene.devices.len(), MAX_DEVICES));
    }

    // Check for duplicate device IDs
    let mut device_ids = HashSet::new();
    for device in &scene.devices {
        if !device_ids.insert(device.device_id) {
            return Err(format!("Duplicate device_id found: {}", device.device_id));
        }
    }

    match scene.medium_model {
        MediumModel::Default => {}
        MediumModel::Electromagnetic => {
            let em = scene
                .em_parameters
                .as_ref()
                .ok_or_else(|| "Electromagnetic model requires 'em_parameters'".to_string())?;
            validate_em_parameters(em)?;
        }
        MediumModel::Molecular => {
            let mol = scene
                .molecular_parameters
                .as_ref()
                .ok_or_else(|| "Molecular model requires 'molecular_parameters'".to_string())?;
            validate_molecular_parameters(mol)?;

            let tubes = scene
                .tube_characteristics
                .as_ref()
                .ok_or_else(|| "Molecular model requires 'tube_characteristics'".to_string())?;
            validate_tube_characteristics(tubes)?;
        }
    }

    for (idx, boundary) in scene.boundaries.iter().enumerate() {
        if boundary.radius <= 0.0 {
            return Err(format!("Boundary {} has non-positive radius {}", idx, boundary.radius));
        }
    }

    Ok(())
}

fn validate_em_parameters(em: &EmParameters) -> Result<(), String> {
    if em.power_tx <= 0.0 {
        return Err("Invalid power_tx, must be positive".to_string());
    }
    if em.pulse_duration <= 0.0 || em.pulse_interval <= 0.0 {
        return Err("Invalid pulse timing, durations must be positive".to_string());
    }
    if em.central_frequency <= 0.0 {
        return Err("Invalid central_frequency, must be positive".to_string());
    }
    if em.bandwidth <= 0.0 || em.sub_channel_width <= 0.0 {
        return Err("Invalid bandwidth/sub_channel_width, must be positive".to_string());
    }
    // The same degenerate-spectrum condition the perturbation would reject,
    // caught before the run starts
    if (em.bandwidth / em.sub_channel_width) as usize == 0 {
        return Err(format!(
            "Degenerate spectrum: bandwidth {} Hz / sub_channel_width {} Hz yields zero sub-channels",
            em.bandwidth, em.sub_channel_width
        ));
    }
    if em.wave_speed <= 0.0 {
        return Err("Invalid wave_speed, must be positive".to_string());
    }
    Ok(())
}

fn validate_molecular_parameters(mol: &MolecularParameters) -> Result<(), String> {
    if mol.diffusion_coefficient <= 0.0 {
        return Err("Invalid diffusion_coefficient, must be positive".to_string());
    }
    if mol.time_step <= 0.0 {
        return Err("Invalid time_step, must be positive".to_string());
    }
    if mol.capture_radius <= 0.0 {
        return Err("Invalid capture_radius, must be positive".to_string());
    }
    if mol.movement_rate <= 0.0 {
        return Err("Invalid movement_rate, must be positive".to_string());
    }
    if !(0.0..=1.0).contains(&mol.binding_probability) {
        return Err(format!("Invalid binding_probability {}, must be within 0-1", mol.binding_probability));
    }
    if mol.float_step_budget == 0 || mol.transit_cycle_budget == 0 {
        return Err("Invalid walk budgets, must be at least 1".to_string());
    }
    if mol.destination_half_extent <= 0.0 {
        return Err("Invalid destination_half_extent, must be positive".to_string());
    }
    Ok(())
}

fn validate_tube_characteristics(tubes: &TubeCharacteristics) -> Result<(), String> {
    if tubes.num_tubes == 0 || tubes.segments_per_tube == 0 {
        return Err("Invalid tube counts, must be at least 1 tube and 1 segment per tube".to_string());
    }
    if tubes.tube_length <= 0.0 {
        return Err("Invalid tube_length, must be positive".to_string());
    }
    if tubes.persistence_length <= 0.0 {
        return Err("Invalid persistence_length, must be positive".to_string());
    }
    if tubes.volume <= 0.0 {
        return Err("Invalid volume, must be positive".to_string());
    }
    if tubes.density <= 0.0 {
        return Err("Invalid density, must be positive".to_string());
    }
    Ok(())
}
