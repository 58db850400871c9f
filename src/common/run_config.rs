//! Run settings loaded from an optional TOML file next to the scene.
//!
//! The scene describes the physics; the run config describes one execution of
//! it: the RNG seed, which devices transmit, the payload they send, and where
//! geometry exports go. Every field has a default so a missing file simply
//! runs the standard scenario.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for one simulator run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed for every random source of the run.
    pub seed: u64,
    /// Payload size (bytes) of each injected transmission.
    pub payload_size: usize,
    /// Device IDs that transmit once each, in order. Empty means every
    /// device transmits once.
    pub transmitters: Vec<u32>,
    /// Directory geometry exports are written to. None disables export.
    pub export_dir: Option<String>,
    /// Persistence lengths (nm) to sweep for the entropy study. Empty
    /// disables the sweep.
    pub persistence_sweep: Vec<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: 42,
            payload_size: 1,
            transmitters: Vec::new(),
            export_dir: None,
            persistence_sweep: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Load run settings from a TOML file.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` if the file was successfully loaded and parsed
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load the config next to the scene file, falling back to defaults when
    /// no config file exists.
    pub fn load_for_scene(scene_path: &str) -> Result<Self, String> {
        let path = Self::config_path_from_scene(scene_path);
        if path.exists() { Self::load(&path) } else { Ok(RunConfig::default()) }
    }

    /// Derive the config path from a scene file path.
    ///
    /// Replaces the scene filename with "config.toml" in the same directory.
    pub fn config_path_from_scene(scene_path: &str) -> PathBuf {
        let scene = Path::new(scene_path);
        scene.parent().unwrap_or(Path::new(".")).join("config.toml")
    }
}
