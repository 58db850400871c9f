//! Molecular transport model.
//!
//! This module implements message transport by molecular motor: a motor
//! diffuses through the medium by Brownian motion, binds to microtubules it
//! drifts close to, and walks them toward the destination. It integrates:
//! - 3-D geometry primitives (points, segments, destination volumes)
//! - Reflective boundary surfaces the diffusing motor cannot cross
//! - Microtubule network generation with persistence-length stiffness
//! - The Brownian/tube-walk Motion strategy plugged into the medium
//!
//! ## Module Organization
//!
//! - `geometry`: Points, segments, boxes, and distance primitives
//! - `boundary`: Spherical reflective barriers
//! - `field`: Tube network generation, entropy metric, geometric queries
//! - `motion`: The molecular Motion strategy and its walk primitives

pub mod boundary;
pub mod field;
pub mod geometry;
pub mod motion;

pub use field::MicrotubuleField;
pub use motion::MolecularMotion;
