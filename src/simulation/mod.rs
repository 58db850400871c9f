//! Physical-layer simulation core.
//!
//! This module provides the dispatch machinery of the shared medium and the
//! pluggable strategies that give it physics. It integrates:
//! - The message carrier and its electromagnetic waveform metadata
//! - Strategy traits for perturbation, motion, and specificity, with a
//!   default and an electromagnetic implementation of each
//! - The medium: interface registry plus the per-destination dispatcher
//! - The discrete-event queue deliveries are scheduled into
//! - Static calibration tables for the electromagnetic model
//!
//! ## Module Organization
//!
//! - `carrier`: The in-flight transmission unit
//! - `field`: Environment descriptor handed to Motion strategies
//! - `perturbation`: Payload-to-carrier construction strategies
//! - `motion`: Delay and in-transit transformation strategies
//! - `specificity`: Receiver-side decodability strategies
//! - `medium`: Interface registry and dispatcher
//! - `scheduler`: (time, sequence)-ordered delivery queue
//! - `tables`: Path-loss and noise calibration data
//! - `signal_math`: dB/linear conversions
//!
//! ## Public API
//!
//! The driver builds a `Medium`, registers `CommunicationInterface`s, and
//! alternates `Medium::transmit_payload` with draining the `EventQueue`
//! through `Medium::deliver`.

pub mod carrier;
pub mod field;
pub mod medium;
pub mod motion;
pub mod perturbation;
pub mod scheduler;
pub mod signal_math;
pub mod specificity;
pub mod tables;

// Re-export the types a driver wires together
pub use carrier::MessageCarrier;
pub use field::Field;
pub use medium::{CommunicationInterface, InterfaceId, Medium};
pub use scheduler::EventQueue;
