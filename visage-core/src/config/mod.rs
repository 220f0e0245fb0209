//! Configuration types
//!
//! Deployment constants for the panel, the bus and the ear servos. Every
//! struct has a `Default` matching the reference hardware and a
//! `validate()` that rejects combinations the pipeline cannot run with.

pub mod bus;
pub mod display;
pub mod servo;

pub use bus::*;
pub use display::*;
pub use servo::*;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Panel width or height is zero
    EmptyPanel,
    /// Band height is zero or taller than the panel
    InvalidBandRows,
    /// Canvas (panel plus margins) does not fit the 16-bit address space
    CanvasTooLarge,
    /// Bus clock is zero
    InvalidClock,
    /// Bus queue cannot hold one complete band batch
    QueueTooShallow,
    /// Wait timeout is zero
    InvalidTimeout,
    /// Servo pulse widths are not ordered min < max <= period
    InvalidPulseRange,
    /// Servo angle range is zero
    InvalidAngleRange,
    /// Duty resolution outside 1..=16 bits
    InvalidResolution,
}
