//! Ear servo parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Shortest pulse the ears are driven with
pub const SERVO_MIN_PULSE_US: u32 = 60;

/// Longest pulse the ears are driven with
pub const SERVO_MAX_PULSE_US: u32 = 2_100;

/// PWM period (50 Hz)
pub const SERVO_PERIOD_US: u32 = 20_000;

/// Full travel
pub const SERVO_MAX_ANGLE_DEG: u16 = 180;

/// Timer resolution
pub const SERVO_DUTY_BITS: u8 = 13;

/// How an angle maps onto the pulse range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DutyPolicy {
    /// Endpoints hit min and max exactly; angles in between scale the span
    /// without the min offset
    #[default]
    PinnedEndpoints,
    /// Straight line from min to max
    Linear,
}

/// Servo configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Pulse width at 0°
    pub min_pulse_us: u32,
    /// Pulse width at `max_angle_deg`
    pub max_pulse_us: u32,
    /// PWM period
    pub period_us: u32,
    /// Largest commanded angle
    pub max_angle_deg: u16,
    /// Duty resolution in bits
    pub duty_bits: u8,
    /// Angle mapping
    pub policy: DutyPolicy,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: SERVO_MIN_PULSE_US,
            max_pulse_us: SERVO_MAX_PULSE_US,
            period_us: SERVO_PERIOD_US,
            max_angle_deg: SERVO_MAX_ANGLE_DEG,
            duty_bits: SERVO_DUTY_BITS,
            policy: DutyPolicy::PinnedEndpoints,
        }
    }
}

impl ServoConfig {
    /// Largest duty value at the configured resolution
    pub fn duty_max(&self) -> u32 {
        (1u32 << self.duty_bits) - 1
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pulse_us >= self.max_pulse_us || self.max_pulse_us > self.period_us {
            return Err(ConfigError::InvalidPulseRange);
        }
        if self.max_angle_deg == 0 {
            return Err(ConfigError::InvalidAngleRange);
        }
        if self.duty_bits == 0 || self.duty_bits > 16 {
            return Err(ConfigError::InvalidResolution);
        }
        Ok(())
    }
}
