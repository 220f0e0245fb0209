//! Ear servo arithmetic
//!
//! Converts a commanded angle into a pulse width and then into a timer
//! duty value. The two [`DutyPolicy`] variants differ only for angles
//! strictly between the endpoints. Every entry point validates the
//! configuration first.

use crate::config::{ConfigError, DutyPolicy, ServoConfig};

/// Pulse width in microseconds for `angle_deg`
///
/// Angles past `max_angle_deg` are clamped.
pub fn pulse_us(angle_deg: u16, config: &ServoConfig) -> Result<u32, ConfigError> {
    config.validate()?;
    let max_angle = config.max_angle_deg as u64;
    let angle = (angle_deg as u64).min(max_angle);
    let span = (config.max_pulse_us - config.min_pulse_us) as u64;
    // span fits in u32, so the quotient does too
    let scaled = (span * angle / max_angle) as u32;

    Ok(match config.policy {
        DutyPolicy::PinnedEndpoints => {
            if angle == 0 {
                config.min_pulse_us
            } else if angle == max_angle {
                config.max_pulse_us
            } else {
                scaled
            }
        }
        DutyPolicy::Linear => config.min_pulse_us + scaled,
    })
}

/// Timer duty value for a pulse width, truncated
pub fn duty_for_pulse(pulse_us: u32, config: &ServoConfig) -> Result<u32, ConfigError> {
    config.validate()?;
    Ok((pulse_us as u64 * config.duty_max() as u64 / config.period_us as u64) as u32)
}

/// Timer duty value for `angle_deg`
pub fn angle_to_duty(angle_deg: u16, config: &ServoConfig) -> Result<u32, ConfigError> {
    duty_for_pulse(pulse_us(angle_deg, config)?, config)
}
