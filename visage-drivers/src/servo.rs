//! Ear servo on a PWM channel
//!
//! The channel must already run at the configured period (50 Hz for the
//! default ears). Duty values are computed at the configured timer
//! resolution and handed to the channel as a fraction, so the channel's
//! own resolution does not need to match.

use embedded_hal::pwm::SetDutyCycle;
use visage_core::config::{ConfigError, ServoConfig};
use visage_core::servo::angle_to_duty;

/// Servo errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Configuration rejected
    Config(ConfigError),
    /// PWM channel refused the duty cycle
    Pwm,
}

/// Hobby servo driven by pulse width
pub struct ServoMotor<P> {
    pwm: P,
    config: ServoConfig,
    /// Last commanded angle
    angle: Option<u16>,
}

impl<P: SetDutyCycle> ServoMotor<P> {
    pub fn new(pwm: P, config: ServoConfig) -> Result<Self, ServoError> {
        config.validate().map_err(ServoError::Config)?;
        Ok(Self {
            pwm,
            config,
            angle: None,
        })
    }

    /// Move to `angle_deg`; returns the duty value applied
    pub fn set_angle(&mut self, angle_deg: u16) -> Result<u32, ServoError> {
        let duty = angle_to_duty(angle_deg, &self.config).map_err(ServoError::Config)?;
        self.pwm
            .set_duty_cycle_fraction(duty as u16, self.config.duty_max() as u16)
            .map_err(|_| ServoError::Pwm)?;
        self.angle = Some(angle_deg.min(self.config.max_angle_deg));
        Ok(duty)
    }

    /// Stop driving the servo
    pub fn detach(&mut self) -> Result<(), ServoError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ServoError::Pwm)?;
        self.angle = None;
        Ok(())
    }

    /// Last commanded angle, `None` when detached
    pub fn angle(&self) -> Option<u16> {
        self.angle
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    pub fn release(self) -> P {
        self.pwm
    }
}
