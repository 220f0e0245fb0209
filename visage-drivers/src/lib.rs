//! Hardware driver implementations
//!
//! Concrete implementations of the seams in visage-core over
//! `embedded-hal` 1.0:
//!
//! - Display bus on an SPI device plus a D/C pin
//! - Ear servo on a PWM channel

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bus;
pub mod servo;
