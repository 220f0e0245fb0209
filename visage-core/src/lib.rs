//! Board-agnostic image pipeline for the Visage face display
//!
//! This crate contains everything between a compressed face asset and the
//! bytes that leave on the display bus, without depending on a specific
//! chip:
//!
//! - Streaming baseline JPEG decoder (pull input / push rectangles)
//! - Margin-aware pixel canvas and band renderer
//! - Double-buffered band transport with a wait-before-reuse fence
//! - Render session tying decode and transport together
//! - Servo duty arithmetic for the ear actuators
//! - Configuration type definitions
//!
//! # Architecture
//!
//! ```text
//! asset ──► jpeg::BaselineDecoder ──► image::PixelBuffer
//!                                          │ per band
//!                                          ▼
//!                          image::render_band ──► slot ──► traits::DisplayBus
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod image;
pub mod jpeg;
pub mod servo;
pub mod session;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::RenderError;
pub use session::{FaceSet, ImagePipeline};
