//! Visage display protocol
//!
//! This crate defines what travels over the two narrow links of the face
//! display: the SPI link to the panel controller and the control channel
//! that selects which face to show.
//!
//! # Panel framing
//!
//! Every band of pixel rows is sent as one batch of six bus transactions:
//! ```text
//! ┌──────┬───────────────┬──────┬───────────────┬──────┬──────────────┐
//! │ 0x2A │ col start/end │ 0x2B │ row start/end │ 0x2C │ pixel words  │
//! │ cmd  │ 4B data       │ cmd  │ 4B data       │ cmd  │ rows × width │
//! └──────┴───────────────┴──────┴───────────────┴──────┴──────────────┘
//! ```
//!
//! The batch is only meaningful as a whole and is never split.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod lcd;
pub mod mood;

pub use lcd::{BandFrame, Transaction, TRANSACTIONS_PER_BAND};
pub use mood::{Mood, MoodError, MOOD_COUNT};
