//! Hardware seams
//!
//! The core never touches a peripheral directly. Boards provide these
//! traits; `visage-drivers` has implementations over `embedded-hal`.

pub mod bus;

pub use bus::*;
