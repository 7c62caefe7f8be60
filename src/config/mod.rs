//! Configuration and constants
//!
//! - [`defaults`] - Timing, naming and format defaults

pub mod defaults;
