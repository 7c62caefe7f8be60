//! Infrastructure layer
//!
//! Handles all filesystem side effects: directory discovery, atomic
//! writes and the file-backed durable store.

pub mod dirs;
pub mod dump;
pub mod filesystem;
