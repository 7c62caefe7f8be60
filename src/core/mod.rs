//! Core cache logic
//!
//! The caches reach durable storage only through the
//! [`store::DurableStore`] trait; the file-backed implementation lives in
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`ephemeral`] - In-process cache with strong and weak slots
//! - [`write_behind`] - Buffered persistence with a background drain task
//! - [`lifo`] - Pending-write stack
//! - [`scheduler`] - Periodic background task
//! - [`store`] - Durable store and snapshot contracts
//! - [`cache`] - Artifact statistics and cleaning
//! - [`global_config`] - Global configuration management
//! - [`context`] - Application-wide cache instances

pub mod cache;
pub mod context;
pub mod ephemeral;
pub mod global_config;
pub mod lifo;
pub mod scheduler;
pub mod store;
pub mod write_behind;
