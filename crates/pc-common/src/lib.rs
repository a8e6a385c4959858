//! provconf common types and errors.
//!
//! This crate provides foundational types shared across the provconf crates:
//! - The unified error type and its numeric codes
//! - Config instance identity used to key the provenance ledger

pub mod error;
pub mod id;

pub use error::{Error, Result};
pub use id::ConfigId;
