//! Core components for the vlogging system.
//!
//! ### [`error`] - Error handling
//! A single [`LogError`] enum covers every apply-time rejection, with
//! [`LogResult`] as the crate-wide result alias.

pub mod error;

pub use error::{LogError, LogResult};
