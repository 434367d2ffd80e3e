//! Shared utilities.
//!
//! - Constants and defaults
//! - Amount conversion between coins and minor units

pub mod constants;
pub mod convert;

pub use constants::*;
pub use convert::*;
