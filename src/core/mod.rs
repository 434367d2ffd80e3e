//! Core modules for the gateway.
//!
//! - Configuration
//! - Value types shared between the node layer and the coin services

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
