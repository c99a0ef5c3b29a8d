//! Shared configuration, error and value types for the Stayline pricing and
//! availability engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod util;
