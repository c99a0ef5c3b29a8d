//! HTTP surface of the pricing and availability engine.

pub mod app;
pub mod engine_handler;
pub mod error;
