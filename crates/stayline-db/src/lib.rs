//! Postgres persistence for the pricing and availability engine.
//!
//! `db` holds the schema, pool, transaction helper, migrations and query
//! modules; `model` holds the row types those queries read and write.

pub mod db;
pub mod error;
pub mod model;
