//! Shared foundation for the Alumni Directory service
//!
//! Error type, configuration, credential/token primitives, and the
//! database layer (pool initialization, schema, models).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
