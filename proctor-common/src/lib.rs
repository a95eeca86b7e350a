//! Shared foundation for the Proctor services.
//!
//! Provides the unified error taxonomy, configuration loading, and
//! logging initialization used by the store, engine, API, and CLI crates.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
