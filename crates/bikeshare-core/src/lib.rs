//! Shared domain layer for the bikeshare explorer.
//!
//! Holds the error taxonomy, the city/month/day vocabularies and record
//! types, timestamp parsing, the counting helpers every aggregator relies on,
//! command-line settings and plain-text report rendering.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{BikeshareError, Result};
