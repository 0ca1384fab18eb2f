//! Data layer for the bikeshare explorer.
//!
//! Reads a city's CSV file, derives calendar fields, applies the month and
//! day filters, computes the four statistics sections and runs the
//! top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod enrichment;
pub mod filter;
pub mod reader;

pub use bikeshare_core as core;
