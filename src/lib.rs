//! mdout Processor Library
//!
//! A Rust library for extracting data from AMBER molecular dynamics output
//! logs (mdout) and storing it as Apache Parquet files.
//!
//! This library provides tools for:
//! - Reading the `CONTROL  DATA  FOR  THE  RUN` section into typed parameters
//! - Collecting every energy block of the `RESULTS` section into per-key arrays
//! - Separating the trailing average and RMS fluctuation rows of finished runs
//! - Tolerating logs of simulations that are still running
//! - Writing time series, summary and parameter tables with polars

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod writer;

// Re-export commonly used types
pub use config::{CompressionAlgorithm, ParserConfig};
pub use error::{MdoutError, Result};
pub use models::{
    ParseOutput, ParseStats, ParseWarning, Series, SummaryStatistics, TimeSeries, Value,
    ValueKind,
};
pub use parser::MdoutParser;
pub use writer::{ParquetOutput, WriteReport};
