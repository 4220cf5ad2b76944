//! Command-line interface components.

use crate::config::{CompressionAlgorithm, ParserConfig};
use crate::constants::{
    DEFAULT_BLOCK_START, DEFAULT_COMPRESSION, DEFAULT_COUNTING_KEY, DEFAULT_INPUT_FILE,
    DEFAULT_OUTPUT_FILE,
};
use crate::error::Result;
use crate::models::ValueKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdout-processor")]
#[command(about = "Extract time series and run parameters from AMBER mdout logs into Parquet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// mdout log to parse
    #[arg(value_name = "MDOUT", default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Parquet file for the time series; summary and parameter tables are
    /// written next to it
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Text that opens a results block (leading whitespace is significant)
    #[arg(long, default_value = DEFAULT_BLOCK_START, allow_hyphen_values = true)]
    pub block_start: String,

    /// Key checked for the trailing average/RMS rows
    #[arg(long, default_value = DEFAULT_COUNTING_KEY)]
    pub counting_key: String,

    /// Store this time-series key as integers (repeatable)
    #[arg(long = "int-key", value_name = "KEY")]
    pub int_keys: Vec<String>,

    /// Fail when the log ends before the run finished
    #[arg(long)]
    pub strict: bool,

    /// Keep the average/RMS rows in the time series
    #[arg(long)]
    pub no_summary: bool,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = DEFAULT_COMPRESSION)]
    pub compression: String,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Parser configuration from the flags
    pub fn parser_config(&self) -> Result<ParserConfig> {
        let mut config = ParserConfig::default()
            .with_block_start(self.block_start.as_str())
            .with_counting_key(self.counting_key.as_str())
            .with_type_override(self.counting_key.as_str(), ValueKind::Integer);

        for key in &self.int_keys {
            config = config.with_type_override(key.as_str(), ValueKind::Integer);
        }
        if self.strict {
            config = config.with_strict();
        }
        if self.no_summary {
            config = config.without_summary();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn compression(&self) -> Result<CompressionAlgorithm> {
        self.compression.parse()
    }
}
