//! Parser configuration and validation.
//!
//! Provides the knobs that adapt the mdout scanner to variants of the log
//! format: the block marker, the key used for summary detection, per-key
//! type overrides and the array growth policy.

use crate::constants::{
    DEFAULT_BLOCK_START, DEFAULT_COUNTING_KEY, DEFAULT_GROWTH_FACTOR, DEFAULT_INITIAL_CAPACITY,
};
use crate::error::{MdoutError, Result};
use crate::models::ValueKind;
use indexmap::IndexMap;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Configuration for a parse run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Lines starting with this text open a time-series block
    pub block_start: String,

    /// Key inspected for trailing average/RMS rows
    pub counting_key: String,

    /// Forced types for specific time-series keys
    pub type_overrides: IndexMap<String, ValueKind>,

    /// Type for time-series keys without an override; `None` infers it
    /// from the first value seen for the key
    pub time_series_default: Option<ValueKind>,

    /// Rows reserved per key when the first block is seen
    pub initial_capacity: usize,

    /// Multiplier applied to a full array before the next write
    pub growth_factor: f64,

    /// Treat input that ends mid-section as an error instead of a warning
    pub strict: bool,

    /// Split trailing average/RMS rows into summary statistics
    pub extract_summary: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let mut type_overrides = IndexMap::new();
        type_overrides.insert(DEFAULT_COUNTING_KEY.to_string(), ValueKind::Integer);

        Self {
            block_start: DEFAULT_BLOCK_START.to_string(),
            counting_key: DEFAULT_COUNTING_KEY.to_string(),
            type_overrides,
            time_series_default: Some(ValueKind::Float),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            strict: false,
            extract_summary: true,
        }
    }
}

impl ParserConfig {
    /// Use a different block marker
    pub fn with_block_start(mut self, block_start: impl Into<String>) -> Self {
        self.block_start = block_start.into();
        self
    }

    /// Use a different counting key for summary detection
    pub fn with_counting_key(mut self, counting_key: impl Into<String>) -> Self {
        self.counting_key = counting_key.into();
        self
    }

    /// Force the type of a time-series key
    pub fn with_type_override(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.type_overrides.insert(key.into(), kind);
        self
    }

    /// Set the type used for keys without an override
    pub fn with_time_series_default(mut self, kind: ValueKind) -> Self {
        self.time_series_default = Some(kind);
        self
    }

    /// Type time-series keys from their first value instead of a fixed default
    pub fn with_inferred_time_series(mut self) -> Self {
        self.time_series_default = None;
        self
    }

    /// Set initial capacity and growth factor for the per-key arrays
    pub fn with_growth(mut self, initial_capacity: usize, growth_factor: f64) -> Self {
        self.initial_capacity = initial_capacity;
        self.growth_factor = growth_factor;
        self
    }

    /// Fail on truncated input
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Keep trailing average/RMS rows in the arrays
    pub fn without_summary(mut self) -> Self {
        self.extract_summary = false;
        self
    }

    /// Capacity to grow a full array of `capacity` rows to
    pub fn next_capacity(&self, capacity: usize) -> usize {
        let grown = (capacity as f64 * self.growth_factor) as usize;
        grown.max(capacity + 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_start.is_empty() {
            return Err(MdoutError::configuration("block start marker must not be empty"));
        }
        if self.counting_key.trim().is_empty() {
            return Err(MdoutError::configuration("counting key must not be empty"));
        }
        if self.initial_capacity == 0 {
            return Err(MdoutError::configuration(
                "initial capacity must be at least 1",
            ));
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(MdoutError::configuration(format!(
                "growth factor must be a finite number greater than 1.0, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }
}

/// Compression used for the Parquet output files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = MdoutError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(MdoutError::configuration(format!(
                "unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                other
            ))),
        }
    }
}
