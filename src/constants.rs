//! Application constants for the mdout processor
//!
//! Section header patterns, parser defaults and output naming used
//! throughout the crate.

// =============================================================================
// Section Headers
// =============================================================================

/// Any numbered section header, e.g. `   3.  ATOMIC COORDINATES AND VELOCITIES`
pub const SECTION_HEADER_PATTERN: &str = r"^   \d+\.";

/// Header opening the control data (simulation parameters) section
pub const PARAMETERS_HEADER_PATTERN: &str = r"^   \d+\.  CONTROL  DATA  FOR  THE  RUN";

/// Header opening the results (time series) section
pub const RESULTS_HEADER_PATTERN: &str = r"^   \d+\.  RESULTS";

/// Section names used in diagnostics
pub mod sections {
    pub const PARAMETERS: &str = "CONTROL DATA FOR THE RUN";
    pub const RESULTS: &str = "RESULTS";
}

// =============================================================================
// Parser Defaults
// =============================================================================

/// Lines beginning with this marker open a new time-series block
pub const DEFAULT_BLOCK_START: &str = " NSTEP";

/// Key used to detect trailing average/RMS rows
pub const DEFAULT_COUNTING_KEY: &str = "NSTEP";

/// Initial per-key array capacity before the first growth step
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Geometric growth applied when an array is full
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;

/// Keys starting with this prefix are never stored
pub const RESERVED_KEY_PREFIX: char = '|';

/// Number of trailing rows that mark average + RMS fluctuation output
pub const SUMMARY_MARKER_ROWS: usize = 3;

// =============================================================================
// CLI / Output Defaults
// =============================================================================

/// Default input file name
pub const DEFAULT_INPUT_FILE: &str = "mdout";

/// Default time series output file
pub const DEFAULT_OUTPUT_FILE: &str = "mdout.parquet";

/// Suffix for the average/RMS fluctuation table
pub const SUMMARY_FILE_SUFFIX: &str = "summary";

/// Suffix for the simulation parameter table
pub const PARAMETERS_FILE_SUFFIX: &str = "params";

/// Default compression for Parquet output
pub const DEFAULT_COMPRESSION: &str = "snappy";

/// Column names for the summary table
pub mod summary_columns {
    pub const NAME: &str = "name";
    pub const AVERAGE: &str = "average";
    pub const RMS_FLUCTUATION: &str = "rmsfluct";
}

/// Column names for the parameter table
pub mod parameter_columns {
    pub const NAME: &str = "name";
    pub const KIND: &str = "kind";
    pub const VALUE: &str = "value";
}
