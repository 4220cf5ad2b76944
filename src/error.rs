//! Error handling for mdout parsing operations.
//!
//! Provides error types carrying the offending line, key or block so that
//! malformed logs can be diagnosed without re-reading the input.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Malformed key/value pair at line {line_number} (key '{key}'): {reason}\n  {line}")]
    MalformedPair {
        line_number: usize,
        line: String,
        key: String,
        reason: String,
    },

    #[error(
        "Schema violation in block {block} (line {line_number}): missing keys [{}], unexpected keys [{}]",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    SchemaViolation {
        block: usize,
        line_number: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Type mismatch for key '{key}' in block {block}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        block: usize,
        expected: String,
        found: String,
    },

    #[error("Input ended inside the {section} section after {blocks_read} complete blocks")]
    PrematureEndOfInput {
        section: &'static str,
        blocks_read: usize,
    },

    #[error("Section not found in input: {section}")]
    MissingSection { section: &'static str },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to write output {path}: {reason}")]
    OutputFailed { path: PathBuf, reason: String },
}

impl MdoutError {
    /// Create a malformed pair error for a line
    pub fn malformed_pair(
        line_number: usize,
        line: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedPair {
            line_number,
            line: line.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MdoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_lists_keys() {
        let error = MdoutError::SchemaViolation {
            block: 3,
            line_number: 42,
            missing: vec!["EPtot".to_string(), "BOND".to_string()],
            unexpected: vec!["RESTRAINT".to_string()],
        };

        let message = error.to_string();
        assert!(message.contains("block 3"));
        assert!(message.contains("missing keys [EPtot, BOND]"));
        assert!(message.contains("unexpected keys [RESTRAINT]"));
    }

    #[test]
    fn test_malformed_pair_carries_line() {
        let error = MdoutError::malformed_pair(7, " BOND   =", "BOND", "missing value");

        match &error {
            MdoutError::MalformedPair {
                line_number, key, ..
            } => {
                assert_eq!(*line_number, 7);
                assert_eq!(key, "BOND");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains(" BOND   ="));
    }
}
