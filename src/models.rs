//! Core data structures and types for mdout parsing.
//!
//! Defines typed scalar values, per-key monomorphic series, the summary
//! statistics split off the end of a run, and the overall parse result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of an inferred scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Integer,
    Boolean,
    Text,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed scalar read from the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            Value::Boolean(_) | Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Monomorphic array of values for a single time-series key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Series {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    Boolean(Vec<bool>),
    Text(Vec<String>),
}

impl Series {
    /// Create an empty series with room for `capacity` rows
    pub fn with_capacity(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Float => Series::Float(Vec::with_capacity(capacity)),
            ValueKind::Integer => Series::Integer(Vec::with_capacity(capacity)),
            ValueKind::Boolean => Series::Boolean(Vec::with_capacity(capacity)),
            ValueKind::Text => Series::Text(Vec::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Series::Float(_) => ValueKind::Float,
            Series::Integer(_) => ValueKind::Integer,
            Series::Boolean(_) => ValueKind::Boolean,
            Series::Text(_) => ValueKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Series::Float(v) => v.len(),
            Series::Integer(v) => v.len(),
            Series::Boolean(v) => v.len(),
            Series::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            Series::Float(v) => v.capacity(),
            Series::Integer(v) => v.capacity(),
            Series::Boolean(v) => v.capacity(),
            Series::Text(v) => v.capacity(),
        }
    }

    /// Reserve exactly enough room for `capacity` rows in total
    pub fn grow_to(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.len());
        match self {
            Series::Float(v) => v.reserve_exact(additional),
            Series::Integer(v) => v.reserve_exact(additional),
            Series::Boolean(v) => v.reserve_exact(additional),
            Series::Text(v) => v.reserve_exact(additional),
        }
    }

    /// Drop spare capacity so the backing storage matches the row count
    pub fn shrink_to_fit(&mut self) {
        match self {
            Series::Float(v) => v.shrink_to_fit(),
            Series::Integer(v) => v.shrink_to_fit(),
            Series::Boolean(v) => v.shrink_to_fit(),
            Series::Text(v) => v.shrink_to_fit(),
        }
    }

    pub fn truncate(&mut self, len: usize) {
        match self {
            Series::Float(v) => v.truncate(len),
            Series::Integer(v) => v.truncate(len),
            Series::Boolean(v) => v.truncate(len),
            Series::Text(v) => v.truncate(len),
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Series::Float(v) => v.get(index).map(|x| Value::Float(*x)),
            Series::Integer(v) => v.get(index).map(|x| Value::Integer(*x)),
            Series::Boolean(v) => v.get(index).map(|x| Value::Boolean(*x)),
            Series::Text(v) => v.get(index).map(|x| Value::Text(x.clone())),
        }
    }

    /// Last `n` values, oldest first
    pub fn tail(&self, n: usize) -> Vec<Value> {
        let len = self.len();
        (len.saturating_sub(n)..len)
            .filter_map(|index| self.get(index))
            .collect()
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Series::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Series::Integer(v) => Some(v),
            _ => None,
        }
    }
}

/// Per-key arrays collected from the results section, in first-seen key order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub(crate) columns: IndexMap<String, Series>,
    pub(crate) rows: usize,
}

impl TimeSeries {
    /// Number of rows (blocks) held by every column
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.columns.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn key_count(&self) -> usize {
        self.columns.len()
    }
}

/// Average and RMS fluctuation rows split off the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub averages: IndexMap<String, Value>,
    pub rms_fluctuations: IndexMap<String, Value>,
}

impl SummaryStatistics {
    pub fn is_empty(&self) -> bool {
        self.averages.is_empty() && self.rms_fluctuations.is_empty()
    }

    /// Average and RMS fluctuation for one key
    pub fn get(&self, key: &str) -> Option<(&Value, &Value)> {
        Some((self.averages.get(key)?, self.rms_fluctuations.get(key)?))
    }
}

/// Recoverable conditions met while parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseWarning {
    /// Input ended before the section's closing header
    PrematureEndOfInput {
        section: String,
        blocks_read: usize,
    },
    /// A block was opened but input ended before it completed
    PartialBlockDiscarded { block: usize, line_number: usize },
    /// A float cell could not be parsed and was stored as NaN
    UnparsableFloat {
        key: String,
        block: usize,
        raw: String,
    },
    /// The control data section was complete but no results section followed
    MissingResults,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::PrematureEndOfInput {
                section,
                blocks_read,
            } => write!(
                f,
                "input ended inside the {section} section after {blocks_read} complete blocks"
            ),
            ParseWarning::PartialBlockDiscarded { block, line_number } => write!(
                f,
                "discarded incomplete block {block} starting at line {line_number}"
            ),
            ParseWarning::UnparsableFloat { key, block, raw } => {
                write!(f, "stored NaN for '{key}' in block {block} (raw value '{raw}')")
            }
            ParseWarning::MissingResults => f.write_str("no results section found"),
        }
    }
}

/// Parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    pub lines_read: usize,
    pub blocks_parsed: usize,
    pub partial_blocks_discarded: usize,
    pub summary_detected: bool,
}

/// Everything extracted from one mdout log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub parameters: IndexMap<String, Value>,
    pub time_series: TimeSeries,
    pub summary: SummaryStatistics,
    pub warnings: Vec<ParseWarning>,
    pub stats: ParseStats,
}

impl ParseOutput {
    /// True when the whole log was read without recoverable problems
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
