//! Results section parser
//!
//! Scans for lines starting with the block marker, reads each block of
//! `=` lines into a pending map and appends it to per-key arrays. The key set
//! of the first block fixes the schema for the rest of the section.

use super::inference::TypeInferencer;
use super::lines::{LineClassifier, LineKind, LineReader, is_assignment};
use super::pairs::split_time_series_line;
use super::parameters::SectionEnd;
use crate::config::ParserConfig;
use crate::error::{MdoutError, Result};
use crate::models::{ParseWarning, Series, TimeSeries, Value, ValueKind};
use indexmap::IndexMap;
use std::io::BufRead;
use tracing::{debug, warn};

/// Values of one reporting step
pub type TimeSeriesBlock = IndexMap<String, Value>;

/// Result of scanning the results section
#[derive(Debug)]
pub struct TimeSeriesOutcome {
    pub time_series: TimeSeries,
    pub end: SectionEnd,
    /// Line number of a block cut off by the end of input
    pub partial_block_line: Option<usize>,
    pub warnings: Vec<ParseWarning>,
}

/// Accumulates blocks into growable per-key arrays
#[derive(Debug)]
pub struct TimeSeriesBuilder<'a> {
    config: &'a ParserConfig,
    columns: IndexMap<String, Series>,
    blocks: usize,
    warnings: Vec<ParseWarning>,
}

impl<'a> TimeSeriesBuilder<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            columns: IndexMap::new(),
            blocks: 0,
            warnings: Vec::new(),
        }
    }

    /// Number of blocks merged so far
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Merge one complete block. `line_number` is where the block started.
    pub fn push_block(&mut self, block: TimeSeriesBlock, line_number: usize) -> Result<()> {
        let block_index = self.blocks + 1;

        if self.blocks == 0 {
            for (key, value) in block {
                let kind = self.column_kind(&key, &value);
                let mut series = Series::with_capacity(kind, self.config.initial_capacity);
                push_value(&mut series, &key, value, block_index, &mut self.warnings)?;
                self.columns.insert(key, series);
            }
        } else {
            self.check_schema(&block, block_index, line_number)?;

            for series in self.columns.values_mut() {
                if series.len() == series.capacity() {
                    let grown = self.config.next_capacity(series.capacity());
                    series.grow_to(grown);
                }
            }

            for (key, value) in block {
                // Presence was checked against the schema above
                if let Some(series) = self.columns.get_mut(&key) {
                    push_value(series, &key, value, block_index, &mut self.warnings)?;
                }
            }
        }

        self.blocks += 1;
        Ok(())
    }

    /// Trim every array to the number of merged blocks
    pub fn finish(self) -> (TimeSeries, Vec<ParseWarning>) {
        let mut columns = self.columns;
        for series in columns.values_mut() {
            series.truncate(self.blocks);
            series.shrink_to_fit();
        }

        (
            TimeSeries {
                columns,
                rows: self.blocks,
            },
            self.warnings,
        )
    }

    fn column_kind(&self, key: &str, first: &Value) -> ValueKind {
        self.config
            .type_overrides
            .get(key)
            .copied()
            .or(self.config.time_series_default)
            .unwrap_or_else(|| first.kind())
    }

    fn check_schema(
        &self,
        block: &TimeSeriesBlock,
        block_index: usize,
        line_number: usize,
    ) -> Result<()> {
        let missing: Vec<String> = self
            .columns
            .keys()
            .filter(|key| !block.contains_key(*key))
            .cloned()
            .collect();
        let unexpected: Vec<String> = block
            .keys()
            .filter(|key| !self.columns.contains_key(*key))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }

        Err(MdoutError::SchemaViolation {
            block: block_index,
            line_number,
            missing,
            unexpected,
        })
    }
}

/// Append `value` to a monomorphic series.
///
/// Float columns store NaN for values that are not numbers (AMBER prints
/// asterisks when a field overflows); other columns reject foreign kinds.
fn push_value(
    series: &mut Series,
    key: &str,
    value: Value,
    block: usize,
    warnings: &mut Vec<ParseWarning>,
) -> Result<()> {
    match (series, value) {
        (Series::Float(values), Value::Float(v)) => values.push(v),
        (Series::Float(values), Value::Integer(v)) => values.push(v as f64),
        (Series::Float(values), other) => {
            warn!(
                "Non-numeric value '{}' for '{}' in block {}, storing NaN",
                other, key, block
            );
            warnings.push(ParseWarning::UnparsableFloat {
                key: key.to_string(),
                block,
                raw: other.to_string(),
            });
            values.push(f64::NAN);
        }
        (Series::Integer(values), Value::Integer(v)) => values.push(v),
        (Series::Boolean(values), Value::Boolean(v)) => values.push(v),
        (Series::Text(values), other) => values.push(other.to_string()),
        (series, other) => {
            return Err(MdoutError::TypeMismatch {
                key: key.to_string(),
                block,
                expected: series.kind().to_string(),
                found: other.kind().to_string(),
            });
        }
    }
    Ok(())
}

/// Parse the section whose header is the reader's current line
pub fn parse_time_series<R: BufRead>(
    lines: &mut LineReader<R>,
    config: &ParserConfig,
    inferencer: &TypeInferencer,
) -> Result<TimeSeriesOutcome> {
    let classifier = LineClassifier::new(config.block_start.as_str());
    let mut builder = TimeSeriesBuilder::new(config);
    let mut partial_block_line = None;

    // Step past the section header itself
    lines.advance()?;

    let end = loop {
        let Some(line) = lines.current() else {
            break SectionEnd::EndOfInput;
        };
        match classifier.classify(line) {
            LineKind::SectionHeader => break SectionEnd::NextSection,
            LineKind::BlockStart => {}
            LineKind::Assignment | LineKind::Noise => {
                lines.advance()?;
                continue;
            }
        }

        let block_line = lines.line_number();
        let (block, complete) = read_block(lines, &classifier, inferencer)?;

        if !complete {
            warn!(
                "Input ended inside block starting at line {}, discarding it",
                block_line
            );
            partial_block_line = Some(block_line);
            break SectionEnd::EndOfInput;
        }

        if block.is_empty() {
            debug!("Skipping empty block at line {}", block_line);
            // A marker line without `=` was not consumed by read_block
            if lines.line_number() == block_line {
                lines.advance()?;
            }
            continue;
        }

        builder.push_block(block, block_line)?;
    };

    debug!(
        "Results section finished after {} blocks ({:?})",
        builder.blocks(),
        end
    );

    let (time_series, mut warnings) = builder.finish();
    if let Some(line_number) = partial_block_line {
        warnings.push(ParseWarning::PartialBlockDiscarded {
            block: time_series.len() + 1,
            line_number,
        });
    }

    Ok(TimeSeriesOutcome {
        time_series,
        end,
        partial_block_line,
        warnings,
    })
}

/// Read `=` lines starting at the current line. The returned flag is false
/// when input ended before a terminating line was seen.
///
/// A line that fails to split is only an error when more input follows it;
/// the last line of a log still being written is usually cut short.
fn read_block<R: BufRead>(
    lines: &mut LineReader<R>,
    classifier: &LineClassifier,
    inferencer: &TypeInferencer,
) -> Result<(TimeSeriesBlock, bool)> {
    let mut block = TimeSeriesBlock::new();

    while let Some(line) = lines.current() {
        match classifier.classify(line) {
            LineKind::Assignment => {}
            // A marker line without `=` opens no pairs and ends the block
            LineKind::BlockStart if is_assignment(line) => {}
            _ => return Ok((block, true)),
        }

        let pairs = match split_time_series_line(line, lines.line_number()) {
            Ok(pairs) => pairs,
            Err(error) => {
                let cut_short = !lines.is_terminated();
                lines.advance()?;
                if cut_short || lines.is_eof() {
                    debug!("Malformed last line of input treated as truncation: {}", error);
                    return Ok((block, false));
                }
                return Err(error);
            }
        };

        for pair in pairs {
            if TypeInferencer::is_reserved(&pair.key) {
                continue;
            }
            let value = inferencer.infer(&pair.key, &pair.raw_value);
            block.insert(pair.key, value);
        }

        lines.advance()?;
    }

    Ok((block, false))
}
