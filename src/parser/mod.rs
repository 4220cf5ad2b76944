//! AMBER mdout parser
//!
//! Turns an mdout log into simulation parameters, per-key time series and the
//! run's average/RMS fluctuation summary in a single forward pass.
//!
//! ## Architecture
//!
//! - [`lines`] - forward-only line reader, section/block classification
//! - [`pairs`] - `KEY = VALUE` extraction for control data and results lines
//! - [`inference`] - float/integer/boolean/text inference with overrides
//! - [`parameters`] - `CONTROL  DATA  FOR  THE  RUN` section
//! - [`time_series`] - `RESULTS` section and growable per-key arrays
//! - [`summary`] - trailing average/RMS row detection
//!
//! ## Usage
//!
//! ```rust
//! use mdout_processor::MdoutParser;
//!
//! # fn example() -> mdout_processor::Result<()> {
//! let parser = MdoutParser::new();
//! let output = parser.parse_path(std::path::Path::new("mdout"))?;
//!
//! println!("Parsed {} blocks with {} keys",
//!          output.time_series.len(),
//!          output.time_series.key_count());
//! # Ok(())
//! # }
//! ```

pub mod inference;
pub mod lines;
pub mod pairs;
pub mod parameters;
pub mod summary;
pub mod time_series;

#[cfg(test)]
mod tests;

pub use inference::TypeInferencer;
pub use lines::{LineClassifier, LineKind, LineReader};
pub use pairs::KeyValuePair;
pub use parameters::SectionEnd;
pub use time_series::{TimeSeriesBlock, TimeSeriesBuilder};

use crate::config::ParserConfig;
use crate::constants::sections;
use crate::error::{MdoutError, Result};
use crate::models::{ParseOutput, ParseStats, ParseWarning, SummaryStatistics, TimeSeries};
use lines::{PARAMETERS_HEADER, RESULTS_HEADER};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use tracing::{debug, warn};

/// Stateless mdout parser; every call keeps its scanning state local, so one
/// instance can parse independent files from several threads.
#[derive(Debug, Clone)]
pub struct MdoutParser {
    config: ParserConfig,
    classifier: LineClassifier,
    parameter_inferencer: TypeInferencer,
    series_inferencer: TypeInferencer,
}

impl Default for MdoutParser {
    fn default() -> Self {
        Self::from_valid_config(ParserConfig::default())
    }
}

impl MdoutParser {
    /// Parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a validated custom configuration
    pub fn with_config(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ParserConfig) -> Self {
        let parameter_inferencer =
            TypeInferencer::with_overrides(config.type_overrides.clone(), None);
        let series_inferencer = TypeInferencer::with_overrides(
            config.type_overrides.clone(),
            config.time_series_default,
        );
        Self {
            classifier: LineClassifier::new(config.block_start.as_str()),
            config,
            parameter_inferencer,
            series_inferencer,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an mdout file from disk
    pub fn parse_path(&self, path: &Path) -> Result<ParseOutput> {
        if !path.exists() {
            return Err(MdoutError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        debug!("Parsing mdout file {}", path.display());
        self.parse(BufReader::new(file))
    }

    /// Parse mdout text held in memory
    pub fn parse_str(&self, text: &str) -> Result<ParseOutput> {
        self.parse(Cursor::new(text.as_bytes()))
    }

    /// Parse an mdout stream, reading it strictly forward
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<ParseOutput> {
        let mut lines = LineReader::new(reader)?;
        let mut warnings = Vec::new();

        if !lines.discard_until(&PARAMETERS_HEADER)? {
            return Err(MdoutError::MissingSection {
                section: sections::PARAMETERS,
            });
        }
        debug!("Control data section starts at line {}", lines.line_number());

        let (parameters, parameters_end) = parameters::parse_parameters(
            &mut lines,
            &self.classifier,
            &self.parameter_inferencer,
        )?;

        let mut time_series = TimeSeries::default();
        let mut partial_blocks = 0;

        if parameters_end == SectionEnd::EndOfInput {
            self.premature_end(sections::PARAMETERS, 0, &mut warnings)?;
        } else if !lines.discard_until(&RESULTS_HEADER)? {
            if self.config.strict {
                return Err(MdoutError::MissingSection {
                    section: sections::RESULTS,
                });
            }
            warn!("No results section found after control data");
            warnings.push(ParseWarning::MissingResults);
        } else {
            debug!("Results section starts at line {}", lines.line_number());
            let outcome =
                time_series::parse_time_series(&mut lines, &self.config, &self.series_inferencer)?;

            warnings.extend(outcome.warnings);
            if outcome.partial_block_line.is_some() {
                partial_blocks = 1;
            }
            if outcome.end == SectionEnd::EndOfInput {
                self.premature_end(sections::RESULTS, outcome.time_series.len(), &mut warnings)?;
            }
            time_series = outcome.time_series;
        }

        let blocks_parsed = time_series.len();
        let summary = if self.config.extract_summary {
            summary::extract_summary(&mut time_series, &self.config.counting_key)
        } else {
            SummaryStatistics::default()
        };

        let stats = ParseStats {
            lines_read: lines.lines_read(),
            blocks_parsed,
            partial_blocks_discarded: partial_blocks,
            summary_detected: !summary.is_empty(),
        };

        debug!(
            "Parsed {} parameters, {} blocks, {} keys (summary: {})",
            parameters.len(),
            stats.blocks_parsed,
            time_series.key_count(),
            stats.summary_detected
        );

        Ok(ParseOutput {
            parameters,
            time_series,
            summary,
            warnings,
            stats,
        })
    }

    /// Record (or, in strict mode, raise) input ending inside `section`
    fn premature_end(
        &self,
        section: &'static str,
        blocks_read: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<()> {
        if self.config.strict {
            return Err(MdoutError::PrematureEndOfInput {
                section,
                blocks_read,
            });
        }

        warn!(
            "Input ended inside the {} section after {} complete blocks",
            section, blocks_read
        );
        warnings.push(ParseWarning::PrematureEndOfInput {
            section: section.to_string(),
            blocks_read,
        });
        Ok(())
    }
}
