//! Forward-only line reading and line classification
//!
//! The reader holds exactly one "current" line. Section parsers inspect it,
//! decide what it is, and either consume it or leave it in place for the
//! next parser, which is how section boundaries are handed over without
//! re-reading.

use crate::constants::{PARAMETERS_HEADER_PATTERN, RESULTS_HEADER_PATTERN, SECTION_HEADER_PATTERN};
use crate::error::Result;
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

pub(crate) static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SECTION_HEADER_PATTERN).expect("valid section header pattern"));

pub(crate) static PARAMETERS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(PARAMETERS_HEADER_PATTERN).expect("valid parameters header pattern")
});

pub(crate) static RESULTS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RESULTS_HEADER_PATTERN).expect("valid results header pattern"));

/// What a single line means to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Numbered section header such as `   4.  RESULTS`
    SectionHeader,
    /// First line of a time-series block
    BlockStart,
    /// Contains at least one `=` and may hold key/value pairs
    Assignment,
    /// Anything else
    Noise,
}

/// Classifies lines against the section header pattern and the block marker
#[derive(Debug, Clone)]
pub struct LineClassifier {
    block_start: String,
}

impl LineClassifier {
    pub fn new(block_start: impl Into<String>) -> Self {
        Self {
            block_start: block_start.into(),
        }
    }

    pub fn classify(&self, line: &str) -> LineKind {
        if is_section_header(line) {
            LineKind::SectionHeader
        } else if self.is_block_start(line) {
            LineKind::BlockStart
        } else if is_assignment(line) {
            LineKind::Assignment
        } else {
            LineKind::Noise
        }
    }

    pub fn is_block_start(&self, line: &str) -> bool {
        line.starts_with(&self.block_start)
    }
}

pub fn is_section_header(line: &str) -> bool {
    SECTION_HEADER.is_match(line)
}

pub fn is_assignment(line: &str) -> bool {
    line.contains('=')
}

/// Reader that keeps the current line and its 1-based line number
pub struct LineReader<R> {
    reader: R,
    current: Option<String>,
    line_number: usize,
    terminated: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a reader and load its first line
    pub fn new(reader: R) -> Result<Self> {
        let mut line_reader = Self {
            reader,
            current: None,
            line_number: 0,
            terminated: false,
        };
        line_reader.advance()?;
        Ok(line_reader)
    }

    /// Current line without its line terminator, `None` at end of input
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Line number of the current line
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of lines consumed from the underlying reader
    pub fn lines_read(&self) -> usize {
        if self.current.is_some() {
            self.line_number
        } else {
            self.line_number.saturating_sub(1)
        }
    }

    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// False when the current line was cut off by the end of input before
    /// its line terminator
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Move to the next line
    pub fn advance(&mut self) -> Result<()> {
        if self.current.is_none() && self.line_number > 0 {
            return Ok(());
        }

        let mut buffer = self.current.take().unwrap_or_default();
        buffer.clear();
        self.line_number += 1;

        if self.reader.read_line(&mut buffer)? == 0 {
            self.current = None;
            self.terminated = false;
            return Ok(());
        }

        self.terminated = buffer.ends_with('\n');
        let trimmed_len = buffer.trim_end_matches(['\n', '\r']).len();
        buffer.truncate(trimmed_len);
        self.current = Some(buffer);
        Ok(())
    }

    /// Skip lines until one matches `pattern`, leaving it as the current line.
    /// Returns false when input runs out first.
    pub fn discard_until(&mut self, pattern: &Regex) -> Result<bool> {
        while let Some(line) = self.current() {
            if pattern.is_match(line) {
                return Ok(true);
            }
            self.advance()?;
        }
        Ok(false)
    }
}
