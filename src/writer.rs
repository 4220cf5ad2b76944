//! Parquet output for parsed mdout data
//!
//! A parse result is stored as up to three files next to each other:
//! `<stem>.parquet` with one column per time-series key, `<stem>.summary.parquet`
//! with the average and RMS fluctuation of every key, and
//! `<stem>.params.parquet` with the simulation parameters rendered as text.

use crate::config::CompressionAlgorithm;
use crate::constants::{
    PARAMETERS_FILE_SUFFIX, SUMMARY_FILE_SUFFIX, parameter_columns, summary_columns,
};
use crate::error::{MdoutError, Result};
use crate::models::{ParseOutput, Series, SummaryStatistics, TimeSeries, Value};
use indexmap::IndexMap;
use polars::prelude::{Column, DataFrame, ParquetWriter as PolarsParquetWriter, PolarsResult};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files written for one parse result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    /// Time-series file, absent when the run had no results blocks
    pub time_series_path: Option<PathBuf>,
    pub time_series_rows: usize,
    pub time_series_columns: usize,
    /// Summary file, absent when no average/RMS rows were detected
    pub summary_path: Option<PathBuf>,
    pub summary_rows: usize,
    pub parameters_path: Option<PathBuf>,
    pub parameter_rows: usize,
}

impl WriteReport {
    /// Every file that was written
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [
            self.time_series_path.as_deref(),
            self.summary_path.as_deref(),
            self.parameters_path.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Writes [`ParseOutput`] values as Parquet files
#[derive(Debug, Clone)]
pub struct ParquetOutput {
    output_path: PathBuf,
    compression: CompressionAlgorithm,
}

impl ParquetOutput {
    /// Writer for the time-series file `output_path`; the companion files
    /// are derived from its stem
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            compression: CompressionAlgorithm::default(),
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// `<stem>.summary.parquet`
    pub fn summary_path(&self) -> PathBuf {
        self.companion_path(SUMMARY_FILE_SUFFIX)
    }

    /// `<stem>.params.parquet`
    pub fn parameters_path(&self) -> PathBuf {
        self.companion_path(PARAMETERS_FILE_SUFFIX)
    }

    fn companion_path(&self, suffix: &str) -> PathBuf {
        let stem = self
            .output_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_path
            .with_file_name(format!("{}.{}.parquet", stem, suffix))
    }

    /// Write every non-empty part of `output`
    pub fn write(&self, output: &ParseOutput) -> Result<WriteReport> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut report = WriteReport::default();

        if output.time_series.key_count() > 0 {
            let mut frame = time_series_frame(&output.time_series)?;
            self.write_frame(&self.output_path, &mut frame)?;
            report.time_series_path = Some(self.output_path.clone());
            report.time_series_rows = frame.height();
            report.time_series_columns = frame.width();
        } else {
            debug!("No time series to write");
        }

        if !output.summary.is_empty() {
            let path = self.summary_path();
            let mut frame = summary_frame(&output.summary)?;
            self.write_frame(&path, &mut frame)?;
            report.summary_rows = frame.height();
            report.summary_path = Some(path);
        }

        if !output.parameters.is_empty() {
            let path = self.parameters_path();
            let mut frame = parameters_frame(&output.parameters)?;
            self.write_frame(&path, &mut frame)?;
            report.parameter_rows = frame.height();
            report.parameters_path = Some(path);
        }

        Ok(report)
    }

    fn write_frame(&self, path: &Path, frame: &mut DataFrame) -> Result<()> {
        let file = File::create(path).map_err(|e| MdoutError::OutputFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to create file: {}", e),
        })?;

        PolarsParquetWriter::new(file)
            .with_compression(self.compression.to_polars_compression())
            .finish(frame)
            .map_err(|e| MdoutError::OutputFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write parquet: {}", e),
            })?;

        debug!(
            "Wrote {} rows x {} columns to {}",
            frame.height(),
            frame.width(),
            path.display()
        );
        Ok(())
    }
}

/// One column per key, in key order
pub fn time_series_frame(time_series: &TimeSeries) -> PolarsResult<DataFrame> {
    let columns = time_series
        .iter()
        .map(|(key, series)| match series {
            Series::Float(values) => Column::new(key.into(), values.as_slice()),
            Series::Integer(values) => Column::new(key.into(), values.as_slice()),
            Series::Boolean(values) => Column::new(key.into(), values.as_slice()),
            Series::Text(values) => Column::new(key.into(), values.as_slice()),
        })
        .collect();
    DataFrame::new(columns)
}

/// `name`, `average`, `rmsfluct`; non-numeric entries become NaN
pub fn summary_frame(summary: &SummaryStatistics) -> PolarsResult<DataFrame> {
    let mut names = Vec::with_capacity(summary.averages.len());
    let mut averages = Vec::with_capacity(summary.averages.len());
    let mut fluctuations = Vec::with_capacity(summary.averages.len());

    for (key, average) in &summary.averages {
        let rms = summary
            .rms_fluctuations
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN);
        names.push(key.as_str());
        averages.push(average.as_f64().unwrap_or(f64::NAN));
        fluctuations.push(rms);
    }

    DataFrame::new(vec![
        Column::new(summary_columns::NAME.into(), names),
        Column::new(summary_columns::AVERAGE.into(), averages),
        Column::new(summary_columns::RMS_FLUCTUATION.into(), fluctuations),
    ])
}

/// `name`, `kind`, `value` with the value rendered as text
pub fn parameters_frame(parameters: &IndexMap<String, Value>) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = parameters.keys().map(String::as_str).collect();
    let kinds: Vec<&str> = parameters.values().map(|v| v.kind().as_str()).collect();
    let values: Vec<String> = parameters.values().map(Value::to_string).collect();

    DataFrame::new(vec![
        Column::new(parameter_columns::NAME.into(), names),
        Column::new(parameter_columns::KIND.into(), kinds),
        Column::new(parameter_columns::VALUE.into(), values),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParseStats, ValueKind};
    use polars::prelude::{ParquetReader, SerReader};
    use tempfile::TempDir;

    fn sample_output() -> ParseOutput {
        let mut columns = IndexMap::new();
        columns.insert("NSTEP".to_string(), Series::Integer(vec![500, 1000]));
        columns.insert("EPtot".to_string(), Series::Float(vec![-10.5, -11.5]));
        let time_series = TimeSeries { columns, rows: 2 };

        let mut summary = SummaryStatistics::default();
        summary
            .averages
            .insert("NSTEP".to_string(), Value::Integer(1000));
        summary.averages.insert("EPtot".to_string(), Value::Float(-11.0));
        summary
            .rms_fluctuations
            .insert("NSTEP".to_string(), Value::Integer(1000));
        summary
            .rms_fluctuations
            .insert("EPtot".to_string(), Value::Float(0.5));

        let mut parameters = IndexMap::new();
        parameters.insert("imin".to_string(), Value::Integer(0));
        parameters.insert("dt".to_string(), Value::Float(0.002));
        parameters.insert("name".to_string(), Value::Text("default_name".to_string()));

        ParseOutput {
            parameters,
            time_series,
            summary,
            warnings: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    fn read(path: &Path) -> DataFrame {
        ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
    }

    fn column<'a>(frame: &'a DataFrame, name: &str) -> &'a polars::prelude::Series {
        frame.column(name).unwrap().as_materialized_series()
    }

    #[test]
    fn test_companion_paths() {
        let writer = ParquetOutput::new("/data/run1.parquet");
        assert_eq!(writer.summary_path(), PathBuf::from("/data/run1.summary.parquet"));
        assert_eq!(writer.parameters_path(), PathBuf::from("/data/run1.params.parquet"));
    }

    #[test]
    fn test_write_all_tables() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetOutput::new(temp_dir.path().join("out").join("md.parquet"))
            .with_compression(CompressionAlgorithm::Zstd);

        let report = writer.write(&sample_output()).unwrap();

        assert_eq!(report.time_series_rows, 2);
        assert_eq!(report.time_series_columns, 2);
        assert_eq!(report.summary_rows, 2);
        assert_eq!(report.parameter_rows, 3);
        assert_eq!(report.paths().count(), 3);

        let frame = read(writer.output_path());
        let names: Vec<&str> = frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["NSTEP", "EPtot"]);
        let eptot: Vec<Option<f64>> = column(&frame, "EPtot").f64().unwrap().into_iter().collect();
        assert_eq!(eptot, vec![Some(-10.5), Some(-11.5)]);
        let nstep: Vec<Option<i64>> = column(&frame, "NSTEP").i64().unwrap().into_iter().collect();
        assert_eq!(nstep, vec![Some(500), Some(1000)]);

        let summary = read(&writer.summary_path());
        let rms: Vec<Option<f64>> = column(&summary, summary_columns::RMS_FLUCTUATION)
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(rms, vec![Some(1000.0), Some(0.5)]);

        let params = read(&writer.parameters_path());
        let kinds: Vec<Option<&str>> = column(&params, parameter_columns::KIND)
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(ValueKind::Integer.as_str()),
                Some("float"),
                Some("text")
            ]
        );
    }

    #[test]
    fn test_empty_parts_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetOutput::new(temp_dir.path().join("md.parquet"));

        let mut output = sample_output();
        output.summary = SummaryStatistics::default();
        output.time_series = TimeSeries::default();

        let report = writer.write(&output).unwrap();

        assert!(report.time_series_path.is_none());
        assert!(report.summary_path.is_none());
        assert_eq!(report.parameters_path, Some(writer.parameters_path()));
        assert!(!writer.output_path().exists());
        assert!(!writer.summary_path().exists());
    }

    #[test]
    fn test_ragged_time_series_is_polars_error() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetOutput::new(temp_dir.path().join("md.parquet"));

        let mut output = sample_output();
        output
            .time_series
            .columns
            .insert("TEMP(K)".to_string(), Series::Float(vec![300.0]));

        let result = writer.write(&output);
        assert!(matches!(result, Err(MdoutError::Polars(_))));
        assert!(!writer.output_path().exists());
    }

    #[test]
    fn test_summary_frame_non_numeric_is_nan() {
        let mut summary = SummaryStatistics::default();
        summary
            .averages
            .insert("LABEL".to_string(), Value::Text("x".to_string()));
        summary
            .rms_fluctuations
            .insert("LABEL".to_string(), Value::Text("y".to_string()));

        let frame = summary_frame(&summary).unwrap();
        let average = column(&frame, summary_columns::AVERAGE)
            .f64()
            .unwrap()
            .get(0)
            .unwrap();
        assert!(average.is_nan());
    }
}
