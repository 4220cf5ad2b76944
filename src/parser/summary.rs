//! Trailing average / RMS fluctuation rows
//!
//! A finished run prints two extra blocks after the last step: the averages
//! and the RMS fluctuations, both carrying the final step number. When the
//! counting key's last three values are equal, the last two rows of every
//! array are moved into [`SummaryStatistics`].

use crate::constants::SUMMARY_MARKER_ROWS;
use crate::models::{SummaryStatistics, TimeSeries};
use tracing::debug;

/// True when the counting key ends in three identical values
pub fn has_summary_rows(time_series: &TimeSeries, counting_key: &str) -> bool {
    let Some(counter) = time_series.get(counting_key) else {
        debug!("Counting key '{}' not present, no summary rows", counting_key);
        return false;
    };
    if counter.len() < SUMMARY_MARKER_ROWS {
        return false;
    }

    let tail = counter.tail(SUMMARY_MARKER_ROWS);
    tail.windows(2).all(|pair| pair[0] == pair[1])
}

/// Split the average and RMS rows off every array.
///
/// Applies to all keys or to none; leaves `time_series` untouched and
/// returns empty statistics when the rows are not detected.
pub fn extract_summary(time_series: &mut TimeSeries, counting_key: &str) -> SummaryStatistics {
    let mut summary = SummaryStatistics::default();
    if !has_summary_rows(time_series, counting_key) {
        return summary;
    }

    let rows = time_series.rows;
    for (key, series) in time_series.columns.iter_mut() {
        if let (Some(average), Some(rms)) = (series.get(rows - 2), series.get(rows - 1)) {
            summary.averages.insert(key.clone(), average);
            summary.rms_fluctuations.insert(key.clone(), rms);
        }
        series.truncate(rows - 2);
        series.shrink_to_fit();
    }
    time_series.rows = rows - 2;

    debug!(
        "Extracted average and RMS rows for {} keys, {} step rows remain",
        summary.averages.len(),
        time_series.rows
    );
    summary
}
