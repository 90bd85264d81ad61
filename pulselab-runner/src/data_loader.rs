//! Bar loading for the runner.
//!
//! Reads OHLCV bars from CSV with a header row:
//! `timestamp,open,high,low,close[,volume]`. Timestamps may be epoch
//! milliseconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` date.
//! Every bar is validated through `BarSeries`, so a loaded history is always
//! finite, ordered and well-formed.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulselab_core::domain::{Bar, BarSeries, DataError};
use serde::Deserialize;
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("invalid bar: {0}")]
    Data(#[from] DataError),
    #[error("no bars in input")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Load and validate bars from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bars_csv(file)
}

/// Read and validate bars from any CSV source.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut series = BarSeries::new();

    for (row, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        let timestamp =
            parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
                row,
                value: record.timestamp.clone(),
            })?;
        series.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ))?;
    }

    if series.is_empty() {
        return Err(LoadError::Empty);
    }
    tracing::info!(bars = series.len(), "loaded bars");
    Ok(series.as_slice().to_vec())
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(ms) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp_millis().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mixed_timestamp_formats() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-01-02,100,101,99,100.5,1000
2024-01-02 01:00:00,100.5,102,100,101.5,1200
2024-01-02T02:00:00Z,101.5,103,101,102,900
1704164400000,102,102.5,100,101,800
";
        let bars = read_bars_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[1].timestamp.to_string(), "2024-01-02 01:00:00");
        assert_eq!(bars[3].timestamp.to_string(), "2024-01-02 03:00:00");
        assert_eq!(bars[2].close, 102.0);
    }

    #[test]
    fn volume_column_is_optional() {
        let csv = "timestamp,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n";
        let bars = read_bars_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn out_of_order_rows_fail_validation() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-01-03,1,2,0.5,1.5,10
2024-01-02,1,2,0.5,1.5,10
";
        let err = read_bars_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Data(DataError::NonIncreasingTimestamp { index: 1, .. })
        ));
    }

    #[test]
    fn bad_timestamp_names_the_row() {
        let csv = "timestamp,open,high,low,close\nyesterday,1,2,0.5,1.5\n";
        let err = read_bars_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 0, value } if value == "yesterday"));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = read_bars_csv("timestamp,open,high,low,close\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn dataset_hash_is_sensitive_to_values() {
        let csv = "timestamp,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n";
        let a = read_bars_csv(csv.as_bytes()).unwrap();
        let mut b = a.clone();
        assert_eq!(dataset_hash(&a), dataset_hash(&b));
        b[0].close = 1.25;
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }
}
