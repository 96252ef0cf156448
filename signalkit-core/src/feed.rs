//! CSV bar feed loader.
//!
//! Expected header: `symbol,timestamp,open,high,low,close`. Timestamps may be
//! `YYYY-MM-DD HH:MM[:SS]`, the same with a `T` separator, or a bare date for
//! daily feeds (read as midnight).

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::Bar;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: unrecognised timestamp {value:?}")]
    Timestamp { line: usize, value: String },

    #[error("line {line}: bar fails OHLC sanity check")]
    InsaneBar { line: usize },

    #[error("line {line}: timestamp {timestamp} is earlier than the previous bar")]
    OutOfOrder {
        line: usize,
        timestamp: NaiveDateTime,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a feed timestamp in any of the accepted layouts.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read bars from any CSV source, validating sanity and ordering.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, FeedError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars: Vec<Bar> = Vec::new();

    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| FeedError::Timestamp {
            line,
            value: row.timestamp.clone(),
        })?;

        let bar = Bar::new(row.symbol, timestamp, row.open, row.high, row.low, row.close);
        if !bar.is_sane() {
            return Err(FeedError::InsaneBar { line });
        }
        if let Some(prev) = bars.last() {
            if bar.timestamp < prev.timestamp {
                return Err(FeedError::OutOfOrder { line, timestamp });
            }
        }
        bars.push(bar);
    }

    Ok(bars)
}

pub fn read_bars_csv(path: &Path) -> Result<Vec<Bar>, FeedError> {
    let file = std::fs::File::open(path).map_err(|e| FeedError::Csv(e.into()))?;
    read_bars(std::io::BufReader::new(file))
}
