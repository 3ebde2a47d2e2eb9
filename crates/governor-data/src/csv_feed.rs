//! CSV candle feed for replay and dry runs.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use governor_core::error::DataError;
use governor_core::traits::CandleFeed;
use governor_core::types::Candle;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Replays a CSV of historical candles one bar per fetch.
///
/// Each `fetch` reveals one more candle and returns the trailing window,
/// so a polling loop sees the file as a live feed would deliver it.
pub struct CsvCandleFeed {
    candles: Vec<Candle>,
    cursor: Mutex<usize>,
}

impl CsvCandleFeed {
    pub fn new(path: &str) -> Result<Self, DataError> {
        if !Path::new(path).exists() {
            return Err(DataError::NoDataAvailable);
        }
        let candles = load_candles(path)?;
        if candles.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        debug!(count = candles.len(), path, "loaded CSV candles");
        Ok(Self {
            candles,
            cursor: Mutex::new(0),
        })
    }

    /// True once every candle in the file has been revealed.
    pub fn is_exhausted(&self) -> bool {
        *self.lock_cursor() >= self.candles.len()
    }

    fn lock_cursor(&self) -> std::sync::MutexGuard<'_, usize> {
        match self.cursor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CandleFeed for CsvCandleFeed {
    async fn fetch(&self, limit: usize) -> Result<Vec<Candle>, DataError> {
        let mut cursor = self.lock_cursor();
        if *cursor >= self.candles.len() {
            return Err(DataError::NoDataAvailable);
        }
        *cursor += 1;

        let end = *cursor;
        let start = end.saturating_sub(limit);
        Ok(self.candles[start..end].to_vec())
    }
}

fn load_candles(path: &str) -> Result<Vec<Candle>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut candles = Vec::new();
    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
        let timestamp = parse_timestamp(&record.date)?;
        candles.push(Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

/// Parse various timestamp formats into epoch milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    if let Ok(ts) = date_str.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        if ts > 10_000_000_000 {
            return Ok(ts);
        }
        return Ok(ts * 1000);
    }

    Err(DataError::ParseError(format!(
        "could not parse date: {date_str}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert_eq!(
            parse_timestamp("1705312800").unwrap(),
            1_705_312_800_000 // Unix seconds scaled up
        );
        assert!(parse_timestamp("not-a-date").is_err());
    }

    #[tokio::test]
    async fn test_fetch_reveals_one_candle_per_call() {
        let file = write_csv(&[
            "1700000000000,100,105,95,101,10",
            "1700000300000,101,106,96,102,11",
            "1700000600000,102,107,97,103,12",
        ]);
        let feed = CsvCandleFeed::new(file.path().to_str().unwrap()).unwrap();

        let first = feed.fetch(10).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].timestamp, 1_700_000_000_000);

        let second = feed.fetch(10).await.unwrap();
        assert_eq!(second.len(), 2);

        // Window caps at the limit
        let third = feed.fetch(2).await.unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(third[1].timestamp, 1_700_000_600_000);

        assert!(feed.is_exhausted());
        assert!(matches!(
            feed.fetch(10).await,
            Err(DataError::NoDataAvailable)
        ));
    }

    #[tokio::test]
    async fn test_out_of_order_rows_are_sorted() {
        let file = write_csv(&[
            "1700000600000,102,107,97,103,12",
            "1700000000000,100,105,95,101,10",
        ]);
        let feed = CsvCandleFeed::new(file.path().to_str().unwrap()).unwrap();
        let first = feed.fetch(10).await.unwrap();
        assert_eq!(first[0].timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_missing_file_is_no_data() {
        assert!(matches!(
            CsvCandleFeed::new("/nonexistent/candles.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
