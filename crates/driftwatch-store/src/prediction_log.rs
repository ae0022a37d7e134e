//! Prediction log: append-only CSV of served predictions.
//!
//! Multiple serving workers may append at once. Each append takes an
//! exclusive `fd-lock` on the file, decides whether the header is still
//! missing, and writes the row with a single `write_all`, so readers never
//! see interleaved rows. Readers take the shared side of the same lock.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use driftwatch_core::{FeatureVector, LoopConfig, PredictionRecord};

use crate::error::{StoreError, StoreResult};

/// On-disk row layout. Column names are the log side of `FEATURE_COLUMNS`.
#[derive(Debug, Serialize, Deserialize)]
struct LogRow {
    #[serde(with = "timestamp")]
    timestamp: DateTime<Utc>,
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
    prediction: u32,
}

impl From<&PredictionRecord> for LogRow {
    fn from(record: &PredictionRecord) -> Self {
        let f = &record.features;
        LogRow {
            timestamp: record.timestamp,
            sepal_length: f.sepal_length,
            sepal_width: f.sepal_width,
            petal_length: f.petal_length,
            petal_width: f.petal_width,
            prediction: record.prediction,
        }
    }
}

impl From<LogRow> for PredictionRecord {
    fn from(row: LogRow) -> Self {
        PredictionRecord {
            timestamp: row.timestamp,
            features: FeatureVector::new(
                row.sepal_length,
                row.sepal_width,
                row.petal_length,
                row.petal_width,
            ),
            prediction: row.prediction,
        }
    }
}

/// Writer side of the prediction log, used by the serving endpoint.
#[derive(Debug, Clone)]
pub struct PredictionLogger {
    path: PathBuf,
}

impl PredictionLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(&config.paths.prediction_log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log one served prediction stamped with the current time.
    pub fn record(&self, features: FeatureVector, prediction: u32) -> StoreResult<PredictionRecord> {
        let record = PredictionRecord::now(features, prediction);
        self.append(&record)?;
        Ok(record)
    }

    /// Append exactly one row, writing the header first if the log is new.
    ///
    /// I/O failures are returned to the caller; a prediction whose log
    /// write failed is invisible to later drift evaluation.
    pub fn append(&self, record: &PredictionRecord) -> StoreResult<()> {
        if !record.features.is_finite() {
            return Err(StoreError::InvalidRecord(format!(
                "non-finite feature values: {:?}",
                record.features
            )));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut lock = fd_lock::RwLock::new(file);
        let mut guard = lock.write().map_err(|e| StoreError::io(&self.path, e))?;

        // Decided under the lock: only the first writer of an empty file
        // emits the header.
        let needs_header = guard
            .metadata()
            .map_err(|e| StoreError::io(&self.path, e))?
            .len()
            == 0;

        let bytes = encode_row(record, needs_header)?;
        guard
            .write_all(&bytes)
            .map_err(|e| StoreError::io(&self.path, e))?;
        guard.flush().map_err(|e| StoreError::io(&self.path, e))?;

        debug!(
            path = %self.path.display(),
            prediction = record.prediction,
            header = needs_header,
            "prediction logged"
        );
        Ok(())
    }
}

fn encode_row(record: &PredictionRecord, with_header: bool) -> StoreResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer
        .serialize(LogRow::from(record))
        .map_err(|e| StoreError::Serialize(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Serialize(e.to_string()))
}

/// Reader side of the prediction log, used by the drift evaluator.
#[derive(Debug, Clone)]
pub struct PredictionLog {
    path: PathBuf,
}

impl PredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(&config.paths.prediction_log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every record in append order.
    ///
    /// Columns are matched by header name; extra columns are ignored. A row
    /// with a NaN or infinite feature is rejected.
    pub fn read_all(&self) -> StoreResult<Vec<PredictionRecord>> {
        if !self.exists() {
            return Err(StoreError::not_found(&self.path));
        }

        let file = std::fs::File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let lock = fd_lock::RwLock::new(file);
        let guard = lock.read().map_err(|e| StoreError::io(&self.path, e))?;

        let mut reader = csv::Reader::from_reader(&*guard);
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<LogRow>().enumerate() {
            let record = PredictionRecord::from(row.map_err(|e| StoreError::csv(&self.path, e))?);
            if !record.features.is_finite() {
                return Err(StoreError::non_finite(&self.path, index));
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// RFC 3339 timestamps. Naive ISO-8601 values without an offset are read
/// as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use driftwatch_core::schema::log_header;

    fn sample(i: u32) -> PredictionRecord {
        PredictionRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, i).unwrap(),
            features: FeatureVector::new(5.0 + f64::from(i) * 0.1, 3.1, 1.4, 0.2),
            prediction: i % 3,
        }
    }

    #[test]
    fn record_then_read_returns_same_row_last() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/predictions.csv");
        let logger = PredictionLogger::new(&path);

        logger.append(&sample(0)).unwrap();
        let features = FeatureVector::new(6.3, 2.9, 5.6, 1.8);
        let written = logger.record(features, 2).unwrap();

        let records = PredictionLog::new(&path).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], sample(0));
        assert_eq!(records.last().unwrap(), &written);
        assert_eq!(written.features, features);
        assert_eq!(written.prediction, 2);
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let logger = PredictionLogger::new(&path);

        for i in 0..5 {
            logger.append(&sample(i)).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], log_header().join(","));
        assert_eq!(
            content.matches("timestamp").count(),
            1,
            "header must appear exactly once"
        );
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        std::fs::write(&path, "").unwrap();

        PredictionLogger::new(&path).append(&sample(1)).unwrap();

        let records = PredictionLog::new(&path).read_all().unwrap();
        assert_eq!(records, vec![sample(1)]);
    }

    #[test]
    fn concurrent_appends_stay_well_formed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = PredictionLogger::new(&path);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        logger
                            .record(FeatureVector::new(f64::from(t), 1.0, 2.0, 3.0), i % 3)
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let records = PredictionLog::new(&path).read_all().unwrap();
        assert_eq!(records.len(), 200);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("timestamp").count(), 1);
    }

    #[test]
    fn unwritable_location_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let logger = PredictionLogger::new(blocker.join("predictions.csv"));
        let err = logger
            .record(FeatureVector::new(5.1, 3.5, 1.4, 0.2), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn non_finite_features_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let err = PredictionLogger::new(&path)
            .record(FeatureVector::new(f64::NAN, 3.5, 1.4, 0.2), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(!path.exists());
    }

    #[test]
    fn missing_log_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = PredictionLog::new(dir.path().join("absent.csv"))
            .read_all()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn reads_naive_timestamps_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        std::fs::write(
            &path,
            "timestamp,sepal_length,sepal_width,petal_length,petal_width,prediction,request_id\n\
             2024-05-01T12:00:00.250000,5.1,3.5,1.4,0.2,0,abc\n",
        )
        .unwrap();

        let records = PredictionLog::new(&path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prediction, 0);
        assert_eq!(
            records[0].timestamp,
            timestamp::parse("2024-05-01T12:00:00.250Z").unwrap()
        );
    }

    #[test]
    fn malformed_row_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        std::fs::write(
            &path,
            "timestamp,sepal_length,sepal_width,petal_length,petal_width,prediction\n\
             2024-05-01T12:00:00Z,abc,3.5,1.4,0.2,0\n",
        )
        .unwrap();

        let err = PredictionLog::new(&path).read_all().unwrap_err();
        assert!(matches!(err, StoreError::Csv { .. }));
        assert!(err.to_string().contains("predictions.csv"));
    }

    #[test]
    fn non_finite_cells_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        std::fs::write(
            &path,
            "timestamp,sepal_length,sepal_width,petal_length,petal_width,prediction\n\
             2024-05-01T12:00:00Z,5.1,3.5,1.4,0.2,0\n\
             2024-05-01T12:00:01Z,NaN,3.5,1.4,0.2,0\n",
        )
        .unwrap();

        let err = PredictionLog::new(&path).read_all().unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        let message = err.to_string();
        assert!(message.contains("predictions.csv"), "{message}");
        assert!(message.contains("line 3"), "{message}");
    }
}
