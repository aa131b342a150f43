//! Line-delimited session record log
//!
//! Each completed session is appended as one JSON object on its own line.
//! Earlier content is never rewritten, so repeated experiment runs can share
//! one log file and a reader never has to parse more than one line at a time.
//!
//! Key names are fixed for compatibility with existing logs:
//!
//! ```text
//! {"Teilnehmer_in":"alice","Zeit":12.3,"Datensatz":"data/synthetic_data.json","Eintrag":"leaf1"}
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Outcome of one completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Participant name
    #[serde(rename = "Teilnehmer_in")]
    pub participant: String,
    /// Time from start to the matching selection, in seconds
    #[serde(rename = "Zeit")]
    pub elapsed_seconds: f64,
    /// Dataset the session ran on
    #[serde(rename = "Datensatz")]
    pub dataset_id: String,
    /// Label the participant had to find
    #[serde(rename = "Eintrag")]
    pub target_label: String,
}

/// Errors that can occur while reading or writing the log
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access results log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),
}

/// Result type for result store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// A log line that could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Corrupt record on line {line}: {reason}")]
pub struct CorruptRecord {
    /// 1-based line number in the log
    pub line: usize,
    /// Decoder message
    pub reason: String,
}

/// One decoded line: a record, or the reason it was rejected
pub type RecordLine = std::result::Result<SessionRecord, CorruptRecord>;

/// Encode `record` and write it as one complete line
///
/// The line is assembled in memory and handed to the writer in a single
/// `write_all`, so the log never holds half a record written by this call.
pub fn write_record<W: Write>(writer: &mut W, record: &SessionRecord) -> Result<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Decode every non-blank line of `reader`, in order
///
/// Lines are split on raw bytes, so a line that is not valid UTF-8 becomes a
/// [`CorruptRecord`] like any other undecodable line. Only read failures of
/// the underlying stream are errors.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<RecordLine>> {
    let mut out = Vec::new();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let decoded = serde_json::from_slice::<SessionRecord>(&line).map_err(|e| CorruptRecord {
            line: index + 1,
            reason: e.to_string(),
        });
        out.push(decoded);
    }
    Ok(out)
}

/// Keep the decodable records, logging a warning for each corrupt line
pub fn skip_corrupt(lines: Vec<RecordLine>) -> Vec<SessionRecord> {
    lines
        .into_iter()
        .filter_map(|line| match line {
            Ok(record) => Some(record),
            Err(corrupt) => {
                tracing::warn!(line = corrupt.line, reason = %corrupt.reason, "skipping corrupt record");
                None
            }
        })
        .collect()
}

/// File-backed, append-only record log
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Use the log at `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one record to the end of the log
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        write_record(&mut file, record).map_err(|e| match e {
            StoreError::Stream(source) => self.io_error(source),
            other => other,
        })?;
        tracing::debug!(path = %self.path.display(), "record appended");
        Ok(())
    }

    /// Read the whole log; corrupt lines are reported per line
    pub fn load_all(&self) -> Result<Vec<RecordLine>> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        read_records(BufReader::new(file)).map_err(|e| match e {
            StoreError::Stream(source) => self.io_error(source),
            other => other,
        })
    }

    /// Read the log, skipping corrupt lines with a warning
    pub fn load_valid(&self) -> Result<Vec<SessionRecord>> {
        let lines = self.load_all()?;
        let total = lines.len();
        let records = skip_corrupt(lines);
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            skipped = total - records.len(),
            "results loaded"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn record(participant: &str, seconds: f64) -> SessionRecord {
        SessionRecord {
            participant: participant.to_string(),
            elapsed_seconds: seconds,
            dataset_id: "data/synthetic_data.json".to_string(),
            target_label: "leaf1".to_string(),
        }
    }

    #[test]
    fn test_record_uses_log_key_names() {
        let json = serde_json::to_value(record("alice", 1.5)).unwrap();
        assert_eq!(json["Teilnehmer_in"], "alice");
        assert_eq!(json["Zeit"], 1.5);
        assert_eq!(json["Datensatz"], "data/synthetic_data.json");
        assert_eq!(json["Eintrag"], "leaf1");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_write_record_emits_single_line() {
        let mut buf = Vec::new();
        write_record(&mut buf, &record("alice", 2.0)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
    }

    #[test]
    fn test_read_records_accepts_integer_times() {
        let input = r#"{"Teilnehmer_in": "bob", "Zeit": 7, "Datensatz": "d", "Eintrag": "x"}"#;
        let lines = read_records(Cursor::new(input)).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref().unwrap().elapsed_seconds, 7.0);
    }

    #[test]
    fn test_read_records_skips_blank_lines() {
        let mut buf = Vec::new();
        write_record(&mut buf, &record("a", 1.0)).unwrap();
        buf.extend_from_slice(b"\n   \n");
        write_record(&mut buf, &record("b", 2.0)).unwrap();
        buf.extend_from_slice(b"\n\n");

        let lines = read_records(Cursor::new(buf)).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.is_ok()));
    }

    #[test]
    fn test_corrupt_line_reported_with_line_number() {
        let input = concat!(
            r#"{"Teilnehmer_in": "a", "Zeit": 1.0, "Datensatz": "d", "Eintrag": "x"}"#,
            "\n",
            "not json\n",
            r#"{"Teilnehmer_in": "b", "Datensatz": "d", "Eintrag": "x"}"#,
            "\n",
        );
        let lines = read_records(Cursor::new(input)).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].is_ok());
        assert_eq!(lines[1].as_ref().unwrap_err().line, 2);
        assert_eq!(lines[2].as_ref().unwrap_err().line, 3);

        let valid = skip_corrupt(lines);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].participant, "a");
    }

    #[test]
    fn test_invalid_utf8_line_is_corrupt_not_fatal() {
        let mut buf = Vec::new();
        write_record(&mut buf, &record("a", 1.0)).unwrap();
        buf.extend_from_slice(b"\xff\xfe garbage\n");
        buf.extend_from_slice(b"{\"Teilnehmer_in\": \"x\xff\", \"Zeit\": 1, \"Datensatz\": \"d\", \"Eintrag\": \"e\"}\r\n");
        write_record(&mut buf, &record("b", 2.0)).unwrap();

        let lines = read_records(Cursor::new(buf)).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].as_ref().unwrap_err().line, 2);
        assert_eq!(lines[2].as_ref().unwrap_err().line, 3);

        let valid = skip_corrupt(lines);
        let names: Vec<&str> = valid.iter().map(|r| r.participant.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_crlf_line_endings_decode() {
        let input = "{\"Teilnehmer_in\": \"a\", \"Zeit\": 1.5, \"Datensatz\": \"d\", \"Eintrag\": \"x\"}\r\n\r\n";
        let lines = read_records(Cursor::new(input)).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref().unwrap().elapsed_seconds, 1.5);
    }

    #[test]
    fn test_append_then_load_returns_record_last() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::new(dir.path().join("results.json"));

        store.append(&record("alice", 3.25)).unwrap();
        let last = record("bob", 4.75);
        store.append(&last).unwrap();

        let loaded = store.load_valid().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.last(), Some(&last));
        assert_eq!(loaded[0].participant, "alice");
    }

    #[test]
    fn test_empty_log_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "").unwrap();
        let store = ResultStore::new(&path);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_log_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::new(dir.path().join("absent.json"));
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
