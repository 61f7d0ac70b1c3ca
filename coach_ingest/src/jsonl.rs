//! JSONL sample recordings: one JSON object per line, one line per sample.
//!
//! Line shape:
//! `{"right_shoulder":[..],"left_shoulder":[..],"right_elbow":[..],"left_elbow":[..]}`

use crate::error::IngestError;
use coach_traits::{RawSample, SampleSource};
use serde::Deserialize;
use std::io::BufRead;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SampleRecord {
    right_shoulder: Vec<f32>,
    left_shoulder: Vec<f32>,
    right_elbow: Vec<f32>,
    left_elbow: Vec<f32>,
}

impl From<SampleRecord> for RawSample {
    fn from(r: SampleRecord) -> Self {
        Self {
            right_shoulder: r.right_shoulder,
            left_shoulder: r.left_shoulder,
            right_elbow: r.right_elbow,
            left_elbow: r.left_elbow,
        }
    }
}

/// Parse one recording line. `line_no` is 1-based and only used for error
/// reporting.
pub fn parse_line(line: &str, line_no: usize) -> Result<RawSample, IngestError> {
    let record: SampleRecord =
        serde_json::from_str(line).map_err(|e| IngestError::Malformed {
            line: line_no,
            reason: e.to_string(),
        })?;
    Ok(record.into())
}

/// Streams samples out of a JSONL reader. Blank lines are skipped; a
/// malformed line aborts the stream with an error.
pub struct JsonlSource<R> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> JsonlSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line_no: 0 }
    }
}

impl<R: BufRead> SampleSource for JsonlSource<R> {
    fn next(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<RawSample>, Box<dyn std::error::Error + Send + Sync>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(parse_line(trimmed, self.line_no)?));
        }
    }
}
