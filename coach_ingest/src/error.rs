use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed sample at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
