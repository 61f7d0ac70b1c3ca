use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("shape mismatch for {group}: expected {expected} series, got {got}")]
    Shape {
        group: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("distance worker failed for reference {reference}: {reason}")]
    Worker { reference: usize, reason: String },
    #[error("invalid state: {0}")]
    State(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing expert references")]
    MissingReferences,
    #[error("missing feedback sink")]
    MissingSink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T, E = eyre::Report> = core::result::Result<T, E>;
pub use eyre::Report;
