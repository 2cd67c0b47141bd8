// src/error.rs
//! Typed errors for the trigger core. Outer layers wrap these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// A cutoff string that is not `YYYY-MM-DDTHH:MM:SSZ`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed timestamp `{value}` (expected YYYY-MM-DDTHH:MM:SSZ)")]
pub struct TimestampError {
    pub value: String,
}

/// A [`TriggerId`](crate::trigger::TriggerId) that points outside the arena it was used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("trigger id {index} is not in this arena ({len} nodes)")]
pub struct ForeignTriggerId {
    pub index: usize,
    pub len: usize,
}

/// Why a configuration line could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineFault {
    #[error("missing trigger kind")]
    MissingKind,
    #[error("unknown trigger kind `{0}`")]
    UnknownKind(String),
    #[error("{kind} needs {expected} fields, found {found}")]
    MissingArguments {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failure to load or compile a trigger configuration.
///
/// Line numbers are 1-based and count every input line, including comments
/// and blank lines, so they point straight into the source file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: malformed timestamp `{value}` (expected YYYY-MM-DDTHH:MM:SSZ)")]
    MalformedTimestamp { line: usize, value: String },

    #[error("line {line}: {fault}: `{text}`")]
    MalformedLine {
        line: usize,
        text: String,
        fault: LineFault,
    },

    #[error(transparent)]
    ForeignTrigger(#[from] ForeignTriggerId),

    #[error("failed to read trigger config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// The offending line, when the error came from a specific line.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::MalformedTimestamp { line, .. } | ConfigError::MalformedLine { line, .. } => {
                Some(*line)
            }
            ConfigError::ForeignTrigger(_) | ConfigError::Io { .. } => None,
        }
    }
}
