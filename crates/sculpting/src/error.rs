//! Sculpting errors and the host-facing reports they turn into.

use uvmesh::{MeshError, TransferError};
use uvsculpt_config::ConfigError;

/// Errors raised by the brush tool and its commands
#[derive(Debug, thiserror::Error)]
pub enum SculptError {
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Relax method is not supported")]
    UnsupportedRelaxMethod,

    #[error("UV Sculpt is already running")]
    AlreadyRunning,

    #[error("UV Sculpt is not running")]
    NotRunning,
}

/// How loudly a host should surface a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message for the host's status bar or log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub message: String,
}

impl Report {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl From<&SculptError> for Report {
    fn from(err: &SculptError) -> Self {
        match err {
            SculptError::InvalidContext(_) => Report::error(err.to_string()),
            _ => Report::warning(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_severity() {
        let report = Report::from(&SculptError::InvalidContext("not in edit mode".into()));
        assert_eq!(report.severity, Severity::Error);
        assert_eq!(report.message, "Invalid context: not in edit mode");

        let report = Report::from(&SculptError::Transfer(TransferError::NothingCopied));
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.message, TransferError::NothingCopied.to_string());
    }
}
