use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy shared by the loader, chart payloads and forecast artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Registry misconfiguration: the name does not map to a known category.
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("data file not found: {}", path.display())]
    DataSourceMissing { path: PathBuf },

    #[error("could not parse {}: {reason}", path.display())]
    MalformedSource { path: PathBuf, reason: String },

    #[error("model artifact unavailable ({}): {reason}", path.display())]
    ModelArtifactUnavailable { path: PathBuf, reason: String },

    #[error("no data available for {0}")]
    EmptyResult(String),
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

/// How loudly a failure is surfaced in a page section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl DashboardError {
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::UnknownCategory(_) => Severity::Error,
            DashboardError::DataSourceMissing { .. }
            | DashboardError::MalformedSource { .. }
            | DashboardError::ModelArtifactUnavailable { .. } => Severity::Warning,
            DashboardError::EmptyResult(_) => Severity::Info,
        }
    }

    /// Build a `MalformedSource` from any displayable cause.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        DashboardError::MalformedSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Map a failed file open onto the taxonomy: not-found is a missing
    /// source, everything else is treated as unreadable.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            DashboardError::DataSourceMissing { path }
        } else {
            DashboardError::MalformedSource {
                path,
                reason: err.to_string(),
            }
        }
    }
}
