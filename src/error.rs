use std::path::PathBuf;
use thiserror::Error;

/// The main error type for stackconv operations.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("IO error on {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot query destination {path}: {source}")]
    QueryDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid range for {axis} axis: {message}")]
    Range { axis: String, message: String },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Failed to parse rawstack header from {path}: {source}")]
    HeaderParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write rawstack header to {path}: {source}")]
    HeaderWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read plane #{plane} from {path}: {source}")]
    PlaneRead {
        plane: u64,
        path: PathBuf,
        #[source]
        source: Box<StackError>,
    },

    #[error("Failed to write plane #{plane} to {path}: {source}")]
    PlaneWrite {
        plane: u64,
        path: PathBuf,
        #[source]
        source: Box<StackError>,
    },

    #[error("Output file {path} exists and will not be overwritten")]
    OverwriteAborted { path: PathBuf },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("Failed to serialize report: {0}")]
    ReportJson(#[source] serde_json::Error),
}

impl StackError {
    /// Shorthand for a range error on a named axis.
    pub fn range(axis: impl Into<String>, message: impl Into<String>) -> Self {
        StackError::Range {
            axis: axis.into(),
            message: message.into(),
        }
    }

    /// Attach a path to a bare IO error.
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StackError::IoAt {
            path: path.into(),
            source,
        }
    }
}
