use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between the data file and a rendered chart.
///
/// `Load`, `UnsupportedFormat` and `Io` mean the file itself could not be
/// read; `Schema` and `MissingColumn` mean it was read but lacks a column we
/// need; `Empty` means a particular aggregation had nothing to work with.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column(s) {missing:?}; columns found: {found:?}")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("column '{0}' is not present in the dataset")]
    MissingColumn(String),

    #[error("no data available for {0}")]
    Empty(&'static str),
}

impl DataError {
    /// Whether the error comes from reading the file, as opposed to the
    /// content of an otherwise readable file.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DataError::Io { .. } | DataError::Load { .. } | DataError::UnsupportedFormat(_)
        )
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;

/// Invalid process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port '{value}': {source}")]
    Port {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid palette colour '{0}'")]
    Color(String),

    #[error("palette must contain at least one colour")]
    EmptyPalette,
}
