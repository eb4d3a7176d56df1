//! Error taxonomy shared by every stage of a rename run

use std::io;
use std::path::PathBuf;

/// Errors raised while renaming files from a renumbering workbook.
///
/// Every variant aborts the run; there is no local recovery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, unreadable, empty or incomplete configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document store rejected the credentials
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The download itself failed
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// The downloaded workbook could not be opened or a sheet could not be read
    #[error("failed to read workbook {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },

    /// A sheet requested by name does not exist in the workbook
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// A required column label is absent from its search range
    #[error("no cell labelled '{label}' in range {range}")]
    LabelNotFound { label: String, range: String },

    /// Counts or values that must agree do not
    #[error("data coherence check failed: {0}")]
    DataCoherence(String),

    /// Reading a directory, writing the temp file or renaming failed
    #[error("filesystem error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The console could not be read
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
