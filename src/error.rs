use thiserror::Error;

use crate::sheet::ReadError;

/// Reasons an upload is rejected. The `Display` form is the status line shown
/// to the user, so every variant names the uploaded file.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Error processing file: {source}")]
    Unreadable {
        filename: String,
        #[source]
        source: ReadError,
    },

    #[error(
        "Error processing file: missing required column(s) {} in '{filename}'",
        quoted(.missing)
    )]
    SchemaMismatch {
        filename: String,
        missing: Vec<String>,
    },

    #[error("No valid data from {year_floor} in '{filename}'. Please upload a suitable file.")]
    NoAcceptableRows { filename: String, year_floor: i32 },
}

impl IngestError {
    /// Name of the upload that failed.
    pub fn filename(&self) -> &str {
        match self {
            IngestError::Unreadable { filename, .. }
            | IngestError::SchemaMismatch { filename, .. }
            | IngestError::NoAcceptableRows { filename, .. } => filename,
        }
    }

    /// Status line for the upload widget.
    pub fn status_message(&self) -> String {
        self.to_string()
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, IngestError>;
