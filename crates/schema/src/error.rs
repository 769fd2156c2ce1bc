//! Schema loading errors
//!
//! Only startup can fail here; per-payload problems are `ValidationError`s.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema directory or file unreadable
    #[error("failed to read schema '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not valid JSON
    #[error("failed to parse schema '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// Schema root must be a JSON object
    #[error("schema '{path}' must be a JSON object")]
    NotObject { path: PathBuf },
}
