//! Error types for procfs parsing and sampling.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::fsutil::FileOpenError;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value for '{field}': '{value}': {source}")]
    InvalidValue {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("process name is not enclosed in parentheses")]
    MalformedName,

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to sample one file of one process.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Open(#[from] FileOpenError),
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
}
