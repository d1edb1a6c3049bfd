use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Errors from loading keys and generating sentinels.
#[derive(Error, Debug)]
pub enum Error {
    /// The key file could not be opened or read.
    #[error("cannot read key file {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line in the key file is not of the form `index key`. Lines are
    /// numbered from 1.
    #[error("key file line {line}: {kind}")]
    Parse { line: usize, kind: LineError },

    /// An argument is out of range, e.g., zero sentinels per key.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Empty key material.
    #[error("sentinel keys must not be empty")]
    InvalidKey,
}

/// Why a key-file line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    /// The line is empty or only whitespace.
    Blank,
    /// The line has an index but no key.
    MissingKey,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LineError::Blank => write!(f, "blank line, expected 'index key'"),
            LineError::MissingKey => write!(f, "missing key, expected 'index key'"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
