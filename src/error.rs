use std::path::PathBuf;

use thiserror::Error;

/// Failures at the file boundaries. Anything inside a record is never an error.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("XML document has no root element")]
    MissingRoot,

    #[error("XML document ends with {open} unclosed element(s)")]
    Truncated { open: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("template {0} has no header row")]
    MissingHeader(PathBuf),
}

impl MigrateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.into(),
            source,
        }
    }
}
