use std::path::PathBuf;

/// Failures of the few operations that can genuinely fail: loading files and
/// parsing user-supplied definitions. The table pipeline itself is total.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid table definition: {0}")]
    InvalidDefinition(String),

    #[error("invalid criterion '{criterion}': {reason}")]
    InvalidCriterion { criterion: String, reason: String },

    #[error("invalid pattern for '{column}': {source}")]
    InvalidPattern {
        column: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
