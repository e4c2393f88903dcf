//! Error types for the labelling daemon.
//!
//! Each failure kind gets its own type so call sites can decide whether to skip
//! a single item, abandon a cycle, or refuse to start.

use std::path::PathBuf;

/// Failure talking to the remote task service. Always transient from the
/// runner's point of view: the cycle is abandoned and retried.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("unexpected response payload: {0}")]
    Decode(String),

    /// The service accepted the batch but rejected some commands.
    #[error("{rejected} of {total} command(s) rejected")]
    Rejected { rejected: usize, total: usize },
}

/// Failure reading or writing the classification state file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Unusable configuration, reported before the first cycle.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no API token set; pass --api-key or set TODOIST_API_KEY")]
    MissingApiKey,

    #[error("end-of-day hour must be between 1 and 24, got {0}")]
    EndOfDayOutOfRange(u8),

    #[error("marker '{0}' must be exactly one character")]
    InvalidMarker(String),

    #[error("sequential and parallel markers must differ (both are '{0}')")]
    MarkerConflict(char),

    #[error("marker '{0}' collides with the header glyph '*'")]
    MarkerIsHeaderGlyph(char),

    #[error("label name must not be empty")]
    EmptyLabel,

    #[error("invalid inbox mode '{0}'; expected 'sequential' or 'parallel'")]
    InvalidInboxMode(String),

    #[error("invalid start-date format '{0}'")]
    InvalidDateFormat(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A deferral directive in an item's content that could not be understood.
/// Localized to that one item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("start date '{text}' does not match format '{format}'")]
    BadStartDate { text: String, format: String },

    #[error("relative start '{0}' must look like due-<NUMBER><d|w>")]
    BadRelativeStart(String),

    #[error("relative start '{0}' used on an item without a due date")]
    MissingDue(String),

    #[error("{0} start directives found, only the first is used")]
    Ambiguous(usize),
}

/// Why a whole cycle was abandoned.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to fetch snapshot: {0}")]
    Fetch(#[source] ServiceError),

    #[error("failed to commit changes: {0}")]
    Commit(#[source] ServiceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
