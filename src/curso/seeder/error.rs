use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SeedError>;

/// Error type covering the different failure cases that can occur while the
/// seeder loads credentials, reads course files, or talks to the backend.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Wrapper for IO failures such as reading course files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialisation of a row payload fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a course file does not parse as JSON.
    #[error("invalid JSON in {path}: {source}")]
    MalformedCourse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a file parses as JSON but does not have the course shape.
    #[error("invalid course file {path}: {reason}")]
    InvalidCourse { path: PathBuf, reason: String },

    /// Raised when a lesson omits its topic slug.
    #[error("lesson without 'topic_slug' in {path}")]
    MissingTopicSlug { path: PathBuf },

    /// Raised when a lesson omits its exercise list, or it is not a list.
    #[error("lesson '{topic_slug}' has no 'exercises' list")]
    MissingExercises { topic_slug: String },

    /// Raised when an exercise record omits its required type.
    #[error("exercise {position} of lesson {lesson_id} is missing 'type'")]
    MissingExerciseType { lesson_id: String, position: usize },

    /// Raised when the backend URL or API key cannot be resolved.
    #[error("missing configuration: {0}")]
    Config(String),

    /// Transport-level failures while talking to the backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when the backend answers with a non-success status.
    #[error("backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Raised when a backend response does not carry what the caller asked
    /// for, such as an insert without the inserted representation.
    #[error("unexpected backend response: {0}")]
    UnexpectedResponse(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
