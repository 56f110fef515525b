use thiserror::Error;

/// Fatal errors raised by the matching pipeline
///
/// Any of these stops a run before a result is produced. Embedding oracle
/// failures are not listed here: they degrade a single attribute instead.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("No users provided for matching")]
    EmptyInput,

    #[error("No veteranes available for matching")]
    NoMentors,

    #[error("No bixes available for matching")]
    NoMentees,

    #[error("Invalid participant record at position {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },

    #[error("Invalid column type: {kind} (attribute '{attribute}')")]
    UnknownAttributeKind { attribute: String, kind: String },

    #[error("Invalid attribute schema: {0}")]
    InvalidSchema(String),

    #[error("Cannot distribute {total} slots over {participants} participants with at most {cap} each")]
    InfeasibleCapacity {
        participants: usize,
        total: usize,
        cap: usize,
    },

    #[error("Matrix shape mismatch for '{name}': expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        name: String,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Matching solver failed: {0}")]
    Solver(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, MatchError>;
