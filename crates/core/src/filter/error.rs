use thiserror::Error;

/// Errors raised while parsing a wildcard pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WildcardError {
    #[error("Invalid wildcard '{pattern}': unbalanced bracket at position {position}")]
    UnbalancedBracket { pattern: String, position: usize },
    #[error("Invalid wildcard '{pattern}': empty character class at position {position}")]
    EmptyClass { pattern: String, position: usize },
    #[error("Invalid wildcard '{pattern}': range {start}-{end} is reversed")]
    InvalidRange {
        pattern: String,
        start: char,
        end: char,
    },
    #[error("Invalid wildcard '{pattern}': {reason}")]
    Invalid { pattern: String, reason: String },
}
