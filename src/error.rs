//! Error types for dictionary loading and recognizer setup.

use thiserror::Error;

/// Errors raised while building a dictionary or configuring a recognizer.
///
/// Failures coming from an upstream token source are not wrapped here: the
/// recognizer hands them back to its caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The recognizer was built without an entity dictionary.
    #[error("recognizer has no entity dictionary")]
    MissingDictionary,

    /// The window size must be at least one token.
    #[error("max_tokens must be positive, got {0}")]
    InvalidMaxTokens(usize),

    /// A dictionary entry had an empty literal phrase.
    #[error("dictionary phrase is empty")]
    EmptyPhrase,

    /// A dictionary phrase contained a NUL character.
    #[error("dictionary phrase contains NUL: {0:?}")]
    NulInPhrase(String),

    /// A dictionary source line was not of the form `phrase<TAB>identifier`.
    #[error("malformed dictionary line {line}: {content:?}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// Reading a dictionary source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
