//! Error types for the Speliuk library.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! the [`SpeliukError`] enum.
//!
//! # Examples
//!
//! ```
//! use speliuk::error::{Result, SpeliukError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SpeliukError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Speliuk operations.
#[derive(Error, Debug)]
pub enum SpeliukError {
    /// I/O errors (artifact files, subprocess pipes, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Tokenization and document errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Frequency dictionary and candidate lookup errors
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// Language model loading and scoring errors
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// Annotated text errors (overlaps, bad offsets, malformed markup)
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Evaluation errors (M2 parsing, scorer invocation)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary model serialization errors
    #[error("Binary format error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SpeliukError.
pub type Result<T> = std::result::Result<T, SpeliukError>;

impl SpeliukError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Analysis(msg.into())
    }

    /// Create a new dictionary error.
    pub fn dictionary<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Dictionary(msg.into())
    }

    /// Create a new language model error.
    pub fn language_model<S: Into<String>>(msg: S) -> Self {
        SpeliukError::LanguageModel(msg.into())
    }

    /// Create a new annotation error.
    pub fn annotation<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Annotation(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Config(msg.into())
    }

    /// Create a new evaluation error.
    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Evaluation(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Other(format!("Parse error: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        SpeliukError::Other(format!("Not found: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SpeliukError::dictionary("missing term column");
        assert_eq!(error.to_string(), "Dictionary error: missing term column");

        let error = SpeliukError::language_model("no \\data\\ header");
        assert_eq!(error.to_string(), "Language model error: no \\data\\ header");

        let error = SpeliukError::annotation("overlap");
        assert_eq!(error.to_string(), "Annotation error: overlap");

        let error = SpeliukError::invalid_argument("empty word");
        assert_eq!(error.to_string(), "Error: Invalid argument: empty word");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SpeliukError::from(io_error);

        match error {
            SpeliukError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_anyhow_conversion() {
        let error = SpeliukError::from(anyhow::anyhow!("context lost"));
        assert!(matches!(error, SpeliukError::Anyhow(_)));
    }
}
