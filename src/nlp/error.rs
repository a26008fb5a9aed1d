// Error types for lexicon loading and sentiment scoring
use thiserror::Error;

/// Errors surfaced by the sentiment analyzer.
///
/// Loading errors leave any previously loaded lexicon in place. Scoring errors
/// are precondition violations and never degrade to a neutral score.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// The lexicon source could not be read or parsed.
    #[error("failed to load lexicon: {0}")]
    Load(String),

    /// A lexicon record carries a malformed attribute.
    #[error("malformed lexicon record: {0}")]
    Schema(String),

    /// A scoring call was made before any lexicon was loaded.
    #[error("no sentiment lexicon is loaded, call `load` first")]
    NotLoaded,

    /// The input to score is not text.
    #[error("unsupported input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for SentimentError {
    fn from(e: std::io::Error) -> Self {
        SentimentError::Load(e.to_string())
    }
}

impl From<roxmltree::Error> for SentimentError {
    fn from(e: roxmltree::Error) -> Self {
        SentimentError::Load(format!("XML parsing failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
