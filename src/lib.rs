//! Polarity and subjectivity scoring of text with a sentiment lexicon.
//!
//! ```no_run
//! use emotional::SentimentAnalyzer;
//!
//! let analyzer = SentimentAnalyzer::english();
//! analyzer.load()?;
//! let result = analyzer.get("Wonderfully awful! :-)")?;
//! println!("{} {}", result.polarity, result.subjectivity);
//! # Ok::<(), emotional::SentimentError>(())
//! ```
pub mod nlp;

pub use nlp::*;
