// NLP module: lexicon-based polarity and subjectivity analysis
pub mod aggregate;
pub mod assessment;
pub mod config;
pub mod emoticons;
pub mod error;
pub mod lexicon;
pub mod sentiment;
pub mod tokenizer;

pub use assessment::{Assessment, Rules, IRONY, MOOD};
pub use config::SentimentConfig;
pub use error::{Result, SentimentError};
pub use lexicon::{Lexicon, LexiconEntry, LexiconRecord, LexiconSource, SynsetPos, WordRecord};
pub use sentiment::{Sentiment, SentimentAnalyzer, DEFAULT_THRESHOLD};
pub use tokenizer::find_tokens;
