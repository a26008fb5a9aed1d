// Analyzer configuration, loadable from a JSON file
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::assessment::Rules;
use super::error::{Result, SentimentError};

/// Path of the English lexicon shipped with the crate.
pub const ENGLISH_LEXICON: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/en-sentiment.xml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Lexicon file used by `load`.
    pub lexicon: Option<PathBuf>,
    /// Fallback when the lexicon does not declare its language.
    pub language: Option<String>,
    /// Records with a lower confidence are skipped at load time.
    pub confidence: Option<f64>,
    pub negations: Vec<String>,
    /// POS tags whose words modify the next word.
    pub modifiers: Vec<String>,
    /// Words ending in this suffix count as modifiers when no POS tag says otherwise.
    pub modifier_suffix: String,
    /// Attribute holding the synset id, e.g. `wordnet_id`.
    pub synset: Option<String>,
    /// Annotate an `RB` adverb for every `JJ` adjective after loading.
    pub derive_adverbs: bool,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            lexicon: None,
            language: None,
            confidence: None,
            negations: ["no", "not", "n't", "never"].iter().map(|w| w.to_string()).collect(),
            modifiers: vec!["RB".to_string()],
            modifier_suffix: "ly".to_string(),
            synset: None,
            derive_adverbs: false,
        }
    }
}

impl SentimentConfig {
    /// The reference English setup: bundled lexicon, WordNet ids, derived adverbs.
    pub fn english() -> Self {
        Self {
            lexicon: Some(PathBuf::from(ENGLISH_LEXICON)),
            language: Some("en".to_string()),
            synset: Some("wordnet_id".to_string()),
            derive_adverbs: true,
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path)
            .map_err(|e| SentimentError::Load(format!("{}: {}", path.display(), e)))?;
        serde_json::from_reader(f)
            .map_err(|e| SentimentError::Load(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn rules(&self) -> Rules {
        let suffix = self.modifier_suffix.clone();
        Rules::new(self.negations.iter().cloned(), self.modifiers.iter().cloned())
            .with_modifier(move |w: &str| !suffix.is_empty() && w.ends_with(suffix.as_str()))
    }
}
