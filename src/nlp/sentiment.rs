// Sentiment analysis using a lexicon of per-word polarity, subjectivity and intensity
// scores. Polarity runs from -1.0 (negative) to +1.0 (positive), subjectivity from
// 0.0 (objective) to 1.0 (subjective).
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::aggregate;
use super::assessment::{assess, Assessment, Rules};
use super::config::SentimentConfig;
use super::error::{Result, SentimentError};
use super::lexicon::{Lexicon, LexiconSource, SynsetPos};
use super::tokenizer::find_tokens;

/// Polarity at or above which a text counts as positive.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
    pub assessments: Vec<Assessment>,
}

type Tokenizer = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Lexicon-based sentiment analyzer for one language.
///
/// The lexicon sits behind a read-write lock as an `Arc`: a load builds the new
/// table completely and swaps it in, so a scoring call sees either the old or
/// the new lexicon, never a half-built one.
pub struct SentimentAnalyzer {
    config: SentimentConfig,
    rules: Rules,
    tokenizer: Tokenizer,
    lexicon: RwLock<Option<Arc<Lexicon>>>,
}

impl SentimentAnalyzer {
    pub fn new(config: SentimentConfig) -> Self {
        Self {
            rules: config.rules(),
            config,
            tokenizer: Box::new(find_tokens),
            lexicon: RwLock::new(None),
        }
    }

    /// Analyzer for English text using the bundled lexicon. Call [`load`](Self::load) before scoring.
    pub fn english() -> Self {
        Self::new(SentimentConfig::english())
    }

    pub fn with_tokenizer<F>(mut self, tokenizer: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Overrides the word-shape test for modifiers (by default: ends in the configured suffix).
    pub fn with_modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules = self.rules.with_modifier(modifier);
        self
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    /// Loads the lexicon file named in the configuration.
    pub fn load(&self) -> Result<()> {
        let path = self
            .config
            .lexicon
            .clone()
            .ok_or_else(|| SentimentError::Load("no lexicon path configured".to_string()))?;
        self.load_from(&path)
    }

    pub fn load_from(&self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "loading sentiment lexicon");
        let lexicon = Lexicon::read(path, self.config.synset.as_deref(), self.config.confidence);
        self.install(lexicon)
    }

    pub fn load_xml(&self, xml: &str) -> Result<()> {
        let lexicon = Lexicon::parse(xml, self.config.synset.as_deref(), self.config.confidence);
        self.install(lexicon)
    }

    pub fn load_source(&self, source: LexiconSource) -> Result<()> {
        let lexicon = Lexicon::from_source(source, self.config.confidence);
        self.install(lexicon)
    }

    /// Loads `path` on the rayon pool and hands the outcome to `on_complete`.
    pub fn load_in_background<F>(self: &Arc<Self>, path: PathBuf, on_complete: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let analyzer = Arc::clone(self);
        rayon::spawn(move || on_complete(analyzer.load_from(&path)));
    }

    // Replaces the current lexicon only when the new one was built successfully.
    fn install(&self, built: Result<Lexicon>) -> Result<()> {
        let mut lexicon = match built {
            Ok(lexicon) => lexicon,
            Err(e) => {
                tracing::warn!(error = %e, "lexicon load failed, keeping the previous lexicon");
                return Err(e);
            }
        };
        if self.config.derive_adverbs {
            lexicon.derive_adverbs("JJ", "RB");
        }
        tracing::info!(
            words = lexicon.len(),
            labels = lexicon.label_count(),
            synsets = lexicon.synset_count(),
            language = lexicon.language().or(self.config.language.as_deref()).unwrap_or("unknown"),
            "loaded sentiment lexicon"
        );
        *self.lexicon.write() = Some(Arc::new(lexicon));
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.lexicon.read().as_ref().map_or(false, |l| !l.is_empty())
    }

    /// Language declared by the loaded lexicon, else the configured one.
    pub fn language(&self) -> Option<String> {
        self.lexicon
            .read()
            .as_ref()
            .and_then(|l| l.language().map(str::to_string))
            .or_else(|| self.config.language.clone())
    }

    /// Snapshot of the current lexicon.
    pub fn lexicon(&self) -> Result<Arc<Lexicon>> {
        match self.lexicon.read().as_ref() {
            Some(lexicon) if !lexicon.is_empty() => Ok(Arc::clone(lexicon)),
            _ => Err(SentimentError::NotLoaded),
        }
    }

    /// Adds or overwrites the scores of `word` under `pos`; the word's untagged
    /// scores become the same triple.
    pub fn annotate(
        &self,
        word: &str,
        pos: Option<&str>,
        polarity: f64,
        subjectivity: f64,
        intensity: f64,
        label: Option<&str>,
    ) {
        let mut guard = self.lexicon.write();
        let lexicon = guard.get_or_insert_with(|| Arc::new(Lexicon::default()));
        Arc::make_mut(lexicon).annotate(word, pos, polarity, subjectivity, intensity, label);
    }

    pub fn get(&self, text: &str) -> Result<Sentiment> {
        self.get_with(text, true, |_| 1.0)
    }

    /// Scores `text`. `negation` toggles negation handling; `weight` maps each
    /// assessment's subjectivity to its weight in the averages.
    pub fn get_with<F>(&self, text: &str, negation: bool, weight: F) -> Result<Sentiment>
    where
        F: Fn(f64) -> f64,
    {
        let lexicon = self.lexicon()?;
        let tokens: Vec<(String, Option<String>)> = (self.tokenizer)(text)
            .iter()
            .flat_map(|t| t.split(' '))
            .map(|w| (w.to_lowercase(), None))
            .collect();
        let assessments = assess(&lexicon, &self.rules, &tokens, negation);
        Ok(Sentiment {
            polarity: aggregate::polarity(&assessments, &weight),
            subjectivity: aggregate::subjectivity(&assessments, &weight),
            assessments,
        })
    }

    /// Scores raw bytes, which must be UTF-8 text.
    pub fn get_bytes(&self, bytes: &[u8]) -> Result<Sentiment> {
        self.lexicon()?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SentimentError::InvalidInput(format!("input is not UTF-8 text: {}", e)))?;
        self.get(text)
    }

    /// Assesses already tokenized, optionally POS-tagged words.
    pub fn assess(&self, tokens: &[(String, Option<String>)], negation: bool) -> Result<Vec<Assessment>> {
        let lexicon = self.lexicon()?;
        Ok(assess(&lexicon, &self.rules, tokens, negation))
    }

    pub fn positive(&self, text: &str) -> Result<bool> {
        self.positive_with(text, DEFAULT_THRESHOLD)
    }

    pub fn positive_with(&self, text: &str, threshold: f64) -> Result<bool> {
        Ok(self.get(text)?.polarity >= threshold)
    }

    /// Averaged `(polarity, subjectivity)` of a synset id, if the lexicon has it.
    pub fn synset(&self, id: &str, pos: Option<SynsetPos>) -> Result<Option<(f64, f64)>> {
        Ok(self.lexicon()?.synset(id, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::assessment::MOOD;
    use crate::nlp::lexicon::LexiconRecord;
    use std::sync::mpsc;

    fn english() -> SentimentAnalyzer {
        let analyzer = SentimentAnalyzer::english();
        analyzer.load().unwrap();
        analyzer
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn words(a: &Assessment) -> Vec<&str> {
        a.words.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_get_before_load_fails() {
        let analyzer = SentimentAnalyzer::english();
        assert!(matches!(analyzer.get("my sentence"), Err(SentimentError::NotLoaded)));
        assert!(matches!(analyzer.positive("good"), Err(SentimentError::NotLoaded)));
        assert!(matches!(analyzer.get_bytes(b"good"), Err(SentimentError::NotLoaded)));
        assert!(!analyzer.is_loaded());
    }

    #[test]
    fn test_load_without_path_fails() {
        let analyzer = SentimentAnalyzer::new(SentimentConfig::default());
        assert!(matches!(analyzer.load(), Err(SentimentError::Load(_))));
    }

    #[test]
    fn test_get_returns_scores() {
        let analyzer = english();
        assert!(analyzer.is_loaded());
        let result = analyzer.get("my sentence").unwrap();
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.subjectivity, 0.0);
        assert!(result.assessments.is_empty());
    }

    #[test]
    fn test_non_text_input_fails() {
        let analyzer = english();
        let err = analyzer.get_bytes(&[0x67, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, SentimentError::InvalidInput(_)));
        assert!(analyzer.get_bytes("good".as_bytes()).is_ok());
    }

    #[test]
    fn test_movie_review() {
        let analyzer = english();
        let result = analyzer
            .get("The movie attempts to be surreal by incorporating various time paradoxes, but it's presented in such a ridiculous way it's seriously boring.")
            .unwrap();
        assert_eq!(result.polarity, -0.21666666666666665);
        assert_eq!(result.subjectivity, 0.8);
        let a = &result.assessments;
        assert_eq!(a.len(), 5);
        assert_eq!(words(&a[0]), vec!["surreal"]);
        assert_eq!((a[0].polarity, a[0].subjectivity), (0.25, 1.0));
        assert_eq!(words(&a[1]), vec!["various"]);
        assert_eq!((a[1].polarity, a[1].subjectivity), (0.0, 0.5));
        assert_eq!(words(&a[2]), vec!["such"]);
        assert_eq!((a[2].polarity, a[2].subjectivity), (0.0, 0.5));
        assert_eq!(words(&a[3]), vec!["ridiculous"]);
        assert!(close(a[3].polarity, -0.3333333333333333) && close(a[3].subjectivity, 1.0));
        assert_eq!(words(&a[4]), vec!["seriously", "boring"]);
        assert_eq!((a[4].polarity, a[4].subjectivity), (-1.0, 1.0));
        assert!(a.iter().all(|x| x.label.is_none()));
    }

    #[test]
    fn test_exclamation_and_emoticon() {
        let analyzer = english();
        let result = analyzer.get("Wonderfully awful! :-)").unwrap();
        assert_eq!(result.polarity, -0.25);
        assert_eq!(result.subjectivity, 1.0);
        let a = &result.assessments;
        assert_eq!(a.len(), 2);
        assert_eq!(words(&a[0]), vec!["wonderfully", "awful", "!"]);
        assert_eq!(a[0].polarity, -1.0);
        assert_eq!(a[0].subjectivity, 1.0);
        assert_eq!(a[0].label, None);
        assert_eq!(words(&a[1]), vec![":-)"]);
        assert_eq!(a[1].polarity, 0.5);
        assert_eq!(a[1].subjectivity, 1.0);
        assert_eq!(a[1].label.as_deref(), Some(MOOD));
    }

    #[test]
    fn test_emoticons_next_to_punctuation() {
        let analyzer = english();

        let result = analyzer.get("I loved it :).").unwrap();
        assert_eq!(result.assessments.len(), 1);
        assert_eq!(words(&result.assessments[0]), vec![":)"]);
        assert_eq!(result.polarity, 0.5);

        let result = analyzer.get("Nice :-), really").unwrap();
        let mood: Vec<_> = result
            .assessments
            .iter()
            .filter(|a| a.label.as_deref() == Some(MOOD))
            .collect();
        assert_eq!(mood.len(), 1);
        assert_eq!(words(mood[0]), vec![":-)"]);

        let a = analyzer.get("great :-)!").unwrap().assessments;
        assert_eq!(a.len(), 2);
        assert_eq!(words(&a[0]), vec!["great"]);
        assert_eq!(a[0].polarity, 0.8);
        assert_eq!(words(&a[1]), vec![":-)", "!"]);
        assert_eq!(a[1].polarity, 0.625);
        assert_eq!(a[1].label.as_deref(), Some(MOOD));
    }

    #[test]
    fn test_positive_default_threshold() {
        let analyzer = english();
        assert!(analyzer.positive("This is a good book").unwrap());
        assert!(!analyzer.positive("This is a bad book").unwrap());
    }

    #[test]
    fn test_positive_custom_threshold() {
        let analyzer = english();
        assert!(!analyzer.positive_with("This is a good book", 0.8).unwrap());
        assert!(analyzer.positive_with("This is a very good book", 0.8).unwrap());
    }

    #[test]
    fn test_negation() {
        let analyzer = english();
        let result = analyzer.get("This is not a good book").unwrap();
        assert_eq!(words(&result.assessments[0]), vec!["not", "good"]);
        assert!(close(result.polarity, -0.35));

        let result = analyzer.get("I don't hate it").unwrap();
        assert_eq!(words(&result.assessments[0]), vec!["n't", "hate"]);
        assert!(close(result.polarity, 0.4));

        let result = analyzer.get_with("This is not a good book", false, |_| 1.0).unwrap();
        assert_eq!(words(&result.assessments[0]), vec!["good"]);
        assert!(result.polarity > 0.6);
    }

    #[test]
    fn test_irony() {
        let analyzer = english();
        let result = analyzer.get("What a great idea (!)").unwrap();
        assert_eq!(result.assessments.len(), 2);
        assert_eq!(result.assessments[1].label.as_deref(), Some("irony"));
        assert!(close(result.polarity, 0.4));
    }

    #[test]
    fn test_weight_function() {
        let analyzer = english();
        // "best" (subjectivity 0.3) and "worst" (subjectivity 1.0)
        let flat = analyzer.get("best and worst").unwrap();
        assert!(close(flat.polarity, 0.0));
        let weighted = analyzer.get_with("best and worst", true, |s| s).unwrap();
        assert!(close(weighted.polarity, (0.3 - 1.0) / 1.3));
    }

    #[test]
    fn test_language_and_synsets() {
        let analyzer = english();
        assert_eq!(analyzer.language().as_deref(), Some("en"));
        let (p, s) = analyzer.synset("a-01126291", None).unwrap().unwrap();
        assert!(close(p, -1.0) && close(s, 1.0));
        let (p, _) = analyzer
            .synset("1345307", Some(SynsetPos::Adjective))
            .unwrap()
            .unwrap();
        assert!(close(p, -0.65));
        assert_eq!(analyzer.synset("0", None).unwrap(), None);
    }

    #[test]
    fn test_derived_adverbs() {
        let analyzer = english();
        let lexicon = analyzer.lexicon().unwrap();
        assert!(lexicon.word("happily").unwrap().has_tag("RB"));
        assert!(lexicon.word("seriously").is_some());

        let plain = SentimentAnalyzer::new(SentimentConfig {
            derive_adverbs: false,
            ..SentimentConfig::english()
        });
        plain.load().unwrap();
        assert!(plain.lexicon().unwrap().word("happily").is_none());
    }

    #[test]
    fn test_confidence_threshold() {
        let analyzer = SentimentAnalyzer::new(SentimentConfig {
            confidence: Some(0.85),
            ..SentimentConfig::english()
        });
        analyzer.load().unwrap();
        let lexicon = analyzer.lexicon().unwrap();
        assert!(lexicon.word("good").is_some());
        assert!(lexicon.word("damn").is_none());
        assert!(lexicon.word("simple").is_none());
    }

    #[test]
    fn test_annotate() {
        let analyzer = english();
        assert!(analyzer.get("this is meh").unwrap().assessments.is_empty());
        analyzer.annotate("meh", Some("JJ"), -0.3, 0.7, 1.0, Some("slang"));
        let result = analyzer.get("this is meh").unwrap();
        assert_eq!(result.assessments.len(), 1);
        assert!(close(result.polarity, -0.3));
        assert_eq!(result.assessments[0].label.as_deref(), Some("slang"));
    }

    #[test]
    fn test_annotate_before_load() {
        let analyzer = SentimentAnalyzer::new(SentimentConfig::default());
        analyzer.annotate("groovy", None, 0.6, 0.9, 1.0, None);
        assert!(analyzer.is_loaded());
        assert!(close(analyzer.get("groovy").unwrap().polarity, 0.6));
    }

    #[test]
    fn test_failed_load_keeps_previous_lexicon() {
        let analyzer = english();
        let err = analyzer.load_xml("<sentiment><word form=").unwrap_err();
        assert!(matches!(err, SentimentError::Load(_)));
        assert!(analyzer.positive("This is a good book").unwrap());

        let err = analyzer.load_from(Path::new("/nonexistent/lexicon.xml")).unwrap_err();
        assert!(matches!(err, SentimentError::Load(_)));
        assert!(analyzer.is_loaded());
    }

    #[test]
    fn test_load_json_lexicon_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("lexicon.json");
        std::fs::write(
            &path,
            r#"{"language": "en", "records": [{"form": "zork", "pos": "JJ", "polarity": 0.9, "subjectivity": 0.4}]}"#,
        )
        .unwrap();

        let analyzer = SentimentAnalyzer::new(SentimentConfig::default());
        analyzer.load_from(&path).unwrap();
        assert_eq!(analyzer.language().as_deref(), Some("en"));
        assert_eq!(analyzer.get("zork").unwrap().polarity, 0.9);
    }

    #[test]
    fn test_zero_intensity_rejected_on_load() {
        let analyzer = english();
        let err = analyzer
            .load_xml(r#"<sentiment><word form="meh" pos="JJ" intensity="0" /></sentiment>"#)
            .unwrap_err();
        assert!(matches!(err, SentimentError::Schema(_)));
        assert!(analyzer.positive("This is a good book").unwrap());
    }

    #[test]
    fn test_load_replaces_lexicon() {
        let analyzer = english();
        analyzer
            .load_xml(r#"<sentiment language="xx"><word form="zork" pos="JJ" polarity="0.9" subjectivity="0.9" /></sentiment>"#)
            .unwrap();
        assert_eq!(analyzer.language().as_deref(), Some("xx"));
        assert!(analyzer.get("good").unwrap().assessments.is_empty());
        assert!(close(analyzer.get("zork").unwrap().polarity, 0.9));
    }

    #[test]
    fn test_empty_lexicon_counts_as_not_loaded() {
        let analyzer = SentimentAnalyzer::new(SentimentConfig::default());
        analyzer.load_xml("<sentiment/>").unwrap();
        assert!(matches!(analyzer.get("good"), Err(SentimentError::NotLoaded)));
    }

    #[test]
    fn test_load_source_and_tagged_assess() {
        let analyzer = SentimentAnalyzer::new(SentimentConfig::default());
        analyzer
            .load_source(LexiconSource {
                language: None,
                records: vec![
                    LexiconRecord::word("fair", "JJ", 0.5, 0.5),
                    LexiconRecord::word("fair", "NN", 0.0, 0.1),
                ],
            })
            .unwrap();
        assert_eq!(analyzer.language(), None);
        let tokens = vec![("fair".to_string(), Some("NN".to_string()))];
        let a = analyzer.assess(&tokens, true).unwrap();
        assert_eq!(a[0].polarity, 0.0);
        assert!(close(analyzer.get("fair").unwrap().polarity, 0.25));
    }

    #[test]
    fn test_custom_tokenizer_and_modifier() {
        let analyzer = SentimentAnalyzer::english()
            .with_tokenizer(|text: &str| text.split('|').map(str::to_string).collect())
            .with_modifier(|w: &str| w == "so");
        analyzer.load().unwrap();
        let result = analyzer.get("good|bad").unwrap();
        assert_eq!(result.assessments.len(), 2);
        assert!(analyzer.get("good,bad").unwrap().assessments.is_empty());
    }

    #[test]
    fn test_load_in_background() {
        let analyzer = Arc::new(SentimentAnalyzer::english());
        let (tx, rx) = mpsc::channel();
        let path = analyzer.config().lexicon.clone().unwrap();
        analyzer.load_in_background(path, move |result| {
            tx.send(result.is_ok()).unwrap();
        });
        assert!(rx.recv().unwrap());
        assert!(analyzer.positive("This is a good book").unwrap());
    }

    #[test]
    fn test_concurrent_reads_during_reload() {
        let analyzer = Arc::new(english());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let analyzer = Arc::clone(&analyzer);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let result = analyzer.get("Wonderfully awful! :-)").unwrap();
                        assert_eq!(result.assessments.len(), 2);
                    }
                })
            })
            .collect();
        for _ in 0..5 {
            analyzer.load().unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
