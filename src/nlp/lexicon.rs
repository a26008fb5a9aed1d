// Sentiment lexicon: per-word, per-part-of-speech polarity/subjectivity/intensity scores
// loaded from an XML or JSON word list, plus word labels and averaged synset scores.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::{Result, SentimentError};

/// Scores for one word under one part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub polarity: f64,
    pub subjectivity: f64,
    pub intensity: f64,
}

impl LexiconEntry {
    pub fn new(polarity: f64, subjectivity: f64, intensity: f64) -> Self {
        Self {
            polarity,
            subjectivity,
            intensity,
        }
    }
}

/// All entries known for a single word form.
///
/// `tagged` holds one entry per POS tag, with `None` for records that carried no
/// tag. `aggregate` is the entry used when a lookup has no POS tag; after loading
/// it is the mean of the tagged entries.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    tagged: Vec<(Option<String>, LexiconEntry)>,
    aggregate: LexiconEntry,
}

impl WordRecord {
    /// Entry for `pos`, falling back to the aggregate when the word has no entry for that tag.
    pub fn get(&self, pos: Option<&str>) -> &LexiconEntry {
        pos.and_then(|tag| self.tagged(tag)).unwrap_or(&self.aggregate)
    }

    pub fn tagged(&self, pos: &str) -> Option<&LexiconEntry> {
        self.tagged
            .iter()
            .find(|(tag, _)| tag.as_deref() == Some(pos))
            .map(|(_, entry)| entry)
    }

    pub fn has_tag(&self, pos: &str) -> bool {
        self.tagged(pos).is_some()
    }

    pub fn aggregate(&self) -> &LexiconEntry {
        &self.aggregate
    }

    pub fn tags(&self) -> impl Iterator<Item = Option<&str>> {
        self.tagged.iter().map(|(tag, _)| tag.as_deref())
    }

    // Overwrites both the tagged entry and the aggregate.
    fn set(&mut self, pos: Option<&str>, entry: LexiconEntry) {
        match self.tagged.iter_mut().find(|(tag, _)| tag.as_deref() == pos) {
            Some((_, existing)) => *existing = entry,
            None => self.tagged.push((pos.map(str::to_string), entry)),
        }
        self.aggregate = entry;
    }
}

/// One `<word>` row of a lexicon source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconRecord {
    pub form: Option<String>,
    pub pos: Option<String>,
    pub polarity: f64,
    pub subjectivity: f64,
    pub intensity: f64,
    pub label: Option<String>,
    pub sense_id: Option<String>,
    pub confidence: f64,
}

impl Default for LexiconRecord {
    fn default() -> Self {
        Self {
            form: None,
            pos: None,
            polarity: 0.0,
            subjectivity: 0.0,
            intensity: 1.0,
            label: None,
            sense_id: None,
            confidence: 0.0,
        }
    }
}

impl LexiconRecord {
    pub fn word(form: &str, pos: &str, polarity: f64, subjectivity: f64) -> Self {
        Self {
            form: Some(form.to_string()),
            pos: Some(pos.to_string()),
            polarity,
            subjectivity,
            ..Self::default()
        }
    }
}

/// A parsed lexicon document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSource {
    pub language: Option<String>,
    pub records: Vec<LexiconRecord>,
}

impl LexiconSource {
    /// Parses a `<sentiment language=".."><word form=".." .../></sentiment>` document.
    /// `sense_field` names the attribute holding the synset id (e.g. `wordnet_id`).
    pub fn parse_xml(xml: &str, sense_field: Option<&str>) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if !root.has_tag_name("sentiment") {
            return Err(SentimentError::Schema(format!(
                "expected <sentiment> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut records = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("word")) {
            let form = node.attribute("form").map(str::to_string);
            let float = |name: &str, default: f64| -> Result<f64> {
                match node.attribute(name) {
                    None => Ok(default),
                    Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                        SentimentError::Schema(format!(
                            "attribute {}={:?} is not a number (word {:?})",
                            name,
                            raw,
                            form.as_deref().unwrap_or("")
                        ))
                    }),
                }
            };
            records.push(LexiconRecord {
                polarity: float("polarity", 0.0)?,
                subjectivity: float("subjectivity", 0.0)?,
                intensity: float("intensity", 1.0)?,
                confidence: float("confidence", 0.0)?,
                pos: node.attribute("pos").map(str::to_string),
                label: node.attribute("label").map(str::to_string),
                sense_id: sense_field
                    .and_then(|field| node.attribute(field))
                    .map(str::to_string),
                form,
            });
        }

        Ok(Self {
            language: root.attribute("language").map(str::to_string),
            records,
        })
    }

    /// Parses `{"language": "en", "records": [{"form": "good", "pos": "JJ", ...}]}`.
    /// Sense ids are read from each record's `sense_id` field.
    pub fn parse_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SentimentError::Load(format!("JSON parsing failed: {}", e)))
    }
}

/// Part of speech used to qualify bare numeric synset ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynsetPos {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl SynsetPos {
    /// Maps a Penn Treebank tag (`NN`, `VBD`, `JJR`, `RB`, ...) to its synset class.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_uppercase();
        if tag.starts_with("NN") {
            Some(SynsetPos::Noun)
        } else if tag.starts_with("VB") {
            Some(SynsetPos::Verb)
        } else if tag.starts_with("JJ") {
            Some(SynsetPos::Adjective)
        } else if tag.starts_with("RB") {
            Some(SynsetPos::Adverb)
        } else {
            None
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            SynsetPos::Noun => "n-",
            SynsetPos::Verb => "v-",
            SynsetPos::Adjective => "a-",
            SynsetPos::Adverb => "r-",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    polarity: f64,
    subjectivity: f64,
    intensity: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, entry: LexiconEntry) {
        self.polarity += entry.polarity;
        self.subjectivity += entry.subjectivity;
        self.intensity += entry.intensity;
        self.n += 1;
    }

    fn value(&self) -> LexiconEntry {
        if self.n == 0 {
            return LexiconEntry::new(0.0, 0.0, 0.0);
        }
        let n = self.n as f64;
        LexiconEntry::new(self.polarity / n, self.subjectivity / n, self.intensity / n)
    }
}

/// The loaded lexicon. Built in one go by [`Lexicon::from_source`] and only
/// mutated afterwards through [`Lexicon::annotate`].
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, WordRecord>,
    labels: HashMap<String, String>,
    synsets: HashMap<String, (f64, f64)>,
    language: Option<String>,
}

impl Lexicon {
    /// Reads and parses a lexicon file. Files ending in `.json` are read as JSON,
    /// anything else as XML.
    pub fn read(path: &Path, sense_field: Option<&str>, confidence: Option<f64>) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| SentimentError::Load(format!("{}: {}", path.display(), e)))?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            return Self::from_source(LexiconSource::parse_json(&text)?, confidence);
        }
        Self::parse(&text, sense_field, confidence)
    }

    pub fn parse(xml: &str, sense_field: Option<&str>, confidence: Option<f64>) -> Result<Self> {
        Self::from_source(LexiconSource::parse_xml(xml, sense_field)?, confidence)
    }

    pub fn from_source(source: LexiconSource, confidence: Option<f64>) -> Result<Self> {
        let mut lexicon = Self::from_records(source.records, confidence)?;
        lexicon.language = source.language;
        Ok(lexicon)
    }

    /// Builds the tables from `records`. Records below `confidence` are skipped.
    /// Senses are averaged per POS tag, then the per-tag means are averaged into
    /// each word's aggregate entry.
    pub fn from_records<I>(records: I, confidence: Option<f64>) -> Result<Self>
    where
        I: IntoIterator<Item = LexiconRecord>,
    {
        let mut senses: HashMap<String, Vec<(Option<String>, Mean)>> = HashMap::new();
        let mut synsets: HashMap<String, Mean> = HashMap::new();
        let mut labels: HashMap<String, String> = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            if let Some(min) = confidence {
                if record.confidence < min {
                    skipped += 1;
                    continue;
                }
            }
            if record.intensity.is_nan() || record.intensity <= 0.0 {
                return Err(SentimentError::Schema(format!(
                    "intensity must be positive, got {} (word {:?})",
                    record.intensity,
                    record.form.as_deref().unwrap_or("")
                )));
            }
            let entry = LexiconEntry::new(record.polarity, record.subjectivity, record.intensity);

            if let Some(form) = &record.form {
                let form = form.trim().to_lowercase();
                if form.is_empty() {
                    return Err(SentimentError::Schema("word with empty form".to_string()));
                }
                let buckets = senses.entry(form.clone()).or_default();
                match buckets.iter_mut().find(|(tag, _)| *tag == record.pos) {
                    Some((_, mean)) => mean.push(entry),
                    None => {
                        let mut mean = Mean::default();
                        mean.push(entry);
                        buckets.push((record.pos.clone(), mean));
                    }
                }
                if let Some(label) = record.label {
                    labels.insert(form, label);
                }
            }
            if let Some(id) = record.sense_id {
                synsets.entry(id).or_default().push(entry);
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "skipped lexicon records below confidence threshold");
        }

        let words = senses
            .into_iter()
            .map(|(form, buckets)| {
                let mut across = Mean::default();
                let tagged: Vec<(Option<String>, LexiconEntry)> = buckets
                    .into_iter()
                    .map(|(tag, mean)| {
                        let entry = mean.value();
                        across.push(entry);
                        (tag, entry)
                    })
                    .collect();
                let record = WordRecord {
                    tagged,
                    aggregate: across.value(),
                };
                (form, record)
            })
            .collect();

        let synsets = synsets
            .into_iter()
            .map(|(id, mean)| {
                let v = mean.value();
                (id, (v.polarity, v.subjectivity))
            })
            .collect();

        Ok(Self {
            words,
            labels,
            synsets,
            language: None,
        })
    }

    /// Sets the entry for `(word, pos)` and the word's aggregate to the same scores.
    pub fn annotate(
        &mut self,
        word: &str,
        pos: Option<&str>,
        polarity: f64,
        subjectivity: f64,
        intensity: f64,
        label: Option<&str>,
    ) {
        let word = word.to_lowercase();
        let entry = LexiconEntry::new(polarity, subjectivity, intensity);
        match self.words.get_mut(&word) {
            Some(record) => record.set(pos, entry),
            None => {
                self.words.insert(
                    word.clone(),
                    WordRecord {
                        tagged: vec![(pos.map(str::to_string), entry)],
                        aggregate: entry,
                    },
                );
            }
        }
        if let Some(label) = label {
            self.labels.insert(word, label.to_string());
        }
    }

    /// Annotates an adverb for every word with an `adjective_tag` entry, copying the
    /// adjective's scores: "happy" gives "happily", "gentle" gives "gently",
    /// "bad" gives "badly". Returns the number of adverbs written.
    pub fn derive_adverbs(&mut self, adjective_tag: &str, adverb_tag: &str) -> usize {
        let mut adjectives: Vec<(String, LexiconEntry)> = self
            .words
            .iter()
            .filter_map(|(w, record)| record.tagged(adjective_tag).map(|e| (w.clone(), *e)))
            .collect();
        adjectives.sort_by(|a, b| a.0.cmp(&b.0));

        for (adjective, entry) in &adjectives {
            self.annotate(
                &adverb_form(adjective),
                Some(adverb_tag),
                entry.polarity,
                entry.subjectivity,
                entry.intensity,
                None,
            );
        }
        tracing::debug!(count = adjectives.len(), "derived adverbs from adjectives");
        adjectives.len()
    }

    pub fn word(&self, word: &str) -> Option<&WordRecord> {
        self.words.get(word)
    }

    pub fn entry(&self, word: &str, pos: Option<&str>) -> Option<&LexiconEntry> {
        self.words.get(word).map(|record| record.get(pos))
    }

    pub fn label(&self, word: &str) -> Option<&str> {
        self.labels.get(word).map(String::as_str)
    }

    /// Averaged `(polarity, subjectivity)` for a synset id. Bare numeric ids are
    /// qualified with the POS prefix, first zero-padded to 8 digits, then unpadded.
    pub fn synset(&self, id: &str, pos: Option<SynsetPos>) -> Option<(f64, f64)> {
        if let Some(scores) = self.synsets.get(id) {
            return Some(*scores);
        }
        let pos = pos?;
        if !id.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let padded = format!("{}{:0>8}", pos.prefix(), id);
        self.synsets.get(&padded).copied().or_else(|| {
            let unpadded = format!("{}{}", pos.prefix(), id.trim_start_matches('0'));
            self.synsets.get(&unpadded).copied()
        })
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn synset_count(&self) -> usize {
        self.synsets.len()
    }
}

fn adverb_form(adjective: &str) -> String {
    if let Some(stem) = adjective.strip_suffix('y') {
        format!("{}ily", stem)
    } else if let Some(stem) = adjective.strip_suffix("le") {
        format!("{}ly", stem)
    } else {
        format!("{}ly", adjective)
    }
}
