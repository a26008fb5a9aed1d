// Assessment engine: groups a token stream into scored chunks anchored on known
// sentiment words, applying modifier, negation, exclamation, irony and emoticon rules.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::emoticons;
use super::lexicon::{Lexicon, WordRecord};
use super::tokenizer::IRONY_MARK;

/// Label of chunks produced by emoticons.
pub const MOOD: &str = "mood";
/// Label of chunks produced by the irony mark "(!)".
pub const IRONY: &str = "irony";

const EXCLAMATION_BOOST: f64 = 1.25;
const NEGATION_FACTOR: f64 = -0.5;

/// A scored run of words: a known word, optionally preceded by a modifier
/// ("very good") and/or a negation ("not good").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub words: Vec<String>,
    pub polarity: f64,
    pub subjectivity: f64,
    pub label: Option<String>,
}

/// Which words negate and which words modify the next one.
pub struct Rules {
    negations: HashSet<String>,
    modifier_tags: HashSet<String>,
    modifier: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Rules {
    pub fn new<N, M>(negations: N, modifier_tags: M) -> Self
    where
        N: IntoIterator<Item = String>,
        M: IntoIterator<Item = String>,
    {
        Self {
            negations: negations.into_iter().collect(),
            modifier_tags: modifier_tags.into_iter().collect(),
            modifier: Box::new(|w: &str| w.ends_with("ly")),
        }
    }

    /// Replaces the word-shape test used to recognise modifiers without a POS tag.
    pub fn with_modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.modifier = Box::new(modifier);
        self
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    pub fn is_modifier_tag(&self, pos: &str) -> bool {
        self.modifier_tags.contains(pos)
    }

    pub fn looks_like_modifier(&self, word: &str) -> bool {
        (self.modifier)(word)
    }

    fn modifies(&self, pos: Option<&str>, record: &WordRecord) -> bool {
        pos.map_or(false, |p| self.is_modifier_tag(p))
            || self.modifier_tags.iter().any(|tag| record.has_tag(tag))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(
            ["no", "not", "n't", "never"].iter().map(|w| w.to_string()),
            std::iter::once("RB".to_string()),
        )
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("negations", &self.negations)
            .field("modifier_tags", &self.modifier_tags)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Chunk {
    words: Vec<String>,
    polarity: f64,
    subjectivity: f64,
    intensity: f64,
    negated: bool,
    label: Option<String>,
}

impl Chunk {
    fn new(word: &str, polarity: f64, subjectivity: f64, intensity: f64, label: Option<String>) -> Self {
        Self {
            words: vec![word.to_string()],
            polarity,
            subjectivity,
            intensity,
            negated: false,
            label,
        }
    }

    // "not good" is slightly bad, "not bad" is slightly good.
    fn into_assessment(self) -> Assessment {
        let polarity = if self.negated {
            self.polarity * NEGATION_FACTOR
        } else {
            self.polarity
        };
        Assessment {
            words: self.words,
            polarity,
            subjectivity: self.subjectivity,
            label: self.label,
        }
    }
}

fn clamp(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Carried state of one left-to-right pass.
#[derive(Debug, Default)]
struct Pass {
    chunks: Vec<Chunk>,
    modifier: Option<(String, Option<String>)>,
    negation: Option<String>,
}

impl Pass {
    fn update_last<F: FnOnce(Chunk) -> Chunk>(&mut self, update: F) {
        if let Some(last) = self.chunks.pop() {
            self.chunks.push(update(last));
        }
    }

    fn known(
        &mut self,
        word: &str,
        pos: Option<&str>,
        record: &WordRecord,
        lexicon: &Lexicon,
        rules: &Rules,
        negation: bool,
    ) {
        let entry = *record.get(pos);
        let label = lexicon.label(word).map(str::to_string);

        if self.modifier.is_none() || self.chunks.is_empty() {
            self.chunks.push(Chunk::new(
                word,
                entry.polarity,
                entry.subjectivity,
                entry.intensity,
                label,
            ));
        } else {
            // "really good": the modifier's intensity scales this word's scores.
            self.update_last(|prev| {
                let mut words = prev.words;
                words.push(word.to_string());
                Chunk {
                    words,
                    polarity: clamp(entry.polarity * prev.intensity),
                    subjectivity: clamp(entry.subjectivity * prev.intensity),
                    intensity: entry.intensity,
                    label,
                    ..prev
                }
            });
        }

        if let Some(negator) = self.negation.take() {
            self.update_last(|prev| {
                let mut words = Vec::with_capacity(prev.words.len() + 1);
                words.push(negator);
                words.extend(prev.words);
                Chunk {
                    words,
                    intensity: 1.0 / prev.intensity,
                    negated: true,
                    ..prev
                }
            });
        }

        self.modifier = None;
        if rules.modifies(pos, record) {
            self.modifier = Some((word.to_string(), pos.map(str::to_string)));
        }
        if negation && rules.is_negation(word) {
            self.negation = Some(word.to_string());
        }
    }

    fn unknown(&mut self, word: &str, pos: Option<&str>, rules: &Rules, negation: bool) {
        if negation && rules.is_negation(word) {
            self.negation = Some(word.to_string());
        } else if self.negation.is_some() && word.trim_matches('\'').chars().count() > 1 {
            // "not a good" keeps the negation across single-letter words.
            self.negation = None;
        }

        let after_modifier = match &self.modifier {
            Some((modifier, _)) => {
                pos.map_or(false, |p| rules.is_modifier_tag(p)) || rules.looks_like_modifier(modifier)
            }
            None => false,
        };
        if self.negation.is_some() && after_modifier {
            // "really not good": the negator now belongs to the previous chunk, so it
            // is consumed here and the next known word does not prepend it again.
            if let Some(negator) = self.negation.take() {
                self.update_last(|prev| {
                    let mut words = prev.words;
                    words.push(negator);
                    Chunk {
                        words,
                        negated: true,
                        ..prev
                    }
                });
            }
        } else if self.modifier.is_some() && word.chars().count() > 2 {
            // "really is good" keeps the modifier across short words.
            self.modifier = None;
        }

        if word == "!" {
            self.update_last(|prev| {
                let mut words = prev.words;
                words.push("!".to_string());
                Chunk {
                    words,
                    polarity: clamp(prev.polarity * EXCLAMATION_BOOST),
                    ..prev
                }
            });
        }

        if word == IRONY_MARK {
            self.chunks
                .push(Chunk::new(word, 0.0, 1.0, 1.0, Some(IRONY.to_string())));
        }

        for polarity in emoticons::polarities(word) {
            self.chunks
                .push(Chunk::new(word, polarity, 1.0, 1.0, Some(MOOD.to_string())));
        }
    }
}

/// Scores `tokens` (word, optional POS tag) against `lexicon`.
///
/// Only words known to the lexicon, emoticons and the irony mark produce chunks;
/// unknown words would otherwise drag the average towards neutral.
pub fn assess(
    lexicon: &Lexicon,
    rules: &Rules,
    tokens: &[(String, Option<String>)],
    negation: bool,
) -> Vec<Assessment> {
    let mut pass = Pass::default();

    for (word, pos) in tokens {
        if word.is_empty() {
            continue;
        }
        let pos = pos.as_deref();
        match lexicon.word(word) {
            Some(record) => pass.known(word, pos, record, lexicon, rules, negation),
            None => pass.unknown(word, pos, rules, negation),
        }
    }

    pass.chunks.into_iter().map(Chunk::into_assessment).collect()
}
