// Tokenizer: splits raw text into words, keeping punctuation, emoticons and the
// irony mark "(!)" as tokens of their own.
use once_cell::sync::Lazy;
use regex::Regex;

use super::emoticons::is_emoticon;

pub const IRONY_MARK: &str = "(!)";

static CONTRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-z0-9]+?)(n't|'s|'re|'ve|'ll|'d|'m)$").unwrap());

// "e.g.", "U.S.", "a.m."
static ABBREVIATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[A-Za-z]\.){2,}$").unwrap());

const LEADING: &[char] = &['(', '[', '{', '"', '\'', '`', '\u{201c}', '\u{2018}'];
const TRAILING: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '"', '\'', '\u{201d}', '\u{2019}',
];

/// Splits `text` into tokens.
pub fn find_tokens(text: &str) -> Vec<String> {
    let text = text.replace('\u{2019}', "'");
    let mut tokens = Vec::new();

    for chunk in text.split_whitespace() {
        if chunk == IRONY_MARK || is_emoticon(chunk) {
            tokens.push(chunk.to_string());
            continue;
        }

        let mut word = chunk;
        while let Some(c) = word.chars().next() {
            if !LEADING.contains(&c) || (word.len() == c.len_utf8() && TRAILING.contains(&c)) {
                break;
            }
            tokens.push(c.to_string());
            word = &word[c.len_utf8()..];
        }

        let mut tail: Vec<String> = Vec::new();
        loop {
            if is_emoticon(word) {
                break;
            } else if word.len() > IRONY_MARK.len() && word.ends_with(IRONY_MARK) {
                tail.push(IRONY_MARK.to_string());
                word = &word[..word.len() - IRONY_MARK.len()];
            } else if word.len() > 3 && word.ends_with("...") {
                tail.push("...".to_string());
                word = &word[..word.len() - 3];
            } else if ABBREVIATION.is_match(word) {
                break;
            } else {
                match word.chars().last() {
                    Some(c) if TRAILING.contains(&c) => {
                        tail.push(c.to_string());
                        word = &word[..word.len() - c.len_utf8()];
                    }
                    _ => break,
                }
            }
        }

        if !word.is_empty() {
            match CONTRACTION.captures(word) {
                Some(caps) => {
                    tokens.push(caps[1].to_string());
                    tokens.push(caps[2].to_string());
                }
                None => tokens.push(word.to_string()),
            }
        }
        tokens.extend(tail.into_iter().rev());
    }

    tokens
}
