//! Word-frequency spell checker.

use std::collections::HashMap;
use std::path::Path;

use strsim::damerau_levenshtein;
use tracing::{debug, trace};

use super::Corrector;
use crate::error::ScanlayerError;

/// Built-in English word list, `word count` per line.
static ENGLISH_FREQUENCIES: &str = include_str!("../../data/en_frequency.txt");

/// Spell checker over a word-frequency list.
///
/// Known words are returned as-is. Unknown words are replaced by the
/// dictionary word with the smallest Damerau-Levenshtein distance, ties
/// broken by frequency. Matching is case-insensitive and the input's
/// casing is reapplied to the suggestion.
#[derive(Debug, Clone)]
pub struct FrequencyDictionary {
    words: HashMap<String, u64>,
    max_distance: usize,
}

impl FrequencyDictionary {
    /// Build from `word [count]` lines. Blank lines and `#` comments are
    /// skipped; a missing count means 1.
    pub fn parse(content: &str) -> Result<Self, ScanlayerError> {
        let mut words = HashMap::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let count = match parts.next() {
                Some(raw) => raw.parse::<u64>().map_err(|_| {
                    ScanlayerError::Config(format!(
                        "dictionary line {}: invalid count {:?}",
                        line_no + 1,
                        raw
                    ))
                })?,
                None => 1,
            };

            *words.entry(word.to_lowercase()).or_insert(0) += count;
        }

        Ok(Self {
            words,
            max_distance: 2,
        })
    }

    /// The embedded English list.
    pub fn english() -> Result<Self, ScanlayerError> {
        let dictionary = Self::parse(ENGLISH_FREQUENCIES)?;
        debug!("Loaded {} built-in dictionary words", dictionary.len());
        Ok(dictionary)
    }

    /// Load a word list from a file.
    pub fn from_file(path: &Path) -> Result<Self, ScanlayerError> {
        let content = std::fs::read_to_string(path)?;
        let dictionary = Self::parse(&content)?;
        debug!(
            "Loaded {} dictionary words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Set the largest edit distance a suggestion may have.
    pub fn with_max_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` is in the dictionary (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    fn closest(&self, word: &str) -> Option<&str> {
        let length = word.chars().count();

        self.words
            .iter()
            .filter(|(candidate, _)| {
                candidate.chars().count().abs_diff(length) <= self.max_distance
            })
            .filter_map(|(candidate, &count)| {
                let distance = damerau_levenshtein(word, candidate);
                (distance <= self.max_distance).then_some((distance, count, candidate))
            })
            .min_by(|a, b| {
                a.0.cmp(&b.0)
                    .then_with(|| b.1.cmp(&a.1))
                    .then_with(|| a.2.cmp(b.2))
            })
            .map(|(_, _, candidate)| candidate.as_str())
    }
}

impl Corrector for FrequencyDictionary {
    fn correct(&self, word: &str) -> Option<String> {
        if is_numeric(word) || is_lone_punctuation(word) {
            return Some(word.to_string());
        }

        let lower = word.to_lowercase();
        if self.words.contains_key(&lower) {
            return Some(word.to_string());
        }

        let suggestion = self.closest(&lower)?;
        trace!("Spelling: {:?} -> {:?}", word, suggestion);
        Some(match_case(word, suggestion))
    }
}

fn is_numeric(word: &str) -> bool {
    let digits = word.chars().filter(char::is_ascii_digit).count();
    digits > 0
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | '%' | '/'))
}

fn is_lone_punctuation(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_punctuation())
}

/// Reapply the casing pattern of `original` to `suggestion`.
fn match_case(original: &str, suggestion: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();

    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return suggestion.to_uppercase();
    }

    if letters.first().is_some_and(|c| c.is_uppercase()) {
        let mut chars = suggestion.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    suggestion.to_string()
}
