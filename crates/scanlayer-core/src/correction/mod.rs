//! Spelling correction of recognized text.
//!
//! A [`Corrector`] may decline to suggest anything. [`TextCorrector`] turns
//! that into "keep the recognized text", so a missing suggestion can never
//! reach the page as an empty string.

mod dictionary;

pub use dictionary::FrequencyDictionary;

use tracing::debug;

use crate::error::RegionError;

/// Dictionary-backed word correction capability.
pub trait Corrector {
    /// Suggest a replacement for `word`, or `None` when nothing is known.
    fn correct(&self, word: &str) -> Option<String>;
}

impl<C: Corrector + ?Sized> Corrector for &C {
    fn correct(&self, word: &str) -> Option<String> {
        (**self).correct(word)
    }
}

impl<C: Corrector + ?Sized> Corrector for Box<C> {
    fn correct(&self, word: &str) -> Option<String> {
        (**self).correct(word)
    }
}

/// Corrector that never suggests anything; used when correction is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl Corrector for NoCorrection {
    fn correct(&self, _word: &str) -> Option<String> {
        None
    }
}

/// Outcome of correcting one region's text.
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// The corrector's suggestion equals the input.
    Unchanged(String),
    /// The corrector replaced the input.
    Corrected { original: String, corrected: String },
    /// No suggestion; the original text is kept.
    Unavailable(String),
}

impl Correction {
    /// Text to write into the document.
    pub fn text(&self) -> &str {
        match self {
            Correction::Unchanged(text) | Correction::Unavailable(text) => text,
            Correction::Corrected { corrected, .. } => corrected,
        }
    }

    /// Consume into the text to write.
    pub fn into_text(self) -> String {
        match self {
            Correction::Unchanged(text) | Correction::Unavailable(text) => text,
            Correction::Corrected { corrected, .. } => corrected,
        }
    }

    /// The non-fatal issue to report, if any.
    pub fn issue(&self) -> Option<RegionError> {
        match self {
            Correction::Unavailable(text) => Some(RegionError::CorrectionUnavailable {
                text: text.clone(),
            }),
            _ => None,
        }
    }
}

/// Applies a corrector to the whole text of a region.
///
/// The text is not tokenized: the OCR engine already segments into
/// word-like boxes, so each region is corrected as one unit.
pub struct TextCorrector<C> {
    corrector: C,
}

impl<C: Corrector> TextCorrector<C> {
    /// Wrap a correction capability.
    pub fn new(corrector: C) -> Self {
        Self { corrector }
    }

    /// Correct one region's text, falling back to the original.
    pub fn apply(&self, text: &str) -> Correction {
        if text.trim().is_empty() {
            return Correction::Unchanged(text.to_string());
        }

        match self.corrector.correct(text) {
            Some(suggestion) if suggestion.is_empty() => {
                debug!("Corrector returned an empty suggestion for {:?}", text);
                Correction::Unavailable(text.to_string())
            }
            Some(suggestion) if suggestion == text => Correction::Unchanged(suggestion),
            Some(suggestion) => Correction::Corrected {
                original: text.to_string(),
                corrected: suggestion,
            },
            None => Correction::Unavailable(text.to_string()),
        }
    }

    /// Shortcut for the text to write.
    pub fn correct(&self, text: &str) -> String {
        self.apply(text).into_text()
    }
}
