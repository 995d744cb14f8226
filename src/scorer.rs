use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Express sentiment as a value between `-1.0` & `+1.0`.
/// Negative values indicate a negative sentiment, `0.0` is neutral.
pub type Polarity = f64;

/// Largest absolute weight a single AFINN word carries
const MAX_WORD_WEIGHT: f64 = 5.0;

/// Words flipping the polarity of the next weighted word.
/// Apostrophes are stripped before lookup.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "nor", "cannot", "dont", "doesnt", "didnt", "isnt", "arent", "wasnt",
    "werent", "cant", "couldnt", "wont", "wouldnt", "shouldnt", "hasnt", "havent", "hadnt",
    "aint",
];

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("sentiment library panicked: {0}")]
    Panicked(String),
    #[error("sentiment library produced a non-finite score")]
    NonFinite,
}

/// Anything able to turn a piece of text into a polarity score.
///
/// Implementations are shared read-only across all server workers.
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Polarity, ScoreError>;
}

/// Lexicon based scorer backed by the AFINN word list.
///
/// The polarity is the mean weight of the words found in the lexicon,
/// scaled down to `[-1, 1]`. A negator ("not", "never", "don't", ...) flips
/// the sign of the next weighted word. Text without any known word is neutral.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<Polarity, ScoreError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }

        let words = tokenize(text);
        let (total, matched) = panic::catch_unwind(AssertUnwindSafe(|| weigh(&words)))
            .map_err(|payload| ScoreError::Panicked(panic_message(payload.as_ref())))?;
        if matched == 0 {
            return Ok(0.0);
        }

        let polarity = total / (MAX_WORD_WEIGHT * matched as f64);
        if !polarity.is_finite() {
            return Err(ScoreError::NonFinite);
        }
        Ok(polarity.max(-1.0).min(1.0))
    }
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Lowercased words, split on anything but letters, digits and apostrophes
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || is_apostrophe(c)))
        .map(|word| {
            word.chars()
                .filter(|c| !is_apostrophe(*c))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Sum of the lexicon weights and number of weighted words
fn weigh(words: &[String]) -> (f64, usize) {
    let mut total = 0.0;
    let mut matched = 0;
    let mut negated = false;
    for word in words {
        if NEGATORS.contains(&word.as_str()) {
            negated = true;
            continue;
        }
        let weight = f64::from(::sentiment::analyze(word.clone()).score);
        if weight == 0.0 {
            continue;
        }
        total += if negated { -weight } else { weight };
        matched += 1;
        negated = false;
    }
    (total, matched)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic"))
}
