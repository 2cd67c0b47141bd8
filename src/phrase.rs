// src/phrase.rs
//! Word-aligned phrase matching.
//!
//! Both sides are lower-cased. ASCII punctuation in the searched text is
//! replaced by spaces, then both sides are split on whitespace and the phrase
//! must appear as a contiguous run of whole words. Matching is word-granular:
//! `"cat dog"` does not match `"concatdog"` or `"cats dogs"`.
//!
//! An empty phrase is contained in every text (always true).

/// Lower-case `text`, blank out ASCII punctuation and split into words.
pub(crate) fn words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// True if `needle` is a contiguous sub-slice of `hay`.
fn contains_window(hay: &[String], needle: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    hay.windows(needle.len()).any(|w| w == needle)
}

/// One-shot form of [`Phrase::is_in`].
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    Phrase::new(phrase).is_in(haystack)
}

/// A phrase prepared once and tested against many texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    words: Vec<String>,
}

impl Phrase {
    /// The phrase is expected to be free of punctuation; it is only
    /// lower-cased and split on whitespace.
    pub fn new(phrase: &str) -> Self {
        let text = phrase.to_lowercase();
        let words = text.split_whitespace().map(str::to_string).collect();
        Self { text, words }
    }

    /// Lower-cased phrase as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_in(&self, haystack: &str) -> bool {
        if self.words.is_empty() {
            return true;
        }
        self.is_in_words(&words(haystack))
    }

    /// [`Phrase::is_in`] over text already split by [`words`].
    pub(crate) fn is_in_words(&self, haystack: &[String]) -> bool {
        contains_window(haystack, &self.words)
    }
}
