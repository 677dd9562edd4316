//! Case-insensitive, word-boundary phrase matching.
//!
//! Both the heuristic classifier and the SQL template matcher decide on
//! whole words only: "price" matches "copper price today" but not
//! "priceless", and "tap temperature" matches only when the two words are
//! adjacent.

/// A query split into lower-cased word tokens.
///
/// A word is a maximal run of alphanumeric characters; everything else is a
/// separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Words {
    tokens: Vec<String>,
}

impl Words {
    pub fn new(text: &str) -> Self {
        Self {
            tokens: tokenize(text),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Position of the first occurrence of `phrase` as a run of whole words.
    pub fn find_phrase(&self, phrase: &str) -> Option<usize> {
        let needle = tokenize(phrase);
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return None;
        }
        self.tokens
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
    }

    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.find_phrase(phrase).is_some()
    }

    /// The first phrase of `phrases` (in list order) present in the text.
    pub fn first_of<'a>(&self, phrases: &[&'a str]) -> Option<&'a str> {
        phrases.iter().copied().find(|p| self.contains_phrase(p))
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        self.first_of(phrases).is_some()
    }

    /// True when the whole text is exactly `phrase`, word for word.
    pub fn is_exactly(&self, phrase: &str) -> bool {
        self.tokens == tokenize(phrase)
    }
}

/// Lower-cased word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
