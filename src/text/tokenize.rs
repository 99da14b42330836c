// Normalization, tokenization, stop-word filtering, and n-gram generation.
//
// These are the per-document steps shared by training and inference. Both
// sides must run exactly the same code, otherwise the frozen vocabulary and
// the inference-time features drift apart.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

/// Joins the two tokens of a bigram feature.
pub const BIGRAM_SEPARATOR: &str = " ";

/// Tokens shorter than this (in chars) carry no signal and are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Lowercase and strip surrounding whitespace.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split normalized text on non-alphanumeric boundaries.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// The set of common words removed before n-gram generation.
///
/// Serialized as a sorted word list so a stored model always filters with
/// the list it was trained with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StopWords(HashSet<String>);

impl StopWords {
    /// English stop words from the `stop-words` crate.
    pub fn english() -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        Self::from_words(words)
    }

    /// An empty list — every token survives.
    pub fn none() -> Self {
        Self(HashSet::new())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| normalize(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

impl From<Vec<String>> for StopWords {
    fn from(words: Vec<String>) -> Self {
        Self::from_words(words)
    }
}

impl From<StopWords> for Vec<String> {
    fn from(stop_words: StopWords) -> Self {
        let mut words: Vec<String> = stop_words.0.into_iter().collect();
        words.sort();
        words
    }
}

/// Extract unigram and bigram features from one raw document.
///
/// Unigrams come first in token order, followed by bigrams of consecutive
/// surviving tokens. Duplicates are kept; callers count them.
pub fn features(text: &str, stop_words: &StopWords) -> Vec<String> {
    let normalized = normalize(text);
    let tokens: Vec<&str> = tokenize(&normalized)
        .into_iter()
        .filter(|token| !stop_words.contains(token))
        .collect();

    let mut out = Vec::with_capacity(tokens.len() * 2);
    out.extend(tokens.iter().map(|t| t.to_string()));
    out.extend(
        tokens
            .windows(2)
            .map(|pair| format!("{}{BIGRAM_SEPARATOR}{}", pair[0], pair[1])),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize("  Coffee At STARBUCKS \n"), "coffee at starbucks");
    }

    #[test]
    fn tokenize_splits_on_punctuation_and_drops_single_chars() {
        let normalized = normalize("Uber-ride, 2 km (late night)!");
        assert_eq!(tokenize(&normalized), vec!["uber", "ride", "km", "late", "night"]);
    }

    #[test]
    fn tokenize_keeps_non_ascii_letters() {
        assert_eq!(tokenize("café crème"), vec!["café", "crème"]);
    }

    #[test]
    fn features_include_bigrams_over_surviving_tokens() {
        let stop = StopWords::from_words(["at"]);
        let feats = features("coffee at starbucks", &stop);
        assert_eq!(feats, vec!["coffee", "starbucks", "coffee starbucks"]);
    }

    #[test]
    fn features_of_stop_words_only_is_empty() {
        let stop = StopWords::from_words(["the", "and"]);
        assert!(features("The and THE", &stop).is_empty());
    }

    #[test]
    fn english_list_filters_common_words() {
        let stop = StopWords::english();
        assert!(stop.contains("the"));
        assert!(stop.contains("and"));
        assert!(!stop.contains("coffee"));
    }

    #[test]
    fn stop_words_serialize_sorted() {
        let stop = StopWords::from_words(["zeta", "alpha", "Mid"]);
        let words: Vec<String> = stop.into();
        assert_eq!(words, vec!["alpha", "mid", "zeta"]);
    }
}
