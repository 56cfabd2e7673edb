//! Text preprocessing for matching.
//!
//! Lowercases, tokenizes, removes English stop words and reduces plural
//! nouns to their singular form so that "What are your hours?" and the FAQ
//! keyword "hours" share the token `hour`.

use std::collections::HashSet;
use std::sync::LazyLock;

// =============================================================================
// Stop words
// =============================================================================

// Standard English stop-word list, alphanumeric entries only.
static STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her",
    "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
    "themselves", "what", "which", "who", "whom", "this", "that", "these", "those",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
    "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where",
    "why", "how", "all", "any", "both", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "s", "t", "can", "will", "just", "don", "should", "now", "d", "ll",
    "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn", "doesn", "hadn",
    "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan", "shouldn",
    "wasn", "weren", "won", "wouldn",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Whether `word` (already lowercased) is an English stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

// =============================================================================
// Lemmatization
// =============================================================================

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
];

// Words that end in "s" but are not plurals.
static INVARIANT: &[&str] = &[
    "always", "news", "series", "species", "perhaps", "thanks", "its", "yes",
    "plus", "bonus", "canvas", "gas", "atlas", "whereas", "express",
];

/// Reduce a lowercase noun to its singular form.
///
/// Handles regular plural suffixes and a short table of irregular forms.
/// Words that are not recognisably plural are returned unchanged.
pub fn lemmatize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(p, _)| *p == word) {
        return singular.to_string();
    }
    if word.len() <= 3 || INVARIANT.contains(&word) {
        return word.to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "ches", "shes", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    word.to_string()
}

// =============================================================================
// Tokenization
// =============================================================================

/// Split lowercased text into alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Full preprocessing: tokenize, drop stop words, lemmatize.
///
/// Order is preserved and duplicates are kept.
pub fn preprocess(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .map(|t| lemmatize(&t))
        .collect()
}

/// Basic preprocessing: lowercase, strip ASCII punctuation, split on
/// whitespace. No stop-word removal or lemmatization.
pub fn basic_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalize text for term lookup: lowercase alphanumeric words separated by
/// single spaces, padded with a leading and trailing space.
fn padded_words(text: &str) -> String {
    format!(" {} ", tokenize(text).join(" "))
}

/// Whether `term` (a word or multi-word phrase) occurs in `text` on word
/// boundaries. "hi" matches "Hi there" but not "shipping".
pub fn contains_term(text: &str, term: &str) -> bool {
    let needle = padded_words(term);
    if needle.trim().is_empty() {
        return false;
    }
    padded_words(text).contains(&needle)
}

/// Whether any of `terms` occurs in `text` on word boundaries.
pub fn contains_any_term(text: &str, terms: &[&str]) -> bool {
    let haystack = padded_words(text);
    terms.iter().any(|term| {
        let needle = padded_words(term);
        !needle.trim().is_empty() && haystack.contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Stop words ----

    #[test]
    fn test_common_stop_words() {
        for w in ["the", "what", "are", "your", "i", "s", "t"] {
            assert!(is_stop_word(w), "{} should be a stop word", w);
        }
        assert!(!is_stop_word("shipping"));
        assert!(!is_stop_word("refund"));
    }

    // ---- Lemmatization ----

    #[test]
    fn test_lemmatize_regular_plurals() {
        assert_eq!(lemmatize("hours"), "hour");
        assert_eq!(lemmatize("orders"), "order");
        assert_eq!(lemmatize("policies"), "policy");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("addresses"), "address");
        assert_eq!(lemmatize("watches"), "watch");
    }

    #[test]
    fn test_lemmatize_irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("people"), "person");
    }

    #[test]
    fn test_lemmatize_leaves_non_plurals() {
        assert_eq!(lemmatize("business"), "business");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("shipping"), "shipping");
        assert_eq!(lemmatize("always"), "always");
        assert_eq!(lemmatize("bus"), "bus");
    }

    // ---- Tokenization ----

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("What's your return-policy?"),
            vec!["what", "s", "your", "return", "policy"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ?! ").is_empty());
    }

    #[test]
    fn test_preprocess_removes_stop_words_and_lemmatizes() {
        assert_eq!(preprocess("What are your store hours?"), vec!["store", "hour"]);
    }

    #[test]
    fn test_preprocess_keeps_duplicates() {
        assert_eq!(
            preprocess("shipping shipping costs"),
            vec!["shipping", "shipping", "cost"]
        );
    }

    #[test]
    fn test_basic_tokens_strips_punctuation_only() {
        assert_eq!(
            basic_tokens("What's the return policy?"),
            vec!["whats", "the", "return", "policy"]
        );
    }

    // ---- Term lookup ----

    #[test]
    fn test_contains_term_word_boundaries() {
        assert!(contains_term("Hi there!", "hi"));
        assert!(!contains_term("What is your shipping policy?", "hi"));
        assert!(!contains_term("this", "hi"));
    }

    #[test]
    fn test_contains_term_phrase() {
        assert!(contains_term("Thank you so much", "thank you"));
        assert!(contains_term("ok, see   you later", "see you"));
        assert!(!contains_term("thank everyone", "thank you"));
    }

    #[test]
    fn test_contains_any_term() {
        let greetings = ["hello", "hi", "hey", "greetings"];
        assert!(contains_any_term("HEY, anyone there?", &greetings));
        assert!(!contains_any_term("they said hello-ish", &["hey"]));
        assert!(!contains_any_term("", &greetings));
    }

    #[test]
    fn test_contains_term_blank_needle() {
        assert!(!contains_term("anything", ""));
        assert!(!contains_term("anything", "?!"));
    }
}
