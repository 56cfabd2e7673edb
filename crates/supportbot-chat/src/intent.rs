//! Rule-based detection of greetings, goodbyes and self-introductions.

use regex::Regex;
use std::sync::LazyLock;

use crate::text::{contains_any_term, is_stop_word};

/// Words that mark a greeting.
pub const GREETING_TERMS: &[&str] = &["hello", "hi", "hey", "greetings"];

/// Words and phrases that mark the end of a conversation.
pub const GOODBYE_TERMS: &[&str] = &["bye", "goodbye", "see you", "thank you", "thanks"];

static MY_NAME_IS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmy name is ([a-z]+)").unwrap());

static CALL_ME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcall me\s+([a-z]+)").unwrap());

static I_AM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bi am ([a-z]+)").unwrap());

/// Whether the input contains a greeting word.
pub fn is_greeting(input: &str) -> bool {
    contains_any_term(input, GREETING_TERMS)
}

/// Whether the input contains a goodbye word or phrase.
pub fn is_goodbye(input: &str) -> bool {
    contains_any_term(input, GOODBYE_TERMS)
}

/// Extract the user's name from a self-introduction.
///
/// Recognised forms, checked in order:
/// - "my name is X"
/// - "call me X"
/// - "I am X", unless X is a stop word or reads like a state
///   ("I am looking", "I am interested")
///
/// The returned name is capitalized.
pub fn extract_name(input: &str) -> Option<String> {
    let lower = input.to_lowercase();

    if let Some(caps) = MY_NAME_IS_RE.captures(&lower) {
        return caps.get(1).map(|m| capitalize(m.as_str()));
    }

    if let Some(caps) = CALL_ME_RE.captures(&lower) {
        return caps.get(1).map(|m| capitalize(m.as_str()));
    }

    if let Some(caps) = I_AM_RE.captures(&lower) {
        let candidate = caps.get(1)?.as_str();
        if !is_stop_word(candidate) && !looks_like_state(candidate) {
            return Some(capitalize(candidate));
        }
    }

    None
}

// "I am looking for...", "I am interested in..." are not introductions.
fn looks_like_state(word: &str) -> bool {
    word.ends_with("ing") || word.ends_with("ed") || NOT_NAMES.contains(&word)
}

static NOT_NAMES: &[&str] = &[
    "sorry", "sure", "not", "just", "also", "still", "having", "trying", "unable",
    "new", "happy", "unhappy", "ready", "here", "back", "fine", "good", "okay", "ok",
];

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
