//! FAQ matching.
//!
//! Scores user input against every FAQ entry and selects the best entry
//! above a threshold. Three strategies are available: plain keyword
//! containment, token-set overlap, and Dice similarity over preprocessed
//! token multisets.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::knowledge::KnowledgeBase;
use crate::text::{basic_tokens, preprocess};

/// Default minimum similarity for a FAQ entry to be selected.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

// =============================================================================
// Similarity measures
// =============================================================================

/// Overlap coefficient of the two texts' basic token sets:
/// `|A ∩ B| / min(|A|, |B|)`. Returns 0.0 if either side is empty.
pub fn overlap_similarity(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = basic_tokens(a).into_iter().collect();
    let words_b: HashSet<String> = basic_tokens(b).into_iter().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let overlap = words_a.intersection(&words_b).count();
    overlap as f64 / words_a.len().min(words_b.len()) as f64
}

/// Dice coefficient over preprocessed token multisets:
/// `2 * Σ min(countA(w), countB(w)) / (|A| + |B|)`.
/// Returns 0.0 if either side is empty or nothing is shared.
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = preprocess(a);
    let tokens_b = preprocess(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let counts_a = count(&tokens_a);
    let counts_b = count(&tokens_b);

    let shared: usize = counts_a
        .iter()
        .filter_map(|(word, &ca)| counts_b.get(word).map(|&cb| ca.min(cb)))
        .sum();

    if shared == 0 {
        return 0.0;
    }

    let total = tokens_a.len() + tokens_b.len();
    2.0 * shared as f64 / total as f64
}

fn count(tokens: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// Strategy
// =============================================================================

/// How user input is compared to FAQ entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// First FAQ keyword contained in the input wins.
    Keyword,
    /// Token-set overlap coefficient.
    Overlap,
    /// Dice coefficient over lemmatized, stop-word-free tokens.
    #[default]
    Dice,
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(MatchStrategy::Keyword),
            "overlap" => Ok(MatchStrategy::Overlap),
            "dice" => Ok(MatchStrategy::Dice),
            other => Err(format!(
                "unknown match strategy '{}'. Must be one of: keyword, overlap, dice",
                other
            )),
        }
    }
}

// =============================================================================
// FaqMatcher
// =============================================================================

/// A selected FAQ entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqMatch {
    pub keyword: String,
    pub score: f64,
}

/// Selects the FAQ entry that best matches user input.
#[derive(Debug, Clone)]
pub struct FaqMatcher {
    pub strategy: MatchStrategy,
    /// Scores must be strictly greater than this to be selected.
    pub threshold: f64,
}

impl Default for FaqMatcher {
    fn default() -> Self {
        Self::new(MatchStrategy::default(), DEFAULT_THRESHOLD)
    }
}

impl FaqMatcher {
    pub fn new(strategy: MatchStrategy, threshold: f64) -> Self {
        Self {
            strategy,
            threshold,
        }
    }

    /// Score `input` against one FAQ entry.
    ///
    /// The entry text is the keyword followed by all of its answers, so
    /// words that only appear in an answer still count.
    pub fn score(&self, input: &str, keyword: &str, answers: &[String]) -> f64 {
        match self.strategy {
            MatchStrategy::Keyword => {
                if input.to_lowercase().contains(keyword) {
                    1.0
                } else {
                    0.0
                }
            }
            MatchStrategy::Overlap => overlap_similarity(input, &entry_text(keyword, answers)),
            MatchStrategy::Dice => dice_similarity(input, &entry_text(keyword, answers)),
        }
    }

    /// Find the best FAQ entry for `input`.
    ///
    /// Keyword strategy returns the first contained keyword in file order.
    /// Similarity strategies return the highest score strictly above the
    /// threshold; ties keep the earlier entry.
    pub fn best_match(&self, input: &str, kb: &KnowledgeBase) -> Option<FaqMatch> {
        if self.strategy == MatchStrategy::Keyword {
            return kb
                .faq
                .keys()
                .find(|keyword| self.score(input, keyword, &[]) > 0.0)
                .map(|keyword| FaqMatch {
                    keyword: keyword.clone(),
                    score: 1.0,
                });
        }

        let mut best: Option<FaqMatch> = None;
        for (keyword, answers) in &kb.faq {
            let score = self.score(input, keyword, answers);
            let best_score = best.as_ref().map_or(0.0, |m| m.score);
            if score > best_score && score > self.threshold {
                best = Some(FaqMatch {
                    keyword: keyword.clone(),
                    score,
                });
            }
        }
        best
    }
}

fn entry_text(keyword: &str, answers: &[String]) -> String {
    format!("{} {}", keyword, answers.join(" "))
}
