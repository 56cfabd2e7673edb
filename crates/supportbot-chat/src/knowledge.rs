//! Knowledge base: intent response templates and FAQ entries.
//!
//! The knowledge base is a flat JSON document mapping the fixed intents
//! (`greeting`, `goodbye`, `name_acknowledge`, `fallback`) to lists of
//! response templates, plus an ordered `faq` map from keyword to answers.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ChatError;

/// Placeholder replaced with the bot's display name.
pub const BOT_NAME_PLACEHOLDER: &str = "{bot_name}";
/// Placeholder replaced with the user's name.
pub const USER_NAME_PLACEHOLDER: &str = "{user_name}";

// =============================================================================
// Intents
// =============================================================================

/// Fixed response categories of the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Goodbye,
    NameAcknowledge,
    Fallback,
}

impl Intent {
    /// Topic name recorded in the conversation context.
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Goodbye => "goodbye",
            Intent::NameAcknowledge => "name_acknowledge",
            Intent::Fallback => "fallback",
        }
    }
}

// =============================================================================
// Defaults
// =============================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_greeting() -> Vec<String> {
    strings(&[
        "Hello! I'm {bot_name}, here to help you today.",
        "Hi there! I'm {bot_name}. How can I assist you?",
    ])
}

fn default_goodbye() -> Vec<String> {
    strings(&[
        "Thank you for chatting with us today!",
        "Have a great day! Feel free to come back if you have more questions.",
    ])
}

fn default_name_acknowledge() -> Vec<String> {
    strings(&[
        "Nice to meet you, {user_name}!",
        "Hello, {user_name}! How can I help you today?",
    ])
}

fn default_fallback() -> Vec<String> {
    strings(&[
        "I'm not sure I understand. Could you rephrase that?",
        "I don't have information on that. Could you try asking something else?",
    ])
}

fn default_faq() -> IndexMap<String, Vec<String>> {
    let mut faq = IndexMap::new();
    faq.insert(
        "hours".to_string(),
        strings(&["Our store is open Monday-Friday 9AM-6PM and Saturday 10AM-4PM. We're closed on Sundays."]),
    );
    faq.insert(
        "return policy".to_string(),
        strings(&["You can return any unused item within 30 days with a receipt for a full refund."]),
    );
    faq.insert(
        "shipping".to_string(),
        strings(&["We offer free shipping on orders over $50. Standard shipping typically takes 3-5 business days."]),
    );
    faq.insert(
        "contact".to_string(),
        strings(&["You can reach our customer service team at support@example.com or call us at (555) 123-4567."]),
    );
    faq.insert(
        "payment".to_string(),
        strings(&["We accept all major credit cards, PayPal, and Apple Pay."]),
    );
    faq
}

// =============================================================================
// KnowledgeBase
// =============================================================================

/// Response templates and FAQ answers.
///
/// Categories missing from a loaded file take their built-in defaults.
/// Unknown top-level keys are preserved on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default = "default_greeting")]
    pub greeting: Vec<String>,
    #[serde(default = "default_goodbye")]
    pub goodbye: Vec<String>,
    #[serde(default = "default_name_acknowledge")]
    pub name_acknowledge: Vec<String>,
    #[serde(default = "default_fallback")]
    pub fallback: Vec<String>,
    /// FAQ keyword -> answers, in file order.
    #[serde(default)]
    pub faq: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            goodbye: default_goodbye(),
            name_acknowledge: default_name_acknowledge(),
            fallback: default_fallback(),
            faq: default_faq(),
            extra: IndexMap::new(),
        }
    }
}

impl KnowledgeBase {
    /// Load the knowledge base from `path`.
    ///
    /// A missing file yields the built-in defaults. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        if !path.exists() {
            info!(path = %path.display(), "Knowledge base not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ChatError::KnowledgeBase(format!("failed to read {}: {}", path.display(), e))
        })?;
        let kb: KnowledgeBase = serde_json::from_str(&content).map_err(|e| {
            ChatError::KnowledgeBase(format!("failed to parse {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), faq_entries = kb.faq.len(), "Knowledge base loaded");
        Ok(kb)
    }

    /// Write the knowledge base to `path` as 4-space indented JSON.
    pub fn save(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ChatError::KnowledgeBase(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let json = to_pretty_json(self)
            .map_err(|e| ChatError::KnowledgeBase(format!("failed to serialize: {}", e)))?;
        fs::write(path, json).map_err(|e| {
            ChatError::KnowledgeBase(format!("failed to write {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Knowledge base saved");
        Ok(())
    }

    /// Append `response` to the answers for `keyword`, creating the entry if
    /// needed. The keyword is trimmed and lowercased.
    ///
    /// Returns the confirmation message shown to the user.
    pub fn add_faq(&mut self, keyword: &str, response: &str) -> Result<String, ChatError> {
        let keyword = keyword.trim().to_lowercase();
        let response = response.trim();
        if keyword.is_empty() || response.is_empty() {
            return Err(ChatError::MissingFaqFields);
        }
        self.faq
            .entry(keyword.clone())
            .or_default()
            .push(response.to_string());
        Ok(format!("Added new response for '{}'", keyword))
    }

    /// Templates for a fixed intent.
    pub fn templates(&self, intent: Intent) -> &[String] {
        match intent {
            Intent::Greeting => &self.greeting,
            Intent::Goodbye => &self.goodbye,
            Intent::NameAcknowledge => &self.name_acknowledge,
            Intent::Fallback => &self.fallback,
        }
    }

    /// Pick a random template for `intent`.
    ///
    /// An empty category in the file falls back to the first built-in
    /// template for that intent.
    pub fn pick<R: Rng + ?Sized>(&self, intent: Intent, rng: &mut R) -> String {
        match self.templates(intent).choose(rng) {
            Some(t) => t.clone(),
            None => Self::default().templates(intent)[0].clone(),
        }
    }

    /// Pick a random answer for a FAQ keyword.
    pub fn pick_faq<R: Rng + ?Sized>(&self, keyword: &str, rng: &mut R) -> Option<String> {
        self.faq.get(keyword).and_then(|answers| answers.choose(rng)).cloned()
    }
}

/// Substitute `{bot_name}` and `{user_name}` placeholders.
pub fn render(template: &str, bot_name: &str, user_name: Option<&str>) -> String {
    let rendered = template.replace(BOT_NAME_PLACEHOLDER, bot_name);
    match user_name {
        Some(name) => rendered.replace(USER_NAME_PLACEHOLDER, name),
        None => rendered,
    }
}

/// Serialize with 4-space indentation.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // ---- Defaults ----

    #[test]
    fn test_default_has_five_faq_entries_in_order() {
        let kb = KnowledgeBase::default();
        let keys: Vec<&str> = kb.faq.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["hours", "return policy", "shipping", "contact", "payment"]
        );
    }

    #[test]
    fn test_default_templates_non_empty() {
        let kb = KnowledgeBase::default();
        for intent in [
            Intent::Greeting,
            Intent::Goodbye,
            Intent::NameAcknowledge,
            Intent::Fallback,
        ] {
            assert!(!kb.templates(intent).is_empty());
        }
    }

    // ---- Loading ----

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(kb, KnowledgeBase::default());
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        fs::write(&path, "{ not json").unwrap();
        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(matches!(err, ChatError::KnowledgeBase(_)));
    }

    #[test]
    fn test_load_partial_file_fills_missing_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        fs::write(
            &path,
            r#"{"greeting": ["Howdy from {bot_name}"], "faq": {"warranty": ["Two years."]}}"#,
        )
        .unwrap();
        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.greeting, vec!["Howdy from {bot_name}"]);
        assert_eq!(kb.fallback, default_fallback());
        assert_eq!(kb.faq.len(), 1);
        assert_eq!(kb.faq["warranty"], vec!["Two years."]);
    }

    #[test]
    fn test_load_preserves_faq_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        fs::write(
            &path,
            r#"{"faq": {"zebra": ["z"], "apple": ["a"], "mango": ["m"]}}"#,
        )
        .unwrap();
        let kb = KnowledgeBase::load(&path).unwrap();
        let keys: Vec<&str> = kb.faq.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    // ---- Saving ----

    #[test]
    fn test_save_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        KnowledgeBase::default().save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n    \"greeting\": [\n        \"Hello!"));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("kb.json");
        let mut kb = KnowledgeBase::default();
        kb.add_faq("Warranty", "Two years on all items.").unwrap();
        kb.save(&path).unwrap();
        let reloaded = KnowledgeBase::load(&path).unwrap();
        assert_eq!(reloaded, kb);
    }

    #[test]
    fn test_save_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        fs::write(&path, r#"{"faq": {}, "version": 3}"#).unwrap();
        let kb = KnowledgeBase::load(&path).unwrap();
        kb.save(&path).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 3);
    }

    // ---- add_faq ----

    #[test]
    fn test_add_faq_new_keyword() {
        let mut kb = KnowledgeBase::default();
        let msg = kb.add_faq("  Gift Cards ", "Gift cards never expire.").unwrap();
        assert_eq!(msg, "Added new response for 'gift cards'");
        assert_eq!(kb.faq["gift cards"], vec!["Gift cards never expire."]);
        assert_eq!(kb.faq.keys().last().unwrap(), "gift cards");
    }

    #[test]
    fn test_add_faq_existing_keyword_appends() {
        let mut kb = KnowledgeBase::default();
        kb.add_faq("shipping", "Express shipping takes 1-2 days.").unwrap();
        assert_eq!(kb.faq["shipping"].len(), 2);
        assert_eq!(kb.faq["shipping"][1], "Express shipping takes 1-2 days.");
    }

    #[test]
    fn test_add_faq_rejects_blank_fields() {
        let mut kb = KnowledgeBase::default();
        assert!(matches!(
            kb.add_faq("", "answer"),
            Err(ChatError::MissingFaqFields)
        ));
        assert!(matches!(
            kb.add_faq("topic", "   "),
            Err(ChatError::MissingFaqFields)
        ));
    }

    // ---- Picking and rendering ----

    #[test]
    fn test_pick_returns_member_of_category() {
        let kb = KnowledgeBase::default();
        let mut rng = rng();
        for _ in 0..10 {
            let t = kb.pick(Intent::Goodbye, &mut rng);
            assert!(kb.goodbye.contains(&t));
        }
    }

    #[test]
    fn test_pick_empty_category_falls_back_to_builtin() {
        let kb = KnowledgeBase {
            fallback: vec![],
            ..KnowledgeBase::default()
        };
        let t = kb.pick(Intent::Fallback, &mut rng());
        assert_eq!(t, default_fallback()[0]);
    }

    #[test]
    fn test_pick_faq_unknown_keyword() {
        let kb = KnowledgeBase::default();
        assert!(kb.pick_faq("nope", &mut rng()).is_none());
        assert!(kb.pick_faq("payment", &mut rng()).is_some());
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        assert_eq!(
            render("Hi, I'm {bot_name}.", "Helper", None),
            "Hi, I'm Helper."
        );
        assert_eq!(
            render("Nice to meet you, {user_name}!", "Helper", Some("Alice")),
            "Nice to meet you, Alice!"
        );
        assert_eq!(
            render("Hello {user_name}", "Helper", None),
            "Hello {user_name}"
        );
    }
}
