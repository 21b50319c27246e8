//! Dictionary checker.

use std::collections::HashSet;
use std::sync::Arc;

use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{CheckOutcome, Checker};

use super::readable;

/// Common English words, lowercase.
pub const COMMON_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "another",
    "any", "are", "around", "as", "at", "away", "back", "bad", "be", "because", "been", "before",
    "being", "below", "best", "better", "between", "big", "both", "brown", "but", "by", "call",
    "came", "can", "cannot", "case", "change", "code", "come", "could", "day", "did", "different",
    "do", "does", "dog", "done", "down", "each", "end", "even", "every", "find", "first", "flag",
    "for", "found", "fox", "from", "get", "give", "go", "good", "got", "great", "had", "hand",
    "has", "have", "he", "hello", "help", "her", "here", "hidden", "high", "him", "his", "home",
    "house", "how", "i", "if", "in", "into", "is", "it", "its", "just", "key", "know", "large",
    "last", "lazy", "left", "life", "like", "line", "little", "long", "look", "made", "make",
    "man", "many", "may", "me", "men", "message", "might", "more", "most", "much", "must", "my",
    "name", "need", "never", "new", "next", "no", "not", "now", "number", "of", "off", "old",
    "on", "one", "only", "open", "or", "other", "our", "out", "over", "own", "part", "people",
    "place", "plain", "point", "put", "quick", "read", "right", "said", "same", "saw", "say",
    "secret", "see", "she", "should", "show", "small", "so", "some", "something", "still",
    "such", "take", "test", "text", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "thing", "think", "this", "those", "three", "through", "time", "to", "too",
    "two", "under", "up", "us", "use", "very", "want", "was", "water", "way", "we", "well",
    "went", "were", "what", "when", "where", "which", "while", "who", "why", "will", "with",
    "word", "work", "world", "would", "write", "year", "yes", "you", "your",
];

/// Register `wordlist`.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register(registry: &mut PluginRegistry<dyn Checker>) -> Result<(), RegistryError> {
    registry.register(
        "wordlist",
        "Accept text whose words are mostly dictionary words",
        ParamSchema::new(vec![
            ParamSpec::list("words", &[], "dictionary (empty = built-in English list)"),
            ParamSpec::float("threshold", 0.75, 0.0, 1.0, "fraction of known words needed to accept"),
            ParamSpec::int("min_words", 1, 1, 10_000, "minimum number of words to accept"),
        ]),
        |params| {
            let words = params.get_list("words").unwrap_or_default();
            let threshold = params.get_float("threshold").unwrap_or(0.75);
            let min_words = params
                .get_int("min_words")
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| ParamError::Missing {
                    name: "min_words".into(),
                })?;
            let checker = if words.is_empty() {
                Wordlist::english(threshold, min_words)
            } else {
                Wordlist::new(words.iter().map(String::as_str), threshold, min_words)
            };
            Ok(Arc::new(checker) as Arc<dyn Checker>)
        },
    )
}

/// Accepts when at least `threshold` of the words are known.
///
/// Words are maximal runs of ASCII letters, lowercased. Single letters
/// are ignored unless they are the whole text.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: HashSet<String>,
    threshold: f64,
    min_words: usize,
}

impl Wordlist {
    #[must_use]
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>, threshold: f64, min_words: usize) -> Self {
        Self {
            words: words.into_iter().map(str::to_ascii_lowercase).collect(),
            threshold,
            min_words: min_words.max(1),
        }
    }

    /// Built on [`COMMON_WORDS`].
    #[must_use]
    pub fn english(threshold: f64, min_words: usize) -> Self {
        Self::new(COMMON_WORDS.iter().copied(), threshold, min_words)
    }

    fn tokens(text: &str) -> Vec<String> {
        let all: Vec<String> = text
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if all.len() == 1 {
            return all;
        }
        all.into_iter().filter(|t| t.len() > 1).collect()
    }
}

impl Checker for Wordlist {
    fn name(&self) -> &str {
        "wordlist"
    }

    #[allow(clippy::cast_precision_loss)]
    fn check(&self, value: &Value) -> CheckOutcome {
        let Some(text) = readable(value) else {
            return CheckOutcome::Reject;
        };
        let tokens = Self::tokens(text);
        if tokens.is_empty() {
            return CheckOutcome::Reject;
        }
        let known = tokens.iter().filter(|t| self.words.contains(t.as_str())).count();
        let fraction = known as f64 / tokens.len() as f64;
        if tokens.len() >= self.min_words && fraction >= self.threshold {
            CheckOutcome::Accept
        } else {
            CheckOutcome::Score(fraction)
        }
    }
}
