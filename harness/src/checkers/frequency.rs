//! English letter-frequency scoring.

use std::sync::Arc;

use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{CheckOutcome, Checker};

use super::{printable_ratio, readable};

pub const ENGLISH_FREQUENCY: &str = "english_frequency";

/// Relative frequency of `a..=z` in English text.
const ENGLISH: [f64; 26] = [
    0.0817, 0.0149, 0.0278, 0.0425, 0.1270, 0.0223, 0.0202, 0.0609, 0.0697, 0.0015, 0.0077,
    0.0403, 0.0241, 0.0675, 0.0751, 0.0193, 0.0010, 0.0599, 0.0633, 0.0906, 0.0276, 0.0098,
    0.0236, 0.0015, 0.0197, 0.0007,
];

/// How far a custom distribution may sum from 1.
const DIST_TOLERANCE: f64 = 0.01;

/// Below this printable ratio the value is not treated as text.
const MIN_PRINTABLE: f64 = 0.8;

/// Register `english_frequency`.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register(registry: &mut PluginRegistry<dyn Checker>) -> Result<(), RegistryError> {
    registry.register(
        ENGLISH_FREQUENCY,
        "Score by closeness to English letter frequencies",
        ParamSchema::new(vec![ParamSpec::list(
            "dist",
            &[],
            "26 relative frequencies for a..=z (empty = English)",
        )]),
        |params| {
            let dist = params.get_list("dist").unwrap_or_default();
            let checker = if dist.is_empty() {
                EnglishFrequency::english()
            } else {
                EnglishFrequency::with_distribution(parse_distribution(dist)?)
            };
            Ok(Arc::new(checker) as Arc<dyn Checker>)
        },
    )
}

/// Parse a `dist` list: 26 positive frequencies summing to about 1.
///
/// # Errors
///
/// [`ParamError::Malformed`] for an entry that is not a number,
/// [`ParamError::Rejected`] for a wrong length, a non-positive entry or a
/// total away from 1.
pub fn parse_distribution(items: &[String]) -> Result<[f64; 26], ParamError> {
    let rejected = |detail: String| ParamError::Rejected {
        name: "dist".into(),
        detail,
    };
    if items.len() != 26 {
        return Err(rejected(format!(
            "expected 26 frequencies for a..=z, got {}",
            items.len()
        )));
    }
    let mut dist = [0.0; 26];
    for (slot, item) in dist.iter_mut().zip(items) {
        let freq: f64 = item.trim().parse().map_err(|_| ParamError::Malformed {
            name: "dist".into(),
            value: item.clone(),
            expected: "float".into(),
        })?;
        if !freq.is_finite() || freq <= 0.0 {
            return Err(rejected(format!("frequency {item:?} must be positive")));
        }
        *slot = freq;
    }
    let total: f64 = dist.iter().sum();
    if (total - 1.0).abs() > DIST_TOLERANCE {
        return Err(rejected(format!("frequencies sum to {total}, not 1")));
    }
    Ok(dist)
}

/// Score is `1 / (1 + chi2 / n)` over the `n` letters of the value.
///
/// Never accepts; it only orders the frontier.
#[derive(Debug, Clone, Copy)]
pub struct EnglishFrequency {
    expected: [f64; 26],
}

impl Default for EnglishFrequency {
    fn default() -> Self {
        Self::english()
    }
}

impl EnglishFrequency {
    #[must_use]
    pub const fn english() -> Self {
        Self::with_distribution(ENGLISH)
    }

    /// Compare against `dist` instead of English. Entries must be positive.
    #[must_use]
    pub const fn with_distribution(dist: [f64; 26]) -> Self {
        Self { expected: dist }
    }

    #[allow(clippy::cast_precision_loss)]
    fn chi_squared(&self, counts: &[u64; 26], letters: u64) -> f64 {
        let n = letters as f64;
        counts
            .iter()
            .zip(self.expected)
            .map(|(&observed, freq)| {
                let expected = n * freq;
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum()
    }
}

impl Checker for EnglishFrequency {
    fn name(&self) -> &str {
        ENGLISH_FREQUENCY
    }

    #[allow(clippy::cast_precision_loss)]
    fn check(&self, value: &Value) -> CheckOutcome {
        let Some(text) = readable(value) else {
            return CheckOutcome::Reject;
        };
        if printable_ratio(value) < MIN_PRINTABLE {
            return CheckOutcome::Reject;
        }
        let mut counts = [0u64; 26];
        let mut letters = 0u64;
        for b in text.bytes().filter(u8::is_ascii_alphabetic) {
            counts[usize::from(b.to_ascii_lowercase() - b'a')] += 1;
            letters += 1;
        }
        if letters == 0 {
            return CheckOutcome::Reject;
        }
        let chi2 = self.chi_squared(&counts, letters);
        CheckOutcome::Score(1.0 / (1.0 + chi2 / letters as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        score_with(&EnglishFrequency::english(), text)
    }

    fn score_with(checker: &EnglishFrequency, text: &str) -> f64 {
        match checker.check(&Value::from(text)) {
            CheckOutcome::Score(s) => s,
            other => panic!("expected a score, got {other:?}"),
        }
    }

    #[test]
    fn english_outscores_shifted_english() {
        let plain = score("the quick brown fox jumps over the lazy dog and keeps running");
        let shifted = score("wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj dqg nhhsv uxqqlqj");
        assert!(plain > shifted, "{plain} <= {shifted}");
        assert!(plain > 0.0 && plain <= 1.0);
    }

    #[test]
    fn rejects_values_without_letters_or_unprintable() {
        assert_eq!(EnglishFrequency::english().check(&Value::from("1234")), CheckOutcome::Reject);
        assert_eq!(
            EnglishFrequency::english().check(&Value::from("a\u{1}\u{2}\u{3}\u{4}")),
            CheckOutcome::Reject
        );
        assert_eq!(
            EnglishFrequency::english().check(&Value::Bytes(vec![0xff, 0x00])),
            CheckOutcome::Reject
        );
    }

    fn uniform() -> Vec<String> {
        vec![(1.0f64 / 26.0).to_string(); 26]
    }

    #[test]
    fn custom_distribution_changes_the_reference() {
        let alphabet = "abcdefghijklmnopqrstuvwxyz";
        let flat = EnglishFrequency::with_distribution(parse_distribution(&uniform()).unwrap());
        let under_flat = score_with(&flat, alphabet);
        let under_english = score(alphabet);
        assert!(under_flat > 0.999, "{under_flat}");
        assert!(under_english < under_flat);
    }

    #[test]
    fn english_table_is_a_valid_distribution() {
        let items: Vec<String> = ENGLISH.iter().map(ToString::to_string).collect();
        assert_eq!(parse_distribution(&items).unwrap(), ENGLISH);
    }

    #[test]
    fn malformed_distributions_are_rejected() {
        let short = uniform()[..25].to_vec();
        assert!(matches!(
            parse_distribution(&short),
            Err(ParamError::Rejected { .. })
        ));

        let mut zero = uniform();
        zero[0] = "0".into();
        assert!(matches!(
            parse_distribution(&zero),
            Err(ParamError::Rejected { .. })
        ));

        let doubled = vec![(2.0f64 / 26.0).to_string(); 26];
        let err = parse_distribution(&doubled).unwrap_err();
        assert!(matches!(err, ParamError::Rejected { .. }));
        assert_eq!(err.parameter(), "dist");

        let mut word = uniform();
        word[3] = "lots".into();
        assert!(matches!(
            parse_distribution(&word),
            Err(ParamError::Malformed { .. })
        ));
    }
}
