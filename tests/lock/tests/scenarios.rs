//! End-to-end scenarios: known ciphertexts through built-in plugins.

use std::sync::Arc;

use lock_tests::fixtures::{self, catalog, config, run, two_step_ciphertext, PLAINTEXT};
use unravel_harness::config::ConfigBuilder;
use unravel_harness::runner::{decrypt, search_report, Decryption, FAILED_TO_CRACK};
use unravel_kernel::carrier::value::{Format, Value};
use unravel_search::control::{CancelToken, SearchControl};
use unravel_search::progress::{ProgressEvent, ProgressSink};
use unravel_search::result::{CancelReason, ExhaustionReason, SearchOutcome};

#[test]
fn single_base64_step_to_dictionary_word() {
    let config = config(&["base64"], &["wordlist"], &["wordlist.words=hello"]);
    let report = run(&config, &Value::from("aGVsbG8="));
    let result = report.result().expect("found");
    assert_eq!(result.len(), 1);
    assert_eq!(result.operations(), vec!["base64"]);
    assert_eq!(result.final_value, Value::from("hello"));
    assert_eq!(result.accepted_by, "wordlist");
}

#[test]
fn random_bytes_have_no_solution() {
    let mut builder = ConfigBuilder::new();
    builder
        .crackers(["base64", "hex"])
        .checkers(["never"])
        .format(Format::Bytes);
    let config = builder.build(&catalog()).unwrap();
    let input = Value::Bytes(fixtures::noise(256, 0x5eed));

    let report = run(&config, &input);
    assert_eq!(
        report.outcome,
        SearchOutcome::Exhausted(ExhaustionReason::FrontierExhausted)
    );
    assert_eq!(report.stats.expansions, 1);

    let decryption = decrypt(&config, &input).unwrap();
    assert_eq!(decryption.message(), FAILED_TO_CRACK);
}

#[test]
fn base64_then_caesar_in_that_order() {
    let config = config(&["base64", "caesar"], &["wordlist"], &[]);
    let ciphertext = Value::from(two_step_ciphertext());
    let report = run(&config, &ciphertext);
    let result = report.result().expect("found");
    assert_eq!(result.operations(), vec!["base64", "caesar"]);
    assert_eq!(result.path[1].key_info.as_deref(), Some("shift=3"));
    assert_eq!(result.final_value, Value::from(PLAINTEXT));
}

#[test]
fn two_step_chain_renders_for_the_user() {
    let config = config(&["base64", "caesar"], &["wordlist"], &[]);
    let decryption = decrypt(&config, &Value::from(two_step_ciphertext())).unwrap();
    assert!(matches!(decryption, Decryption::Solved { .. }));
    assert_eq!(
        decryption.message(),
        "Formats used:\n    base64\n    caesar: shift=3\nFinal result: [hello world]"
    );

    let mut quiet = ConfigBuilder::new();
    quiet
        .crackers(["base64", "caesar"])
        .checkers(["wordlist"])
        .verbosity(-1);
    let quiet = quiet.build(&catalog()).unwrap();
    let decryption = decrypt(&quiet, &Value::from(two_step_ciphertext())).unwrap();
    assert_eq!(decryption.message(), PLAINTEXT);
}

struct CancelAfter {
    token: CancelToken,
    after: u64,
}

impl ProgressSink for CancelAfter {
    fn on_expand(&self, event: &ProgressEvent) {
        if event.expansions >= self.after {
            self.token.cancel();
        }
    }
}

#[rstest::rstest]
#[case::sequential(1)]
#[case::parallel(4)]
fn cancellation_mid_search_returns_no_path(#[case] workers: u32) {
    let workers = format!("best_first.workers={workers}");
    let config = config(&[], &["never"], &["best_first.max_depth=32", workers.as_str()]);
    let token = CancelToken::new();
    let control = SearchControl::new()
        .with_cancel(token.clone())
        .with_progress(Arc::new(CancelAfter { token, after: 5 }));

    let report = search_report(&config, &Value::from(two_step_ciphertext()), &control).unwrap();
    assert_eq!(report.outcome, SearchOutcome::Cancelled(CancelReason::Signal));
    assert!(report.result().is_none());
    assert_eq!(report.stats.expansions, 5);
}

struct PanickingSink;

impl ProgressSink for PanickingSink {
    fn on_expand(&self, _event: &ProgressEvent) {
        panic!("progress sink failure");
    }
}

#[rstest::rstest]
#[case::sequential(1)]
#[case::parallel(4)]
fn failing_plugins_and_sink_leave_the_result_unchanged(#[case] workers: u32) {
    let workers = format!("best_first.workers={workers}");
    let ciphertext = Value::from(two_step_ciphertext());
    let clean = run(
        &config(&["base64", "caesar"], &["wordlist"], &[workers.as_str()]),
        &ciphertext,
    );

    let noisy_config = config(
        &["brittle", "base64", "explosive", "caesar"],
        &["wordlist"],
        &[workers.as_str()],
    );
    let control = SearchControl::new().with_progress(Arc::new(PanickingSink));
    let noisy = search_report(&noisy_config, &ciphertext, &control).unwrap();

    assert!(noisy.result().is_some());
    assert_eq!(noisy.result(), clean.result());
    assert_eq!(noisy.stats.expansions, clean.stats.expansions);
    assert_eq!(clean.stats.cracker_failures, 0);
    assert_eq!(noisy.stats.cracker_failures, 2 * noisy.stats.expansions);
}
