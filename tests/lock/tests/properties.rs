//! Search-wide properties: determinism, path validity, termination,
//! cycle safety and worker-count independence.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lock_tests::fixtures::{self, config, report_digest_lines, run, two_step_ciphertext};
use rstest::rstest;
use unravel_kernel::carrier::value::Value;
use unravel_search::result::{ExhaustionReason, SearchOutcome};

fn hex_of(text: &str) -> String {
    text.bytes().map(|b| format!("{b:02x}")).collect()
}

fn inputs() -> Vec<String> {
    vec![
        two_step_ciphertext(),
        hex_of("the quick brown fox"),
        STANDARD.encode(hex_of("secret")),
        fixtures::caesar_encrypt("meet me at the old tower", 11),
        "uryyb jbeyq".to_string(),
    ]
}

const BOUNDED: &str = "best_first.max_expansions=300";

#[test]
fn repeated_runs_are_bit_identical() {
    let config = config(&[], &[], &[BOUNDED]);
    for input in inputs() {
        let value = Value::from(input.as_str());
        let first = run(&config, &value);
        let second = run(&config, &value);
        assert_eq!(first.outcome, second.outcome, "input {input:?}");
        assert_eq!(
            report_digest_lines(&first),
            report_digest_lines(&second),
            "input {input:?}"
        );
        if let (Some(a), Some(b)) = (first.result(), second.result()) {
            assert_eq!(
                a.to_canonical_json_bytes().unwrap(),
                b.to_canonical_json_bytes().unwrap()
            );
        }
    }
}

#[test]
fn found_paths_replay_from_the_ciphertext() {
    let config = config(&[], &[], &[BOUNDED]);
    let crackers = config.plugin_set().crackers;
    let mut found = 0;
    for input in inputs() {
        let value = Value::from(input.as_str());
        let report = run(&config, &value);
        let Some(result) = report.result() else {
            continue;
        };
        found += 1;
        result.replay(&value, &crackers).unwrap();
        let mut current = &value;
        for step in &result.path {
            assert_eq!(&step.input, current);
            current = &step.output;
        }
        assert_eq!(current, &result.final_value);
    }
    assert!(found > 0, "no input was solved");
}

#[rstest]
#[case::rot13("uryyb jbeyq", &["caesar"])]
#[case::hex("68656c6c6f20776f726c64", &["hex"])]
fn simple_encodings_decode_with_defaults(#[case] input: &str, #[case] ops: &[&str]) {
    let config = config(&[], &[], &[]);
    let report = run(&config, &Value::from(input));
    let result = report.result().expect("found");
    assert_eq!(result.operations(), ops);
    assert_eq!(result.final_value, Value::from("hello world"));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(0xdead_beef)]
fn unsolvable_input_terminates_within_budget(#[case] seed: u64) {
    let config = config(&[], &["never"], &[BOUNDED]);
    let noise = fixtures::noise(48, seed);
    let input = Value::from(hex_of_bytes(&noise));
    let report = run(&config, &input);
    assert!(
        matches!(report.outcome, SearchOutcome::Exhausted(_)),
        "{:?}",
        report.outcome
    );
    assert!(report.stats.expansions <= 300);
}

fn hex_of_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn involutions_do_not_loop() {
    let config = config(
        &["reverse", "atbash", "rot47"],
        &["never"],
        &["best_first.max_depth=64", "best_first.accept_root=false"],
    );
    let report = run(&config, &Value::from("Attack at dawn!"));
    assert_eq!(
        report.outcome,
        SearchOutcome::Exhausted(ExhaustionReason::FrontierExhausted)
    );
    assert!(report.stats.cycles_suppressed > 0);
    assert!(report.stats.expansions < 64);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
fn worker_count_does_not_change_the_result(#[case] workers: u32) {
    let parallel_token = format!("best_first.workers={workers}");
    let sequential = config(&[], &[], &[BOUNDED]);
    let parallel = config(&[], &[], &[BOUNDED, parallel_token.as_str()]);
    for input in inputs() {
        let value = Value::from(input.as_str());
        let one = run(&sequential, &value);
        let many = run(&parallel, &value);
        assert_eq!(one.outcome, many.outcome, "input {input:?}");
        assert_eq!(
            report_digest_lines(&one),
            report_digest_lines(&many),
            "input {input:?}"
        );
    }
}
