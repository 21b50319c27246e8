//! Runs fixed ciphertexts through the default configuration and prints
//! deterministic `key=value` lines for cross-process comparison.
//!
//! Usage: `search_fixture [workers]`

use lock_tests::fixtures::{catalog, report_digest_lines, two_step_ciphertext};
use unravel_harness::config::ConfigBuilder;
use unravel_harness::runner::search_report;
use unravel_kernel::carrier::value::Value;
use unravel_search::control::SearchControl;

fn main() {
    let workers = std::env::args().nth(1).unwrap_or_else(|| "1".to_string());
    let workers = format!("best_first.workers={workers}");
    let mut builder = ConfigBuilder::new();
    builder
        .apply_tokens(["best_first.max_expansions=300", workers.as_str()])
        .expect("well-formed tokens");
    let config = builder.build(&catalog()).expect("valid configuration");

    println!("config_digest={}", config.digest().expect("canonical config"));
    for (name, input) in [
        ("two_step", two_step_ciphertext()),
        ("rot13", "uryyb jbeyq".to_string()),
        ("noise", "9f3b00c1e27d".to_string()),
    ] {
        let report = search_report(&config, &Value::from(input), &SearchControl::new())
            .expect("search runs");
        for line in report_digest_lines(&report).lines() {
            println!("{name}.{line}");
        }
    }
}
