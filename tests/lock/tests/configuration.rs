//! Configuration is validated before any search starts, and errors name
//! the offending plugin or parameter.

use std::io::Write as _;

use lock_tests::fixtures::{catalog, run, two_step_ciphertext, PLAINTEXT};
use rstest::rstest;
use unravel_harness::config::{ConfigBuilder, ConfigError, ConfigFile};
use unravel_harness::runner::{decrypt, RunError};
use unravel_kernel::carrier::value::{Format, Value};
use unravel_kernel::plugin::registry::RegistryError;

#[rstest]
#[case::unknown_cracker(&["crackers", "enigma"], "enigma")]
#[case::unknown_checker(&["checkers", "oracle"], "oracle")]
fn unknown_plugins_are_named(#[case] selection: &[&str], #[case] name: &str) {
    let mut builder = ConfigBuilder::new();
    match selection[0] {
        "crackers" => builder.crackers([selection[1]]),
        _ => builder.checkers([selection[1]]),
    };
    let err = builder.build(&catalog()).unwrap_err();
    assert!(matches!(err, ConfigError::Registry(RegistryError::UnknownPlugin { .. })));
    assert!(err.to_string().contains(name), "{err}");
}

#[rstest]
#[case::out_of_range("caesar.max_shift=0", "max_shift")]
#[case::malformed("best_first.workers=many", "workers")]
#[case::unknown("contains.minimum=3", "minimum")]
#[case::rejected("contains.needle=", "needle")]
fn invalid_parameters_are_named(#[case] token: &str, #[case] parameter: &str) {
    let mut builder = ConfigBuilder::new();
    builder.checkers(["contains"]);
    builder.override_param("contains", "needle", "flag{");
    builder.apply_token(token).unwrap();
    let err = builder.build(&catalog()).unwrap_err();
    let ConfigError::Registry(RegistryError::InvalidParameter { plugin, source }) = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(plugin, token.split('.').next().unwrap());
    assert_eq!(source.parameter(), parameter);
}

#[test]
fn byte_input_in_text_run_is_a_configuration_error() {
    let config = ConfigBuilder::new().build(&catalog()).unwrap();
    let err = decrypt(&config, &Value::Bytes(vec![0xc3, 0x28])).unwrap_err();
    assert!(matches!(
        err,
        RunError::Config(ConfigError::FormatMismatch {
            expected: Format::Text,
            ..
        })
    ));
}

#[test]
fn text_input_in_bytes_run_is_encoded() {
    let mut builder = ConfigBuilder::new();
    builder
        .crackers(["base64", "caesar"])
        .checkers(["wordlist"])
        .format(Format::Bytes);
    let config = builder.build(&catalog()).unwrap();
    let report = run(&config, &Value::from(two_step_ciphertext()));
    let result = report.result().expect("found");
    assert_eq!(result.final_value, Value::Bytes(PLAINTEXT.as_bytes().to_vec()));
}

#[test]
fn command_line_overrides_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
crackers = ["base64", "caesar"]
checkers = ["contains"]

[params.contains]
needle = "WORLD"
case_sensitive = true

[params.best_first]
max_depth = 4
"#
    )
    .unwrap();
    let loaded = ConfigFile::load(file.path()).unwrap();

    let mut builder = ConfigBuilder::new();
    builder.apply_file(&loaded).unwrap();
    let strict = builder.build(&catalog()).unwrap();
    assert_eq!(strict.params()["best_first"].get_int("max_depth"), Some(4));
    let report = run(&strict, &Value::from(two_step_ciphertext()));
    assert!(!report.is_found(), "case-sensitive needle should not match");

    builder.apply_token("contains.case_sensitive=false").unwrap();
    let relaxed = builder.build(&catalog()).unwrap();
    let report = run(&relaxed, &Value::from(two_step_ciphertext()));
    assert_eq!(
        report.result().expect("found").final_value,
        Value::from(PLAINTEXT)
    );
}

#[test]
fn configuration_digest_is_stable() {
    let a = ConfigBuilder::new().build(&catalog()).unwrap();
    let b = ConfigBuilder::new().build(&catalog()).unwrap();
    assert_eq!(a.snapshot_bytes().unwrap(), b.snapshot_bytes().unwrap());
    assert_eq!(a.digest().unwrap(), b.digest().unwrap());
}
