//! Cross-process determinism: the `search_fixture` binary prints identical
//! output regardless of working directory, locale, unrelated environment
//! or worker count.

use std::path::Path;
use std::process::Command;

fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("search_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .args(args)
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LANG")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }
    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "search_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

fn without_config_digest(output: &str) -> String {
    output
        .lines()
        .filter(|line| !line.starts_with("config_digest="))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn crossproc_output_is_environment_independent() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);
    assert!(baseline.contains("config_digest=sha256:"), "{baseline}");
    assert!(baseline.contains("two_step.outcome="), "{baseline}");
    assert!(baseline.contains("rot13.outcome=found"), "{baseline}");

    let alt_cwd = std::env::temp_dir();
    let variant_cwd = run_variant(&alt_cwd.to_string_lossy(), &[], &[]);
    assert_eq!(baseline, variant_cwd, "output differs when cwd changes");

    let variant_locale = run_variant(&root, &[], &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(baseline, variant_locale, "output differs when LC_ALL=C LANG=C");

    let variant_noise = run_variant(
        &root,
        &[],
        &[
            ("UNRAVEL_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
            ("HOME", "/nonexistent"),
        ],
    );
    assert_eq!(baseline, variant_noise, "output differs with spurious env vars");
}

#[test]
fn crossproc_output_is_worker_independent() {
    let root = workspace_root();
    let one = run_variant(&root, &["1"], &[]);
    let four = run_variant(&root, &["4"], &[]);
    assert_eq!(without_config_digest(&one), without_config_digest(&four));
}
