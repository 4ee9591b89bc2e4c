use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use tia_test_utils::fixtures;

fn tia_agent(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tia-agent"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_package_config(dir: &Path) {
    fixtures::write_config(
        dir,
        &json!({
            "filter": { "type": "package", "version": "1.0", "config": "acme" },
            "generator": { "type": "println", "version": "1.0" },
            "logging": "WARNING"
        }),
    );
}

#[test]
fn test_check_reports_selected_plugins() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());

    let output = tia_agent(&["check", "--config", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("filter:    package 1.0"), "{text}");
    assert!(text.contains("generator: println 1.0"), "{text}");
    assert!(text.to_lowercase().contains("logging:   warn"), "{text}");
    assert!(text.contains("installed: true"), "{text}");
}

#[test]
fn test_check_fails_without_generator() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_config(
        dir.path(),
        &json!({ "filter": { "type": "package", "version": "1.0", "config": "acme" } }),
    );

    let output = tia_agent(&["check", "--config", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("generator: none"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no generator"));
}

#[test]
fn test_probe_prints_verdicts() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());

    let output = tia_agent(&[
        "probe",
        "--config",
        dir.path().to_str().unwrap(),
        "acme/Widget",
        "acmecorp/Widget",
        "other/Thing",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "filter: package 1.0\naccept acme/Widget\nreject acmecorp/Widget\nreject other/Thing\n"
    );
}

#[test]
fn test_instrument_prints_plan() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());
    let descriptor = dir.path().join("Shape.json");
    std::fs::write(&descriptor, fixtures::descriptor_bytes(&fixtures::shape_unit())).unwrap();

    let output = tia_agent(&[
        "instrument",
        "--config",
        dir.path().to_str().unwrap(),
        descriptor.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("acme.Shape: 1 of 2 behaviors instrumented\n  render()\n"), "{text}");
    assert!(text.contains("before: java.lang.System.out.println("), "{text}");
    assert!(text.contains("after (return preserved): java.lang.System.out.println("), "{text}");
}

#[test]
fn test_instrument_json_output() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());
    let descriptor = dir.path().join("Triple.json");
    std::fs::write(&descriptor, fixtures::descriptor_bytes(&fixtures::triple_unit())).unwrap();

    let output = tia_agent(&[
        "instrument",
        "--json",
        "--config",
        dir.path().to_str().unwrap(),
        descriptor.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let rewritten = fixtures::decode(&output.stdout);
    assert_eq!(rewritten.injections.len(), 6);
}

#[test]
fn test_instrument_leaves_unselected_unit_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());
    let descriptor = dir.path().join("Other.json");
    std::fs::write(&descriptor, fixtures::descriptor_bytes(&fixtures::other_unit())).unwrap();

    let output = tia_agent(&[
        "instrument",
        "--config",
        dir.path().to_str().unwrap(),
        descriptor.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "other.Other: unchanged\n");
}

#[test]
fn test_instrument_rejects_unreadable_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    write_package_config(dir.path());
    let descriptor = dir.path().join("broken.json");
    std::fs::write(&descriptor, "[]").unwrap();

    let output = tia_agent(&[
        "instrument",
        "--config",
        dir.path().to_str().unwrap(),
        descriptor.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("decoding"));
}
