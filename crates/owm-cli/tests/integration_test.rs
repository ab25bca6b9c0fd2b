//! Integration tests for the OWM parse pipeline and the `owm` binary.

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use owm_core::{NodeKind, ParserConfig, RelationKind};
use owm_parser::{parse, parse_with_config};
use serde_json::Value;

const TEA_SHOP: &str = r#"title Tea Shop
style wardley

# Users and their needs
anchor Business [0.95, 0.63]
anchor Public [0.95, 0.78]
component Cup of Tea [0.79, 0.61] label [19, -4]
component Cup [0.73, 0.78]
component Tea [0.63, 0.81]
component Hot Water [0.52, 0.80]
component Water [0.38, 0.82]
component Kettle [0.43, 0.35] label [-57, 4]
component Power [0.10, 0.7] label [-27, 20]

Business->Cup of Tea
Public->Cup of Tea
Cup of Tea->Cup
Cup of Tea->Tea
Cup of Tea->Hot Water
Hot Water->Water
Hot Water->Kettle
Kettle->Power

Kettle +<> Power
evolve Kettle 0.62 label [16, 5]
evolve Power 0.89 label [-12, 21]

note Standardising power allows Kettles to evolve faster [0.30, 0.49]
note Hot water is obvious and well known [0.48, 0.80]
"#;

fn owm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_owm"))
        .args(args)
        .output()
        .expect("run owm binary")
}

fn owm_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_owm"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn owm binary");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for owm binary")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn tea_shop_parses_cleanly() {
    let map = parse(TEA_SHOP);
    assert!(map.warnings.is_empty(), "warnings: {:?}", map.warnings);

    assert_eq!(map.title.as_deref(), Some("Tea Shop"));
    assert_eq!(map.nodes.len(), 9);
    assert_eq!(map.nodes_of_kind(NodeKind::Anchor).count(), 2);
    assert_eq!(map.edges.len(), 8);
    assert_eq!(map.bluelines.len(), 1);
    assert_eq!(map.evolutions.len(), 2);
    assert_eq!(map.notes.len(), 2);
    assert!(map.unresolved_references().is_empty());

    let titles: Vec<&str> = map.nodes.keys().map(String::as_str).collect();
    assert_eq!(titles[..3], ["Business", "Public", "Cup of Tea"]);
}

#[test]
fn parsing_is_idempotent() {
    assert_eq!(parse(TEA_SHOP), parse(TEA_SHOP));
}

#[test]
fn consumer_can_find_dangling_edges() {
    let map = parse("component A [0.5, 0.5]\nA -> B\nevolve C 0.9");
    let missing = map.unresolved_references();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0].relation, RelationKind::Edge);
    assert_eq!(
        missing[0].to_string(),
        "Could not find a component called 'B'"
    );
    assert_eq!(missing[1].relation, RelationKind::Evolution);
}

#[test]
fn every_bad_line_becomes_one_warning() {
    let source = "title Broken\ncomponent Cup\nCup -> Tea -> Water\nwhat is this\nnote\nA +<> B +<> C";
    let report = parse_with_config(source, &ParserConfig::default());
    assert_eq!(report.map.warnings.len(), 5);
    assert_eq!(report.diagnostics.len(), 5);
    assert_eq!(report.map.title.as_deref(), Some("Broken"));
    assert!(report.map.is_empty());
}

#[test]
fn cli_parse_summary_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tea.owm");
    fs::write(&path, TEA_SHOP).expect("write map");

    let output = owm(&["parse", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let summary = stdout_json(&output);
    assert_eq!(summary["title"], "Tea Shop");
    assert_eq!(summary["node_count"], 9);
    assert_eq!(summary["edge_count"], 8);
    assert_eq!(summary["blueline_count"], 1);
    assert_eq!(summary["warning_count"], 0);
}

#[test]
fn cli_parse_full_model_from_stdin() {
    let output = owm_with_stdin(&["parse", "--full"], "anchor User [0.9, 0.1]\nnote hi");
    assert!(output.status.success());

    let model = stdout_json(&output);
    assert_eq!(model["nodes"]["User"]["kind"], "anchor");
    assert_eq!(model["nodes"]["User"]["label_offset"]["x"], 2.0);
    assert_eq!(model["notes"][0]["text"], "hi");
    assert_eq!(model["notes"][0]["position"]["maturity"], 0.2);
}

#[test]
fn cli_validate_flags_unresolved_references() {
    let output = owm(&["validate", "--json", "component A [0.5, 0.5]\nA -> Ghost"]);
    assert_eq!(output.status.code(), Some(1));

    let result = stdout_json(&output);
    assert_eq!(result["valid"], false);
    assert_eq!(result["errors"][0]["code"], "owm/error/unresolved-edge");
    assert_eq!(
        result["errors"][0]["message"],
        "Could not find a component called 'Ghost'"
    );
}

#[test]
fn cli_validate_strict_fails_on_warnings() {
    let source = "component A [0.5, 0.5]\nnonsense here";

    let lenient = owm(&["validate", "--json", source]);
    assert!(lenient.status.success());
    let result = stdout_json(&lenient);
    assert_eq!(result["valid"], true);
    assert_eq!(result["warnings"][0]["line"], 2);
    assert_eq!(result["warnings"][0]["code"], "owm/warn/unrecognized-line");

    let strict = owm(&["validate", "--json", "--strict", source]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn cli_reads_limits_from_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("owm.toml");
    fs::write(&config, "max_line_chars = 10\n").expect("write config");

    let output = owm(&[
        "parse",
        "--config",
        config.to_str().expect("utf-8 path"),
        "A -> B\ncomponent Long [0.1, 0.2]",
    ]);
    assert!(output.status.success());

    let summary = stdout_json(&output);
    assert_eq!(summary["edge_count"], 1);
    assert_eq!(summary["node_count"], 0);
    assert_eq!(
        summary["warnings"][0],
        "Line 2 exceeds 10 characters; skipped"
    );
}

#[test]
fn cli_rejects_zero_limits() {
    let output = owm(&["parse", "--max-line-chars", "0", "A -> B"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_line_chars must be greater than zero"));
}
