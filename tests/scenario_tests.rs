// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scenario and catalog files through the public loading API

use ace_chain::registry::catalog::load_registry;
use ace_chain::registry::standard::standard_registry;
use ace_chain::report::{save_report, PlanOutputFormat, PlanReport};
use ace_chain::scenario::Scenario;
use ace_chain::{AceError, Consequence};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PADDING_ORACLE: &str = r#"
name: aes-cbc behind a padding oracle
steps:
  - { op: transform, name: source, kind: derivation, algorithm: Plaintext }
  - { op: produce, layer: message, transform: source }
  - op: transform
    name: enc
    kind: encryption
    algorithm: AES
    mode: CBC
    key: { material: "000102030405060708090a0b0c0d0e0f" }
  - { op: produce, layer: ciphertext, transform: enc, wraps: message }
  - { op: cursor, name: oracle, layer: ciphertext }
  - { op: consume, transform: enc, cursor: oracle }
goal: { layer: ciphertext, consequence: plaintext_recovery }
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_scenario_plans_padding_oracle() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "oracle.yaml", PADDING_ORACLE);

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.display_name(), "aes-cbc behind a padding oracle");

    let plan = scenario.plan(&standard_registry()).unwrap();
    assert_eq!(plan.goal, Consequence::PlaintextRecovery);
    let names: Vec<_> = plan.exploits.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["cbc_padding_oracle_attack"]);
}

#[test]
fn test_fingerprint_is_stable_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "oracle.yml", PADDING_ORACLE);
    let registry = standard_registry();

    let first = Scenario::load(&path).unwrap().plan(&registry).unwrap();
    let second = Scenario::load(&path).unwrap().plan(&registry).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.exploits, second.exploits);
}

#[test]
fn test_json_scenario_with_solver_section() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "prng.json",
        r#"{
  "name": "prng keyed stream",
  "solver": { "max_depth": 0 },
  "steps": [
    { "op": "transform", "name": "prng", "kind": "derivation", "algorithm": "MT19937" },
    { "op": "produce", "layer": "key", "transform": "prng" },
    { "op": "transform", "name": "enc", "kind": "encryption", "algorithm": "Blowfish", "key": { "layer": "key" } },
    { "op": "produce", "layer": "ciphertext", "transform": "enc" }
  ],
  "goal": { "layer": "ciphertext", "consequence": "plaintext_recovery" }
}"#,
    );

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.solver.max_depth, 0);
    assert_eq!(scenario.solver.max_restarts, 64);

    let err = scenario.plan(&standard_registry()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AceError>(),
        Some(AceError::RecursionLimit { depth: 0 })
    ));
}

#[test]
fn test_unsupported_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "oracle.toml", PADDING_ORACLE);
    assert!(Scenario::load(&path).is_err());
}

#[test]
fn test_unknown_layer_reference_reports_step() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "broken.yaml",
        r#"
steps:
  - { op: transform, name: source, kind: derivation, algorithm: Plaintext }
  - { op: produce, layer: message, transform: source, wraps: missing }
goal: { layer: message, consequence: plaintext_recovery }
"#,
    );
    let err = Scenario::load(&path)
        .unwrap()
        .plan(&standard_registry())
        .unwrap_err();
    let rendered = format!("{:#}", err);
    assert!(rendered.contains("scenario step 2"));
    assert!(rendered.contains("missing"));
}

#[test]
fn test_catalog_file_replaces_standard_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = write(
        &dir,
        "catalog.yaml",
        r#"
primitives:
  - id: Plaintext
exploits:
  - primitive: Plaintext
    name: read_it
    consequence: plaintext_recovery
"#,
    );
    let scenario = write(
        &dir,
        "plain.yaml",
        r#"
steps:
  - { op: transform, name: source, kind: derivation, algorithm: Plaintext }
  - { op: produce, layer: message, transform: source }
goal: { layer: message, consequence: plaintext_recovery }
"#,
    );

    let registry = load_registry(Some(&catalog)).unwrap();
    assert!(registry.primitive("AES").is_none());

    let plan = Scenario::load(&scenario).unwrap().plan(&registry).unwrap();
    assert_eq!(plan.exploits.len(), 1);
    assert_eq!(plan.exploits[0].name, "read_it");
    assert_eq!(plan.scenario, "unnamed scenario");
}

#[test]
fn test_saved_plan_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "oracle.yaml", PADDING_ORACLE);
    let plan = Scenario::load(&path).unwrap().plan(&standard_registry()).unwrap();

    let out = dir.path().join("plans").join("oracle.yaml");
    save_report(&plan, &out, PlanOutputFormat::Yaml).unwrap();
    let loaded: PlanReport = serde_yaml::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(loaded.fingerprint, plan.fingerprint);
    assert_eq!(loaded.exploits, plan.exploits);
}
