#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const EXE: &str = env!("CARGO_BIN_EXE_swagger-axios-gen");

fn write_petstore(dir: &Path) -> std::path::PathBuf {
    let doc = json!({
        "swagger": "2.0",
        "paths": {
            "/pets/{id}": {
                "get": {
                    "tags": ["pets"],
                    "operationId": "getPetUsingGET",
                    "parameters": [{ "name": "id", "in": "path", "type": "integer" }]
                }
            },
            "/orders": {
                "post": { "tags": ["store"], "operationId": "placeOrderUsingPOST" }
            }
        }
    });
    let path = dir.join("swagger.json");
    fs::write(&path, doc.to_string()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(EXE)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SWAGGEN_SOURCE")
        .env_remove("SWAGGEN_PASSWORD")
        .env_remove("SWAGGEN_TOKEN")
        .env_remove("SWAGGEN_API_KEY")
        .output()
        .expect("failed to run swagger-axios-gen")
}

#[test]
fn test_cli_generate_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_petstore(dir.path());
    let out = dir.path().join("src/api");

    let output = run(&[
        "generate",
        "--source",
        doc.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated 2 tag(s), 2 function(s)"));
    assert!(stdout.contains("pets.custom.js (created)"));
    assert!(out.join("pets.generated.js").is_file());
    assert!(out.join("store.custom.js").is_file());

    let output = run(&[
        "generate",
        "--source",
        doc.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pets.custom.js (kept)"));
}

#[test]
fn test_cli_typescript_and_clean() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_petstore(dir.path());
    let out = dir.path().join("api");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("old.generated.js"), "// stale").unwrap();
    fs::write(out.join("old.custom.js"), "// mine").unwrap();

    let output = run(&[
        "generate",
        "-s",
        doc.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--clean",
        "--typescript",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!out.join("old.generated.js").exists());
    assert!(out.join("old.custom.js").exists());

    let pets = fs::read_to_string(out.join("pets.generated.ts")).unwrap();
    assert!(pets.contains("export function getPet(id: number) {"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Removed 1 stale generated file(s)"));
}

#[test]
fn test_cli_inspect_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_petstore(dir.path());

    let output = Command::new(EXE)
        .current_dir(dir.path())
        .args(["inspect", "--source", doc.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pets -> pets.generated.js"));
    assert!(stdout.contains("GET     /pets/{id} -> getPet(id)"));
    assert!(stdout.contains("POST    /orders -> placeOrder(data)"));
    assert!(!dir.path().join("api").exists());
}

#[test]
fn test_cli_missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let output = run(&[
        "generate",
        "--source",
        missing.to_str().unwrap(),
        "--output",
        dir.path().join("api").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to generate clients from"));
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_cli_rejects_incomplete_auth() {
    let output = run(&[
        "inspect",
        "--source",
        "http://127.0.0.1:9/docs",
        "--auth-type",
        "basic",
        "--username",
        "ada",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--password"));
}
