//! Command line tests against a stand-in compiler script
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Writes an executable that swallows its request and prints `response`
fn fake_solc(dir: &Path, response: &str) -> std::path::PathBuf {
    let path = dir.join("solc");
    let script = format!("#!/bin/sh\ncat > /dev/null\ncat <<'EOF'\n{}\nEOF\n", response);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_generate_command() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("Storage.sol");
    fs::write(&source, "contract Storage {}").unwrap();

    let response = format!(
        r#"{{"contracts": {{"{}": {{"Storage": {{
            "abi": [{{"type": "function", "name": "get", "inputs": [], "outputs": [{{"name": "", "type": "uint256"}}], "stateMutability": "view"}}],
            "evm": {{"bytecode": {{"object": "6080", "linkReferences": {{}}}}}}
        }}}}}}}}"#,
        source.display()
    );
    let solc = fake_solc(dir.path(), &response);
    let destination = dir.path().join("Storage.abi.ts");

    let status = Command::new(env!("CARGO_BIN_EXE_solts"))
        .arg("generate")
        .arg(&source)
        .arg(&destination)
        .arg("--solc")
        .arg(&solc)
        .env_remove("RUST_LOG")
        .status()
        .unwrap();
    assert!(status.success());

    let generated = fs::read_to_string(&destination).unwrap();
    assert!(generated.starts_with("import { Readable } from \"stream\";\n"));
    assert!(generated.contains("export namespace Storage {"));
    assert!(generated.contains("const bytecode = linker(\"6080\");"));
    assert!(generated.contains("get(): Promise<[number]> {"));

    let output = Command::new(env!("CARGO_BIN_EXE_solts"))
        .arg("generate")
        .arg(dir.path().join("Missing.sol"))
        .arg("--solc")
        .arg(&solc)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read source file"));
}
