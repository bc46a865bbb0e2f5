//! Compiler collaborator tests against a scripted compiler

use std::sync::Mutex;

use async_trait::async_trait;
use solts_codegen::{generate, CodegenConfig, Entry};
use solts_common::{Error, Result};
use solts_compiler::{
    compile_contracts, tokenize_links, Compiler, InputDescription, LinkTable, OutputDescription,
};
use tempfile::TempDir;

/// Returns a canned response and records the request it was given
struct ScriptedCompiler {
    response: String,
    seen: Mutex<Vec<InputDescription>>,
}

impl ScriptedCompiler {
    fn new(response: &str) -> Self {
        Self { response: response.to_string(), seen: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Compiler for ScriptedCompiler {
    async fn compile(&self, input: &InputDescription) -> Result<OutputDescription> {
        self.seen.lock().unwrap().push(input.clone());
        Ok(serde_json::from_str(&self.response)?)
    }
}

const STORAGE_SOURCE: &str = "pragma solidity ^0.8.0; contract Storage { uint256 value; }";

const SUCCESS: &str = r#"{
  "errors": [
    {"severity": "warning", "message": "Unused variable", "formattedMessage": "Storage.sol:1:1: Warning: Unused variable"}
  ],
  "contracts": {
    "Storage.sol": {
      "Storage": {
        "abi": [
          {"type": "constructor", "inputs": [{"name": "initial", "type": "uint256"}]},
          {"type": "function", "name": "get", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"}
        ],
        "evm": {"bytecode": {"object": "608060405234801561001057600080fd5b50", "linkReferences": {}}}
      },
      "Math": {
        "abi": [],
        "evm": {"bytecode": {"object": "6080", "linkReferences": {}}}
      }
    },
    "Other.sol": {
      "Other": {"abi": [], "evm": {"bytecode": {"object": "00"}}}
    }
  }
}"#;

#[tokio::test]
async fn test_compile_contracts_sorted_by_name() -> Result<()> {
    let compiler = ScriptedCompiler::new(SUCCESS);
    let contracts = compile_contracts(&compiler, "Storage.sol", STORAGE_SOURCE).await?;

    let names: Vec<&str> = contracts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Math", "Storage"]);

    let storage = &contracts[1];
    assert_eq!(storage.bytecode, "608060405234801561001057600080fd5b50");
    assert!(matches!(storage.abi[0], Entry::Constructor(_)));
    assert_eq!(storage.abi.len(), 2);

    let seen = compiler.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].sources["Storage.sol"].content, STORAGE_SOURCE);
    Ok(())
}

#[tokio::test]
async fn test_compilation_errors_are_aggregated() -> Result<()> {
    let failure = r#"{
      "errors": [
        {"severity": "error", "message": "Expected ';'", "formattedMessage": "Storage.sol:1:10: ParserError: Expected ';'\n"},
        {"severity": "warning", "message": "Shadowing"},
        {"severity": "error", "message": "Undeclared identifier"}
      ]
    }"#;
    let compiler = ScriptedCompiler::new(failure);
    match compile_contracts(&compiler, "Storage.sol", STORAGE_SOURCE).await {
        Err(Error::Compilation(message)) => {
            assert_eq!(
                message,
                "Storage.sol:1:10: ParserError: Expected ';'\nUndeclared identifier"
            );
        }
        other => panic!("expected compilation error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_file_yields_no_contracts() -> Result<()> {
    let compiler = ScriptedCompiler::new(r#"{"contracts": {}}"#);
    let contracts = compile_contracts(&compiler, "Empty.sol", "").await?;
    assert!(contracts.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_link_references_carried_into_descriptors() -> Result<()> {
    let linked = r#"{
      "contracts": {
        "Calc.sol": {
          "Calc": {
            "abi": [],
            "evm": {"bytecode": {
              "object": "6080__$0123456789abcdef0123456789abcdef01$__6000",
              "linkReferences": {
                "lib/Math.sol": {"Math": [{"start": 2, "length": 20}]},
                "lib/Arith.sol": {"Arith": [{"start": 40, "length": 20}], "Bits": [{"start": 60, "length": 20}]}
              }
            }}
          }
        }
      }
    }"#;
    let compiler = ScriptedCompiler::new(linked);
    let contracts = compile_contracts(&compiler, "Calc.sol", "").await?;
    let tokens: Vec<String> = contracts[0].links.iter().map(|l| l.token()).collect();
    assert_eq!(tokens, vec!["lib/Arith.sol:Arith", "lib/Arith.sol:Bits", "lib/Math.sol:Math"]);

    let source = generate(&contracts, &CodegenConfig::default())?;
    assert!(source.contains(
        "\"lib/Math.sol:Math\": \"__$0123456789abcdef0123456789abcdef01$__\","
    ));
    Ok(())
}

#[test]
fn test_tokenize_links() {
    let table: LinkTable = serde_json::from_str(
        r#"{"b.sol": {"Lib": []}, "a.sol": {"Z": [], "A": []}}"#,
    )
    .unwrap();
    assert_eq!(tokenize_links(&table), vec!["a.sol:A", "a.sol:Z", "b.sol:Lib"]);
}

#[tokio::test]
async fn test_input_from_files() -> Result<()> {
    let dir = TempDir::new()?;
    let first = dir.path().join("A.sol");
    let second = dir.path().join("B.sol");
    tokio::fs::write(&first, "contract A {}").await?;
    tokio::fs::write(&second, "contract B {}").await?;

    let input = InputDescription::from_files(&[&first, &second]).await?;
    assert_eq!(input.sources.len(), 2);
    let key = first.to_string_lossy().to_string();
    assert_eq!(input.sources[&key].content, "contract A {}");
    assert_eq!(input.settings.output_selection[&key]["*"], vec!["*".to_string()]);
    Ok(())
}
