//! Standard-JSON compiler input and output models

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use solts_codegen::LinkOffset;
use solts_common::Result;

/// `file -> library -> placeholder offsets`
pub type LinkTable = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// Compiler request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescription {
    pub language: String,
    pub sources: BTreeMap<String, Source>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// `file -> contract -> outputs`
    #[serde(rename = "outputSelection")]
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for InputDescription {
    fn default() -> Self {
        Self {
            language: "Solidity".to_string(),
            sources: BTreeMap::new(),
            settings: Settings::default(),
        }
    }
}

impl InputDescription {
    /// Request every output of every contract in a single source
    pub fn from_source<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        let mut input = Self::default();
        input.add_source(name, content);
        input
    }

    /// Read and add each file, keyed by its path
    pub async fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut input = Self::default();
        for path in paths {
            let path = path.as_ref();
            let content = tokio::fs::read_to_string(path).await?;
            input.add_source(path.to_string_lossy(), content);
        }
        Ok(input)
    }

    pub fn add_source<N: Into<String>, C: Into<String>>(&mut self, name: N, content: C) {
        let name = name.into();
        let all = BTreeMap::from([("*".to_string(), vec!["*".to_string()])]);
        self.settings.output_selection.insert(name.clone(), all);
        self.sources.insert(name, Source { content: content.into() });
    }
}

/// Compiler response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDescription {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    /// `file -> contract name -> artifacts`
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, CompiledContract>>,
}

/// Error or warning reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: String,
    pub message: String,
    #[serde(rename = "formattedMessage", default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }

    /// Formatted message when available, the bare message otherwise
    pub fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledContract {
    #[serde(default = "empty_abi")]
    pub abi: Value,
    #[serde(default)]
    pub evm: Evm,
}

fn empty_abi() -> Value {
    Value::Array(Vec::new())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evm {
    #[serde(default)]
    pub bytecode: Bytecode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytecode {
    /// Hex without prefix; may contain link placeholders
    #[serde(default)]
    pub object: String,
    #[serde(rename = "linkReferences", default)]
    pub link_references: LinkTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_selects_everything() {
        let input = InputDescription::from_source("Token.sol", "contract Token {}");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["language"], "Solidity");
        assert_eq!(json["sources"]["Token.sol"]["content"], "contract Token {}");
        assert_eq!(json["settings"]["outputSelection"]["Token.sol"]["*"][0], "*");
    }

    #[test]
    fn test_output_defaults() {
        let output: OutputDescription = serde_json::from_str(
            r#"{"contracts": {"A.sol": {"A": {"evm": {"bytecode": {"object": "6080"}}}}}}"#,
        )
        .unwrap();
        assert!(output.errors.is_empty());
        let compiled = &output.contracts["A.sol"]["A"];
        assert_eq!(compiled.abi, Value::Array(vec![]));
        assert_eq!(compiled.evm.bytecode.object, "6080");
        assert!(compiled.evm.bytecode.link_references.is_empty());
    }

    #[test]
    fn test_diagnostic_prefers_formatted_message() {
        let diagnostic = Diagnostic {
            severity: "error".into(),
            message: "bad".into(),
            formatted_message: Some("A.sol:1:1: bad".into()),
            kind: Some("ParserError".into()),
        };
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.text(), "A.sol:1:1: bad");
    }
}
