//! Solidity ABI parser
//!
//! Parses contract ABI JSON into the entry model consumed by the generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use solts_common::{Error, Result};
use tracing::warn;

/// State mutability of a function or constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    fn from_abi(value: &Value) -> Self {
        match value.get("stateMutability").and_then(|v| v.as_str()) {
            Some("pure") => StateMutability::Pure,
            Some("view") => StateMutability::View,
            Some("payable") => StateMutability::Payable,
            Some(_) => StateMutability::NonPayable,
            None => {
                // Legacy support
                if value.get("constant").and_then(|v| v.as_bool()).unwrap_or(false) {
                    StateMutability::View
                } else if value.get("payable").and_then(|v| v.as_bool()).unwrap_or(false) {
                    StateMutability::Payable
                } else {
                    StateMutability::NonPayable
                }
            }
        }
    }
}

/// ABI parameter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, possibly empty
    pub name: String,
    /// Raw type string (e.g. uint256, address[], tuple)
    pub kind: String,
    /// Internal type (for structs and custom types)
    pub internal_type: Option<String>,
    /// Components, present only for tuples
    pub components: Option<Vec<Param>>,
    /// Indexed flag, present only on event inputs
    pub indexed: Option<bool>,
}

impl Param {
    pub fn new<N: Into<String>, K: Into<String>>(name: N, kind: K) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            internal_type: None,
            components: None,
            indexed: None,
        }
    }

    pub fn with_components(mut self, components: Vec<Param>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// ABI function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name, empty for the fallback function
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

/// ABI event definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

/// ABI constructor definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

/// One item of a contract interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    Function(Function),
    Event(Event),
    Constructor(Constructor),
}

impl Entry {
    /// Declared name; the constructor never carries one
    pub fn name(&self) -> &str {
        match self {
            Entry::Function(f) => &f.name,
            Entry::Event(e) => &e.name,
            Entry::Constructor(_) => "",
        }
    }

    pub fn inputs(&self) -> &[Param] {
        match self {
            Entry::Function(f) => &f.inputs,
            Entry::Event(e) => &e.inputs,
            Entry::Constructor(c) => &c.inputs,
        }
    }
}

/// Byte range of a link placeholder inside the bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

/// Library whose address must be substituted into the bytecode before deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Source file declaring the library
    pub file: String,
    /// Library name
    pub library: String,
    /// Placeholder locations in bytes
    pub offsets: Vec<LinkOffset>,
}

impl LinkReference {
    /// Fully qualified `file:Library` token
    pub fn token(&self) -> String {
        format!("{}:{}", self.file, self.library)
    }
}

/// A compiled contract ready for generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    /// Contract name, used as the generated namespace
    pub name: String,
    pub abi: Vec<Entry>,
    /// Deployable bytecode as hex, without prefix
    pub bytecode: String,
    pub links: Vec<LinkReference>,
}

impl ContractDescriptor {
    pub fn new<N: Into<String>, B: Into<String>>(name: N, abi: Vec<Entry>, bytecode: B) -> Self {
        Self {
            name: name.into(),
            abi,
            bytecode: bytecode.into(),
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: Vec<LinkReference>) -> Self {
        self.links = links;
        self
    }
}

/// Solidity ABI parser
pub struct AbiParser;

impl AbiParser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self
    }

    /// Parse ABI entries from JSON content
    pub fn parse_content(&self, content: &str) -> Result<Vec<Entry>> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::parse(format!("invalid ABI JSON: {}", e)))?;
        self.parse_value(&value)
    }

    /// Parse ABI entries from a JSON value
    pub fn parse_value(&self, value: &Value) -> Result<Vec<Entry>> {
        let abi_array = value
            .as_array()
            .ok_or_else(|| Error::parse("ABI must be an array"))?;

        let mut entries = Vec::with_capacity(abi_array.len());
        for item in abi_array {
            let item_type = item
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("function");

            match item_type {
                "function" => entries.push(Entry::Function(self.parse_function(item)?)),
                "fallback" | "receive" => entries.push(Entry::Function(Function {
                    name: String::new(),
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                    state_mutability: StateMutability::from_abi(item),
                })),
                "event" => entries.push(Entry::Event(self.parse_event(item)?)),
                "constructor" => entries.push(Entry::Constructor(Constructor {
                    inputs: Self::parse_parameters(item.get("inputs"))?,
                    state_mutability: StateMutability::from_abi(item),
                })),
                other => {
                    let name = item.get("name").and_then(|v| v.as_str()).unwrap_or("");
                    warn!(kind = other, name, "skipping unsupported ABI entry");
                }
            }
        }

        Ok(entries)
    }

    fn parse_function(&self, value: &Value) -> Result<Function> {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(Function {
            name,
            inputs: Self::parse_parameters(value.get("inputs"))?,
            outputs: Self::parse_parameters(value.get("outputs"))?,
            state_mutability: StateMutability::from_abi(value),
        })
    }

    fn parse_event(&self, value: &Value) -> Result<Event> {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::parse("event must have a name"))?
            .to_string();

        let anonymous = value
            .get("anonymous")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Event {
            name,
            inputs: Self::parse_parameters(value.get("inputs"))?,
            anonymous,
        })
    }

    fn parse_parameters(value: Option<&Value>) -> Result<Vec<Param>> {
        let array = match value {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(v) => v
                .as_array()
                .ok_or_else(|| Error::parse("parameter list must be an array"))?,
        };

        array.iter().map(Self::parse_parameter).collect()
    }

    fn parse_parameter(param: &Value) -> Result<Param> {
        let name = param
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let kind = param
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::parse(format!("parameter '{}' must have a type", name)))?
            .to_string();

        let internal_type = param
            .get("internalType")
            .and_then(|v| v.as_str())
            .map(String::from);

        let components = if kind.starts_with("tuple") {
            Some(Self::parse_parameters(param.get("components"))?)
        } else {
            None
        };

        let indexed = param.get("indexed").and_then(|v| v.as_bool());

        Ok(Param {
            name,
            kind,
            internal_type,
            components,
            indexed,
        })
    }
}

impl Default for AbiParser {
    fn default() -> Self {
        Self::new()
    }
}
