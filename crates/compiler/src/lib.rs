//! Compiler collaborator
//!
//! Drives a Solidity compiler over the standard-JSON protocol and turns its
//! output into [`ContractDescriptor`]s for code generation.

pub mod description;
pub mod solc;

pub use description::{
    Bytecode, CompiledContract, Diagnostic, Evm, InputDescription, LinkTable, OutputDescription,
    Source,
};
pub use solc::{Compiler, Solc};

use solts_codegen::{AbiParser, ContractDescriptor, LinkReference};
use solts_common::{Error, Result};
use tracing::{debug, warn};

/// Compile one source file and describe each contract it declares, by name
pub async fn compile_contracts<C>(
    compiler: &C,
    file: &str,
    source: &str,
) -> Result<Vec<ContractDescriptor>>
where
    C: Compiler + ?Sized,
{
    let input = InputDescription::from_source(file, source);
    let output = compiler.compile(&input).await?;
    contracts_from_output(file, &output)
}

/// Describe the contracts of `file`, failing on any error diagnostic
pub fn contracts_from_output(
    file: &str,
    output: &OutputDescription,
) -> Result<Vec<ContractDescriptor>> {
    let mut errors = Vec::new();
    for diagnostic in &output.errors {
        if diagnostic.is_error() {
            errors.push(diagnostic.text());
        } else {
            warn!(severity = %diagnostic.severity, "{}", diagnostic.text().trim_end());
        }
    }
    if !errors.is_empty() {
        return Err(Error::compilation(errors));
    }

    let Some(contracts) = output.contracts.get(file) else {
        warn!(file, "compiler produced no contracts");
        return Ok(Vec::new());
    };

    let parser = AbiParser::new();
    let mut descriptors = Vec::with_capacity(contracts.len());
    for (name, compiled) in contracts {
        let abi = parser.parse_value(&compiled.abi)?;
        let bytecode = &compiled.evm.bytecode;
        let links = link_references(&bytecode.link_references);
        debug!(contract = %name, entries = abi.len(), links = links.len(), "compiled contract");
        descriptors.push(
            ContractDescriptor::new(name.clone(), abi, bytecode.object.clone()).with_links(links),
        );
    }
    Ok(descriptors)
}

/// Link references in `file:Library` order
pub fn link_references(table: &LinkTable) -> Vec<LinkReference> {
    table
        .iter()
        .flat_map(|(file, libraries)| {
            libraries.iter().map(move |(library, offsets)| LinkReference {
                file: file.clone(),
                library: library.clone(),
                offsets: offsets.clone(),
            })
        })
        .collect()
}

/// Flatten a link table into sorted `file:Library` tokens
pub fn tokenize_links(table: &LinkTable) -> Vec<String> {
    link_references(table).iter().map(LinkReference::token).collect()
}
