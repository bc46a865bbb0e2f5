//! Module assembly

use std::collections::HashSet;

use solts_common::{Error, Result};
use tracing::debug;

use crate::config::CodegenConfig;
use crate::contract::{create_contract, CONTRACT};
use crate::decoder::create_decode;
use crate::deployer::{create_deploy, create_links, ConstructorArgs};
use crate::encoder::create_encode;
use crate::helpers::{create_call, create_replace, CALL, REPLACE};
use crate::parser::ContractDescriptor;
use crate::provider::{Provider, READABLE};
use crate::signature::normalize;
use crate::syntax::{is_identifier, Declaration, ModuleIr};

/// Top-level names every module declares before its contracts
const MODULE_NAMES: &[&str] = &[READABLE, CALL, REPLACE];

/// Assemble one module holding the shared transport interface and helpers
/// followed by one namespace per contract, in input order
pub fn new_file(contracts: &[ContractDescriptor], config: &CodegenConfig) -> Result<ModuleIr> {
    let provider = Provider::new();

    let mut declarations = vec![
        Declaration::Import {
            names: vec![READABLE.to_string()],
            module: "stream".to_string(),
        },
        provider.create_interface(),
        create_call(&provider),
        create_replace(),
    ];

    let mut seen = HashSet::new();
    for contract in contracts {
        let name = contract.name.as_str();
        if !is_identifier(name) || name == provider.name() || MODULE_NAMES.contains(&name) {
            return Err(Error::InvalidIdentifier(contract.name.clone()));
        }
        if !seen.insert(name) {
            return Err(Error::generic(format!("duplicate contract name '{}'", name)));
        }
        declarations.push(create_namespace(contract, &provider, config)?);
    }

    debug!(contracts = contracts.len(), declarations = declarations.len(), "assembled module");
    Ok(ModuleIr { declarations })
}

/// `export namespace Name { Links?; Deploy; Contract; Encode; Decode }`
pub fn create_namespace(
    contract: &ContractDescriptor,
    provider: &Provider,
    config: &CodegenConfig,
) -> Result<Declaration> {
    let interface = normalize(contract, config.overload_policy)?;
    for signature in &interface.signatures {
        debug!(
            contract = %contract.name,
            signature = %signature.canonical,
            selector = %signature.selector,
            "selector"
        );
    }
    let args = ConstructorArgs::new(interface.constructor)?;

    let mut body = Vec::with_capacity(5);
    if config.emit_links {
        body.extend(create_links(contract));
    }
    body.push(create_deploy(contract, &args, CONTRACT, provider));
    body.push(create_contract(contract, &interface, &args, provider)?);
    body.push(create_encode(&interface.methods, provider)?);
    body.push(create_decode(&interface.methods, provider)?);

    debug!(
        contract = %contract.name,
        methods = interface.methods.len(),
        events = interface.events.len(),
        links = contract.links.len(),
        "generated contract namespace"
    );

    Ok(Declaration::Namespace {
        exported: true,
        name: contract.name.clone(),
        body,
    })
}
