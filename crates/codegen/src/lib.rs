//! ABI-to-TypeScript code generation
//!
//! Turns compiled contract descriptors into a module syntax tree: a shared
//! transport interface plus, per contract, a namespace holding the deploy
//! helper, the contract class and the encode/decode tables. Rendering to text
//! is left to a [`Printer`].

pub mod config;
pub mod contract;
pub mod decoder;
pub mod deployer;
pub mod encoder;
pub mod helpers;
pub mod module;
pub mod parser;
pub mod printer;
pub mod provider;
pub mod selector;
pub mod signature;
pub mod syntax;
pub mod types;


pub use config::{CodegenConfig, OverloadPolicy};
pub use module::new_file;
pub use parser::{AbiParser, ContractDescriptor, Entry, LinkOffset, LinkReference, Param};
pub use printer::{Printer, TypeScriptPrinter};
pub use provider::Provider;
pub use selector::{hash, selector};
pub use signature::{canonical_signature, normalize};
pub use syntax::ModuleIr;

use solts_common::Result;

/// Generate TypeScript source for `contracts` in one pass
pub fn generate(contracts: &[ContractDescriptor], config: &CodegenConfig) -> Result<String> {
    let module = new_file(contracts, config)?;
    Ok(TypeScriptPrinter::new().print(&module))
}
