//! Module-level helper functions shared by every contract

use crate::provider::{invoke, Provider};
use crate::syntax::{
    callback, declare_const, ident, method_call, new_promise, reject_or_resolve, string,
    Declaration, Expr, Parameter, Statement, TypeNode,
};

pub const CALL: &str = "Call";
pub const REPLACE: &str = "Replace";

/// Hex characters of an address substituted into bytecode
const ADDRESS_WIDTH: u64 = 40;

/// `Call<Tx, Output>(client, addr, data, callback): Promise<Output>`
///
/// Builds the payload for `addr`, performs the call and maps the raw result
/// through `callback`.
pub fn create_call(provider: &Provider) -> Declaration {
    let output = TypeNode::reference("Output");
    let exec_callback = TypeNode::function(
        vec![Parameter::new("exec", TypeNode::reference("Uint8Array"))],
        output.clone(),
    );

    let body = vec![
        declare_const(
            "payload",
            provider.payload(ident("client"), ident("data"), Some(ident("addr"))),
        ),
        Statement::Return(Some(new_promise(vec![Statement::Expr(provider.call(
            ident("client"),
            ident("payload"),
            callback(
                "err",
                "exec",
                vec![reject_or_resolve(
                    "err",
                    Vec::new(),
                    invoke("callback", vec![ident("exec")]),
                )],
            ),
        ))]))),
    ];

    Declaration::Function {
        exported: true,
        name: CALL.to_string(),
        type_params: vec![provider.type_param().to_string(), "Output".to_string()],
        params: vec![
            Parameter::new("client", provider.type_node()),
            Parameter::new("addr", TypeNode::String),
            Parameter::new("data", TypeNode::String),
            Parameter::new("callback", exec_callback),
        ],
        returns: Some(TypeNode::promise(output)),
        body,
    }
}

/// `Replace(bytecode, placeholder, address): string`
///
/// Substitutes a library address, right-padded to 40 hex characters, for
/// every occurrence of a link placeholder.
pub fn create_replace() -> Declaration {
    let padded = method_call(
        ident("address"),
        "padEnd",
        vec![Expr::Number(ADDRESS_WIDTH), string("0")],
    );
    let replaced = method_call(
        method_call(ident("bytecode"), "split", vec![ident("placeholder")]),
        "join",
        vec![padded],
    );

    Declaration::Function {
        exported: true,
        name: REPLACE.to_string(),
        type_params: Vec::new(),
        params: vec![
            Parameter::new("bytecode", TypeNode::String),
            Parameter::new("placeholder", TypeNode::String),
            Parameter::new("address", TypeNode::String),
        ],
        returns: Some(TypeNode::String),
        body: vec![Statement::Return(Some(replaced))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_helper_signature() {
        let provider = Provider::new();
        match create_call(&provider) {
            Declaration::Function { name, type_params, params, returns, .. } => {
                assert_eq!(name, "Call");
                assert_eq!(type_params, vec!["Tx".to_string(), "Output".to_string()]);
                assert_eq!(params.len(), 4);
                assert_eq!(params[0].ty, Some(provider.type_node()));
                assert_eq!(returns, Some(TypeNode::promise(TypeNode::reference("Output"))));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_helper_returns_string() {
        match create_replace() {
            Declaration::Function { name, returns, body, .. } => {
                assert_eq!(name, "Replace");
                assert_eq!(returns, Some(TypeNode::String));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }
}
