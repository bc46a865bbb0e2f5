//! Deployment helper and library link table

use solts_common::Result;

use crate::parser::{Constructor, ContractDescriptor};
use crate::provider::{invoke, Provider};
use crate::selector::link_placeholder;
use crate::signature::{canonical_type, parameter_ident};
use crate::syntax::{
    binary, buffer_from, callback, declare_const, ident, method_call, new_promise,
    reject_or_resolve, string, BinaryOp, Declaration, Expr, Parameter,
    Statement, TypeNode,
};
use crate::types::map_param;

pub const DEPLOY: &str = "Deploy";
pub const LINKS: &str = "Links";
pub const LINKER: &str = "linker";

/// Scope used when naming constructor parameters in errors
const CONSTRUCTOR_SCOPE: &str = "constructor";

/// Names bound inside the deploy body
const DEPLOY_LOCALS: &[&str] = &[
    "client", "linker", "bytecode", "data", "payload", "err", "addr", "address", "resolve",
    "reject",
];

/// What a successful deployment resolves to
#[derive(Debug, Clone)]
pub enum DeployTarget {
    /// `new Contract<Tx>(client, address)`
    NewContract { class: String },
    /// `this.withAddress(addr)`
    Rebind { method: String },
}

/// Constructor arguments as seen by generated code
#[derive(Debug, Clone, Default)]
pub struct ConstructorArgs {
    /// Named inputs, exposed as parameters
    pub params: Vec<Parameter>,
    /// Every input in declared order; unnamed ones are `undefined`
    pub args: Vec<Expr>,
    pub types: Vec<String>,
}

impl ConstructorArgs {
    pub fn new(constructor: Option<&Constructor>) -> Result<Self> {
        let mut out = Self::default();
        let Some(constructor) = constructor else {
            return Ok(out);
        };
        for input in &constructor.inputs {
            out.types.push(canonical_type(input));
            if input.is_named() {
                let name = parameter_ident(&input.name, DEPLOY_LOCALS);
                let ty = map_param(input, CONSTRUCTOR_SCOPE)?.to_type_node();
                out.params.push(Parameter::new(name.clone(), ty));
                out.args.push(ident(name));
            } else {
                out.args.push(Expr::Undefined);
            }
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// `Buffer.from(addr).toString("hex").toUpperCase()`
pub fn address_from_bytes(bytes: Expr) -> Expr {
    method_call(
        method_call(buffer_from(bytes), "toString", vec![string("hex")]),
        "toUpperCase",
        Vec::new(),
    )
}

/// `(bytecode: string) => string`
pub fn linker_type() -> TypeNode {
    TypeNode::function(vec![Parameter::new("bytecode", TypeNode::String)], TypeNode::String)
}

/// Statements that link, encode and deploy `bytecode` through `client`
pub fn deploy_body(
    bytecode: &str,
    args: &ConstructorArgs,
    client: Expr,
    target: &DeployTarget,
    provider: &Provider,
) -> Vec<Statement> {
    let mut statements = vec![declare_const(
        "bytecode",
        invoke(LINKER, vec![string(bytecode)]),
    )];

    let data = if args.is_empty() {
        ident("bytecode")
    } else {
        // the constructor has no selector prefix
        binary(
            ident("bytecode"),
            BinaryOp::Plus,
            provider.encode(client.clone(), "", &args.types, args.args.clone()),
        )
    };
    statements.push(declare_const("data", data));
    statements.push(declare_const(
        "payload",
        provider.payload(client.clone(), ident("data"), None),
    ));

    let resolved = match target {
        DeployTarget::NewContract { class } => {
            let before = vec![declare_const("address", address_from_bytes(ident("addr")))];
            let value = Expr::New {
                class: Box::new(ident(class.clone())),
                type_args: vec![provider.type_argument()],
                args: vec![client.clone(), ident("address")],
            };
            reject_or_resolve("err", before, value)
        }
        DeployTarget::Rebind { method } => reject_or_resolve(
            "err",
            Vec::new(),
            method_call(Expr::This, method.clone(), vec![ident("addr")]),
        ),
    };

    let deploy = provider.deploy(
        client,
        ident("payload"),
        callback("err", "addr", vec![resolved]),
    );
    statements.push(Statement::Return(Some(new_promise(vec![Statement::Expr(deploy)]))));
    statements
}

/// `export function Deploy<Tx>(client, linker, ...args): Promise<Contract<Tx>>`
pub fn create_deploy(
    contract: &ContractDescriptor,
    args: &ConstructorArgs,
    class: &str,
    provider: &Provider,
) -> Declaration {
    let mut params = vec![
        Parameter::new("client", provider.type_node()),
        Parameter::new(LINKER, linker_type()),
    ];
    params.extend(args.params.iter().cloned());

    let target = DeployTarget::NewContract { class: class.to_string() };
    Declaration::Function {
        exported: true,
        name: DEPLOY.to_string(),
        type_params: vec![provider.type_param().to_string()],
        params,
        returns: Some(TypeNode::promise(TypeNode::generic(
            class,
            vec![provider.type_argument()],
        ))),
        body: deploy_body(&contract.bytecode, args, ident("client"), &target, provider),
    }
}

/// Placeholder text for each link reference, keyed by `file:Library`
pub fn link_table(contract: &ContractDescriptor) -> Vec<(String, String)> {
    contract
        .links
        .iter()
        .map(|link| {
            let token = link.token();
            let placeholder = link
                .offsets
                .first()
                .and_then(|offset| {
                    let start = offset.start * 2;
                    contract.bytecode.get(start..start + offset.length * 2)
                })
                .map(str::to_string)
                .unwrap_or_else(|| link_placeholder(&token));
            (token, placeholder)
        })
        .collect()
}

/// `export const Links = { "file:Library": "__$...$__" }`, when there is anything to link
pub fn create_links(contract: &ContractDescriptor) -> Option<Declaration> {
    let table = link_table(contract);
    if table.is_empty() {
        return None;
    }
    Some(Declaration::Const {
        exported: true,
        name: LINKS.to_string(),
        init: Expr::Object(table.into_iter().map(|(k, v)| (k, string(v))).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LinkOffset, LinkReference, Param, StateMutability};

    fn constructor(inputs: Vec<Param>) -> Constructor {
        Constructor { inputs, state_mutability: StateMutability::NonPayable }
    }

    #[test]
    fn test_constructor_args_keep_declared_order() {
        let ctor = constructor(vec![Param::new("supply", "uint256"), Param::new("", "address")]);
        let args = ConstructorArgs::new(Some(&ctor)).unwrap();
        assert_eq!(args.params.len(), 1);
        assert_eq!(args.args, vec![ident("supply"), Expr::Undefined]);
        assert_eq!(args.types, vec!["uint256".to_string(), "address".to_string()]);
        assert!(ConstructorArgs::new(None).unwrap().is_empty());
    }

    #[test]
    fn test_deploy_without_constructor_uses_bytecode() {
        let provider = Provider::new();
        let target = DeployTarget::NewContract { class: "Contract".into() };
        let body = deploy_body("6080", &ConstructorArgs::default(), ident("client"), &target, &provider);
        assert_eq!(body[1], declare_const("data", ident("bytecode")));
        assert!(matches!(body.last(), Some(Statement::Return(Some(_)))));
    }

    #[test]
    fn test_link_table_reads_placeholder_from_bytecode() {
        let placeholder = link_placeholder("lib/Math.sol:Math");
        let bytecode = format!("6080{}6000", placeholder);
        let contract = ContractDescriptor::new("C", vec![], bytecode).with_links(vec![
            LinkReference {
                file: "lib/Math.sol".into(),
                library: "Math".into(),
                offsets: vec![LinkOffset { start: 2, length: 20 }],
            },
            LinkReference {
                file: "lib/Strings.sol".into(),
                library: "Strings".into(),
                offsets: vec![LinkOffset { start: 500, length: 20 }],
            },
        ]);
        let table = link_table(&contract);
        assert_eq!(table[0], ("lib/Math.sol:Math".to_string(), placeholder));
        assert_eq!(table[1].1, link_placeholder("lib/Strings.sol:Strings"));
    }

    #[test]
    fn test_no_links_no_table() {
        let contract = ContractDescriptor::new("C", vec![], "6080");
        assert!(create_links(&contract).is_none());
    }
}
