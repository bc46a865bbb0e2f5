//! Argument encoding table

use solts_common::Result;

use crate::provider::Provider;
use crate::signature::{canonical_type, MethodGroup, Overload};
use crate::syntax::{
    all_of, arrow, binary, ident, string, BinaryOp, Declaration, Expr, Parameter, Statement,
};

pub const ENCODE: &str = "Encode";

/// `export const Encode = <Tx>(client: Provider<Tx>) => { return { ... }; }`
pub fn create_encode(methods: &[MethodGroup<'_>], provider: &Provider) -> Result<Declaration> {
    let entries = methods
        .iter()
        .map(|group| Ok((group.ident.clone(), encoder(group, provider)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Declaration::Const {
        exported: true,
        name: ENCODE.to_string(),
        init: Expr::Arrow {
            type_params: vec![provider.type_param().to_string()],
            params: vec![Parameter::new("client", provider.type_node())],
            returns: None,
            body: vec![Statement::Return(Some(Expr::Object(entries)))],
        },
    })
}

/// Encoding closure of one member, dispatching between overloads when grouped
fn encoder(group: &MethodGroup<'_>, provider: &Provider) -> Result<Expr> {
    let params: Vec<Parameter> = group.parameters();

    if !group.is_overloaded() {
        let body = vec![Statement::Return(Some(encode_overload(group, &group.overloads[0], provider)))];
        return Ok(arrow(params, None, body));
    }

    let mut body = Vec::with_capacity(group.overloads.len() + 1);
    for overload in &group.overloads {
        let ret = Statement::Return(Some(encode_overload(group, overload, provider)));
        match dispatch_condition(group, overload)? {
            Some(cond) => body.push(Statement::If {
                cond,
                then: vec![ret],
                otherwise: Vec::new(),
            }),
            None => body.push(ret),
        }
    }
    body.push(Statement::Throw(Expr::New {
        class: Box::new(ident("Error")),
        type_args: Vec::new(),
        args: vec![string(format!(
            "no overload of {} matches the supplied arguments",
            group.name
        ))],
    }));

    Ok(arrow(params, None, body))
}

/// Guards the supplied arguments must pass for `overload` to be chosen
fn dispatch_condition(group: &MethodGroup<'_>, overload: &Overload<'_>) -> Result<Option<Expr>> {
    let mut conditions = Vec::with_capacity(group.params.len());
    for param in &group.params {
        let subject = ident(param.ident.clone());
        conditions.push(match group.overload_type(overload, param)? {
            Some(ty) => ty.guard_expr(subject),
            None => binary(subject, BinaryOp::StrictEq, Expr::Undefined),
        });
    }
    Ok(all_of(conditions))
}

/// `client.encode("SELECTOR", [types], ...args)` with every declared input in
/// order; unnamed inputs are passed as `undefined`
pub fn encode_overload(group: &MethodGroup<'_>, overload: &Overload<'_>, provider: &Provider) -> Expr {
    let inputs = &overload.function.inputs;
    let types: Vec<String> = inputs.iter().map(canonical_type).collect();
    let args = inputs
        .iter()
        .map(|input| {
            group
                .params
                .iter()
                .find(|p| input.is_named() && p.name == input.name)
                .map(|p| ident(p.ident.clone()))
                .unwrap_or(Expr::Undefined)
        })
        .collect();
    provider.encode(ident("client"), &overload.signature.selector, &types, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverloadPolicy;
    use crate::parser::{ContractDescriptor, Entry, Function, Param, StateMutability};
    use crate::signature::normalize;

    fn function(name: &str, inputs: Vec<Param>) -> Entry {
        Entry::Function(Function {
            name: name.to_string(),
            inputs,
            outputs: vec![],
            state_mutability: StateMutability::NonPayable,
        })
    }

    fn table(contract: &ContractDescriptor) -> Vec<(String, Expr)> {
        let interface = normalize(contract, OverloadPolicy::Combine).unwrap();
        match create_encode(&interface.methods, &Provider::new()).unwrap() {
            Declaration::Const { init: Expr::Arrow { body, .. }, .. } => match &body[0] {
                Statement::Return(Some(Expr::Object(entries))) => entries.clone(),
                other => panic!("unexpected body {:?}", other),
            },
            other => panic!("unexpected declaration {:?}", other),
        }
    }

    #[test]
    fn test_unnamed_inputs_forwarded_as_undefined() {
        let contract = ContractDescriptor::new(
            "C",
            vec![function("baz", vec![Param::new("", "uint32"), Param::new("flag", "bool")])],
            "",
        );
        let entries = table(&contract);
        assert_eq!(entries[0].0, "baz");
        match &entries[0].1 {
            Expr::Arrow { params, body, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(params[0].name, "flag");
                match &body[0] {
                    Statement::Return(Some(Expr::Call { args, .. })) => {
                        assert_eq!(args[0], Expr::Str("CDCD77C0".into()));
                        assert_eq!(args[2], Expr::Undefined);
                        assert_eq!(args[3], ident("flag"));
                    }
                    other => panic!("unexpected statement {:?}", other),
                }
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_overloads_dispatch_then_throw() {
        let contract = ContractDescriptor::new(
            "C",
            vec![
                function("set", vec![Param::new("value", "uint256")]),
                function("set", vec![Param::new("value", "string"), Param::new("force", "bool")]),
            ],
            "",
        );
        let entries = table(&contract);
        assert_eq!(entries.len(), 1);
        match &entries[0].1 {
            Expr::Arrow { params, body, .. } => {
                assert!(params[1].optional);
                assert_eq!(body.len(), 3);
                assert!(matches!(body[0], Statement::If { .. }));
                assert!(matches!(body[1], Statement::If { .. }));
                assert!(matches!(body[2], Statement::Throw(_)));
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }
}
