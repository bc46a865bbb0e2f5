//! Contract class builder

use solts_common::Result;

use crate::decoder::{output_type, DECODE};
use crate::deployer::{
    address_from_bytes, deploy_body, linker_type, ConstructorArgs, DeployTarget, LINKER,
};
use crate::encoder::ENCODE;
use crate::helpers::CALL;
use crate::parser::ContractDescriptor;
use crate::provider::{error_callback, Provider, READABLE};
use crate::signature::{EventBinding, Interface, MethodGroup};
use crate::syntax::{
    access_this, arrow, assign, call, call_generic, declare_const, ident, method_call, string,
    ClassMember, Declaration, Expr, Parameter, Statement, TypeNode, Visibility,
};

pub const CONTRACT: &str = "Contract";

const CLIENT: &str = "client";
const ADDRESS: &str = "address";
const WITH_ADDRESS: &str = "withAddress";
const GET_ADDRESS: &str = "getAddress";
const DEPLOY: &str = "deploy";

/// `export class Contract<Tx> { ... }`
///
/// An instance constructed without an address is unbound until `deploy`
/// resolves and rebinds it.
pub fn create_contract(
    contract: &ContractDescriptor,
    interface: &Interface<'_>,
    args: &ConstructorArgs,
    provider: &Provider,
) -> Result<Declaration> {
    let class_type = TypeNode::generic(CONTRACT, vec![provider.type_argument()]);

    let mut members = vec![
        ClassMember::Property {
            visibility: Visibility::Private,
            name: CLIENT.to_string(),
            ty: provider.type_node(),
        },
        ClassMember::Property {
            visibility: Visibility::Private,
            name: ADDRESS.to_string(),
            ty: TypeNode::String,
        },
        ClassMember::Constructor {
            params: vec![
                Parameter::new(CLIENT, provider.type_node()),
                Parameter::new(ADDRESS, TypeNode::String).with_default(string("")),
            ],
            body: vec![
                assign(access_this(CLIENT), ident(CLIENT)),
                assign(access_this(ADDRESS), ident(ADDRESS)),
            ],
        },
        ClassMember::Method {
            visibility: Visibility::Private,
            name: WITH_ADDRESS.to_string(),
            params: vec![Parameter::new("addr", TypeNode::reference("Uint8Array"))],
            returns: Some(class_type.clone()),
            body: vec![
                assign(access_this(ADDRESS), address_from_bytes(ident("addr"))),
                Statement::Return(Some(Expr::This)),
            ],
        },
        ClassMember::Method {
            visibility: Visibility::Public,
            name: GET_ADDRESS.to_string(),
            params: Vec::new(),
            returns: Some(TypeNode::String),
            body: vec![Statement::Return(Some(access_this(ADDRESS)))],
        },
        deploy_method(contract, args, class_type, provider),
    ];

    for group in &interface.methods {
        members.push(function_method(group, provider)?);
    }
    for event in &interface.events {
        members.push(event_method(event, provider));
    }

    Ok(Declaration::Class {
        exported: true,
        name: CONTRACT.to_string(),
        type_params: vec![provider.type_param().to_string()],
        members,
    })
}

fn deploy_method(
    contract: &ContractDescriptor,
    args: &ConstructorArgs,
    class_type: TypeNode,
    provider: &Provider,
) -> ClassMember {
    let mut params = vec![Parameter::new(LINKER, linker_type())];
    params.extend(args.params.iter().cloned());

    let target = DeployTarget::Rebind { method: WITH_ADDRESS.to_string() };
    ClassMember::Method {
        visibility: Visibility::Public,
        name: DEPLOY.to_string(),
        params,
        returns: Some(TypeNode::promise(class_type)),
        body: deploy_body(&contract.bytecode, args, access_this(CLIENT), &target, provider),
    }
}

/// `const data = Encode(this.client).f(...); return Call<Tx, Out>(...);`
fn function_method(group: &MethodGroup<'_>, provider: &Provider) -> Result<ClassMember> {
    let output = output_type(group.outputs(), &group.name)?;
    let args: Vec<Expr> = group.params.iter().map(|p| ident(p.ident.clone())).collect();

    let encode = method_call(call(ident(ENCODE), vec![access_this(CLIENT)]), group.ident.clone(), args);
    let decode = method_call(
        call(ident(DECODE), vec![access_this(CLIENT), ident("exec")]),
        group.ident.clone(),
        Vec::new(),
    );
    let on_result = arrow(
        vec![Parameter::new("exec", TypeNode::reference("Uint8Array"))],
        None,
        vec![Statement::Return(Some(decode))],
    );
    let invoke = call_generic(
        ident(CALL),
        vec![provider.type_argument(), output.clone()],
        vec![access_this(CLIENT), access_this(ADDRESS), ident("data"), on_result],
    );

    Ok(ClassMember::Method {
        visibility: Visibility::Public,
        name: group.ident.clone(),
        params: group.parameters(),
        returns: Some(TypeNode::promise(output)),
        body: vec![declare_const("data", encode), Statement::Return(Some(invoke))],
    })
}

/// `return this.client.listen("SELECTOR", this.address, callback);`
fn event_method(event: &EventBinding<'_>, provider: &Provider) -> ClassMember {
    let listen = provider.listen(
        access_this(CLIENT),
        &event.signature.selector,
        access_this(ADDRESS),
        ident("callback"),
    );
    ClassMember::Method {
        visibility: Visibility::Public,
        name: event.ident.clone(),
        params: vec![Parameter::new("callback", error_callback("event", TypeNode::Any))],
        returns: Some(TypeNode::reference(READABLE)),
        body: vec![Statement::Return(Some(listen))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverloadPolicy;
    use crate::parser::AbiParser;
    use crate::signature::normalize;

    const STORAGE_ABI: &str = r#"[
        {"type": "constructor", "inputs": [{"name": "initial", "type": "uint256"}]},
        {"type": "function", "name": "get", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
        {"type": "event", "name": "Changed", "inputs": [{"name": "value", "type": "uint256", "indexed": false}], "anonymous": false}
    ]"#;

    fn members() -> Vec<ClassMember> {
        let abi = AbiParser::new().parse_content(STORAGE_ABI).unwrap();
        let contract = ContractDescriptor::new("Storage", abi, "6080");
        let interface = normalize(&contract, OverloadPolicy::Combine).unwrap();
        let args = ConstructorArgs::new(interface.constructor).unwrap();
        match create_contract(&contract, &interface, &args, &Provider::new()).unwrap() {
            Declaration::Class { members, .. } => members,
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_member_layout() {
        let names: Vec<String> = members().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["client", "address", "constructor", "withAddress", "getAddress", "deploy", "get", "Changed"]
        );
    }

    #[test]
    fn test_address_is_private_and_optional() {
        let members = members();
        assert!(matches!(
            &members[1],
            ClassMember::Property { visibility: Visibility::Private, .. }
        ));
        match &members[2] {
            ClassMember::Constructor { params, .. } => {
                assert_eq!(params[1].default, Some(string("")));
            }
            other => panic!("expected constructor, got {:?}", other),
        }
    }

    #[test]
    fn test_deploy_method_takes_constructor_arguments() {
        match &members()[5] {
            ClassMember::Method { params, returns, .. } => {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["linker", "initial"]);
                assert_eq!(
                    returns,
                    &Some(TypeNode::promise(TypeNode::generic("Contract", vec![TypeNode::reference("Tx")])))
                );
            }
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_event_method_returns_stream() {
        match &members()[7] {
            ClassMember::Method { params, returns, .. } => {
                assert_eq!(params[0].name, "callback");
                assert_eq!(returns, &Some(TypeNode::reference("Readable")));
            }
            other => panic!("expected method, got {:?}", other),
        }
    }
}
