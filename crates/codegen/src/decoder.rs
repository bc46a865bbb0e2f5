//! Result decoding table

use solts_common::Result;

use crate::parser::Param;
use crate::provider::Provider;
use crate::signature::{canonical_type, parameter_ident, MethodGroup, PARAMETER_LOCALS};
use crate::syntax::{
    arrow, ident, Binding, Declaration, Expr, Parameter,
    PropertySignature, Statement, TypeNode,
};
use crate::types::map_param;

pub const DECODE: &str = "Decode";

/// Outputs decode to an object only when every one of them is named
fn all_named(outputs: &[Param]) -> bool {
    !outputs.is_empty() && outputs.iter().all(Param::is_named)
}

/// Declared result type of a call: `void`, an object keyed by output name,
/// or a positional tuple
pub fn output_type(outputs: &[Param], scope: &str) -> Result<TypeNode> {
    if outputs.is_empty() {
        return Ok(TypeNode::Void);
    }
    if all_named(outputs) {
        let fields = outputs
            .iter()
            .map(|out| {
                Ok(PropertySignature {
                    name: out.name.clone(),
                    ty: map_param(out, scope)?.to_type_node(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(TypeNode::Object(fields));
    }
    outputs
        .iter()
        .map(|out| Ok(map_param(out, scope)?.to_type_node()))
        .collect::<Result<Vec<_>>>()
        .map(TypeNode::Tuple)
}

/// `export const Decode = <Tx>(client: Provider<Tx>, data: Uint8Array) => { return { ... }; }`
pub fn create_decode(methods: &[MethodGroup<'_>], provider: &Provider) -> Result<Declaration> {
    let entries = methods
        .iter()
        .map(|group| Ok((group.ident.clone(), decoder(group, provider)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Declaration::Const {
        exported: true,
        name: DECODE.to_string(),
        init: Expr::Arrow {
            type_params: vec![provider.type_param().to_string()],
            params: vec![
                Parameter::new("client", provider.type_node()),
                Parameter::new("data", TypeNode::reference("Uint8Array")),
            ],
            returns: None,
            body: vec![Statement::Return(Some(Expr::Object(entries)))],
        },
    })
}

fn decoder(group: &MethodGroup<'_>, provider: &Provider) -> Result<Expr> {
    let outputs = group.outputs();
    let returns = output_type(outputs, &group.name)?;

    let types: Vec<String> = outputs.iter().map(canonical_type).collect();
    let decoded = provider.decode(ident("client"), ident("data"), &types);

    let body = if outputs.is_empty() {
        vec![Statement::Return(None)]
    } else if all_named(outputs) {
        let names: Vec<String> = outputs
            .iter()
            .map(|out| parameter_ident(&out.name, PARAMETER_LOCALS))
            .collect();
        let fields = outputs
            .iter()
            .zip(&names)
            .map(|(out, local)| (out.name.clone(), ident(local.clone())))
            .collect();
        vec![
            Statement::Const {
                binding: Binding::Array(names),
                init: decoded,
            },
            Statement::Return(Some(Expr::Object(fields))),
        ]
    } else {
        vec![Statement::Return(Some(decoded))]
    };

    Ok(arrow(Vec::new(), Some(returns), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_outputs_is_void() {
        assert_eq!(output_type(&[], "f").unwrap(), TypeNode::Void);
    }

    #[test]
    fn test_named_outputs_form_object() {
        let outputs = vec![Param::new("reserve", "uint112"), Param::new("token", "address")];
        assert_eq!(
            output_type(&outputs, "f").unwrap(),
            TypeNode::Object(vec![
                PropertySignature { name: "reserve".into(), ty: TypeNode::Number },
                PropertySignature { name: "token".into(), ty: TypeNode::String },
            ])
        );
    }

    #[test]
    fn test_any_unnamed_output_forms_tuple() {
        let outputs = vec![Param::new("reserve", "uint112"), Param::new("", "bool")];
        assert_eq!(
            output_type(&outputs, "f").unwrap(),
            TypeNode::Tuple(vec![TypeNode::Number, TypeNode::Boolean])
        );
    }
}
