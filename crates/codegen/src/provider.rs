//! Transport interface shared by every contract of a module

use crate::syntax::{
    call, ident, method_call, Declaration, Expr, MethodSignature, Parameter, TypeNode,
};

/// Stream type returned by event subscriptions
pub const READABLE: &str = "Readable";

/// Names of the generated transport capability and its type parameter.
///
/// Built once per module and passed by reference into every builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    name: String,
    type_param: String,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub const DEPLOY: &'static str = "deploy";
    pub const CALL: &'static str = "call";
    pub const LISTEN: &'static str = "listen";
    pub const PAYLOAD: &'static str = "payload";
    pub const ENCODE: &'static str = "encode";
    pub const DECODE: &'static str = "decode";

    pub fn new() -> Self {
        Self {
            name: "Provider".to_string(),
            type_param: "Tx".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque transaction type parameter, `Tx`
    pub fn type_param(&self) -> &str {
        &self.type_param
    }

    pub fn type_argument(&self) -> TypeNode {
        TypeNode::reference(self.type_param.clone())
    }

    /// `Provider<Tx>`
    pub fn type_node(&self) -> TypeNode {
        TypeNode::generic(self.name.clone(), vec![self.type_argument()])
    }

    /// `export interface Provider<Tx> { ... }`
    pub fn create_interface(&self) -> Declaration {
        let tx = self.type_argument();
        let bytes = TypeNode::reference("Uint8Array");
        let methods = vec![
            MethodSignature {
                name: Self::DEPLOY.to_string(),
                params: vec![
                    Parameter::new("msg", tx.clone()),
                    Parameter::new("callback", error_callback("addr", bytes.clone())),
                ],
                returns: TypeNode::Void,
            },
            MethodSignature {
                name: Self::CALL.to_string(),
                params: vec![
                    Parameter::new("msg", tx.clone()),
                    Parameter::new("callback", error_callback("exec", bytes.clone())),
                ],
                returns: TypeNode::Void,
            },
            MethodSignature {
                name: Self::LISTEN.to_string(),
                params: vec![
                    Parameter::new("signature", TypeNode::String),
                    Parameter::new("address", TypeNode::String),
                    Parameter::new("callback", error_callback("event", TypeNode::Any)),
                ],
                returns: TypeNode::reference(READABLE),
            },
            MethodSignature {
                name: Self::PAYLOAD.to_string(),
                params: vec![
                    Parameter::new("data", TypeNode::String),
                    Parameter::new("address", TypeNode::String).optional(),
                ],
                returns: tx,
            },
            MethodSignature {
                name: Self::ENCODE.to_string(),
                params: vec![
                    Parameter::new("name", TypeNode::String),
                    Parameter::new("inputs", TypeNode::array(TypeNode::String)),
                    Parameter::new("args", TypeNode::array(TypeNode::Any)).rest(),
                ],
                returns: TypeNode::String,
            },
            MethodSignature {
                name: Self::DECODE.to_string(),
                params: vec![
                    Parameter::new("data", bytes),
                    Parameter::new("outputs", TypeNode::array(TypeNode::String)),
                ],
                returns: TypeNode::Any,
            },
        ];

        Declaration::Interface {
            exported: true,
            name: self.name.clone(),
            type_params: vec![self.type_param.clone()],
            methods,
        }
    }

    /// `client.encode(name, [types], ...args)`
    pub fn encode(&self, client: Expr, name: &str, types: &[String], args: Vec<Expr>) -> Expr {
        let mut all = vec![Expr::Str(name.to_string()), type_list(types)];
        all.extend(args);
        method_call(client, Self::ENCODE, all)
    }

    /// `client.decode(data, [types])`
    pub fn decode(&self, client: Expr, data: Expr, types: &[String]) -> Expr {
        method_call(client, Self::DECODE, vec![data, type_list(types)])
    }

    /// `client.payload(data[, address])`
    pub fn payload(&self, client: Expr, data: Expr, address: Option<Expr>) -> Expr {
        let mut args = vec![data];
        args.extend(address);
        method_call(client, Self::PAYLOAD, args)
    }

    pub fn deploy(&self, client: Expr, payload: Expr, callback: Expr) -> Expr {
        method_call(client, Self::DEPLOY, vec![payload, callback])
    }

    pub fn call(&self, client: Expr, payload: Expr, callback: Expr) -> Expr {
        method_call(client, Self::CALL, vec![payload, callback])
    }

    pub fn listen(&self, client: Expr, selector: &str, address: Expr, callback: Expr) -> Expr {
        method_call(
            client,
            Self::LISTEN,
            vec![Expr::Str(selector.to_string()), address, callback],
        )
    }
}

/// `(err: Error, <name>: <ty>) => void`
pub fn error_callback(name: &str, ty: TypeNode) -> TypeNode {
    TypeNode::function(
        vec![
            Parameter::new("err", TypeNode::reference("Error")),
            Parameter::new(name, ty),
        ],
        TypeNode::Void,
    )
}

/// `[ "uint256", "address" ]`
pub fn type_list(types: &[String]) -> Expr {
    Expr::Array(types.iter().map(|t| Expr::Str(t.clone())).collect())
}

/// `callback(value)`, for forwarding to caller-supplied callbacks
pub fn invoke(callback: &str, args: Vec<Expr>) -> Expr {
    call(ident(callback), args)
}
