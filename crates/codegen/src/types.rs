//! ABI type mapping
//!
//! Maps raw ABI type strings onto target descriptors and merges the
//! descriptors of overloaded parameters.

use std::fmt;

use solts_common::{Error, Result};
use tracing::warn;

use crate::parser::Param;
use crate::syntax::{binary, ident, method_call, string, BinaryOp, Expr, TypeNode};

/// Target representation of a raw ABI type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Integer,
    Boolean,
    /// Dynamic or fixed-size byte string
    Bytes,
    /// Opaque string: addresses, strings and anything unrecognized
    String,
    Array(Box<TypeDescriptor>),
    Tuple(Vec<TypeDescriptor>),
    /// Widened type of a parameter shared by several overloads
    Union(Vec<TypeDescriptor>),
    /// Type parameter of the generated code, e.g. `Tx`
    Generic(String),
}

/// Runtime check that tells argument shapes apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    Number,
    Boolean,
    String,
    Buffer,
    Array,
    Any,
}

impl Guard {
    fn overlaps(&self, other: &Guard) -> bool {
        self == other || *self == Guard::Any || *other == Guard::Any
    }
}

impl TypeDescriptor {
    /// Runtime guard of a non-union descriptor
    pub fn guard(&self) -> Guard {
        match self {
            TypeDescriptor::Integer => Guard::Number,
            TypeDescriptor::Boolean => Guard::Boolean,
            TypeDescriptor::Bytes => Guard::Buffer,
            TypeDescriptor::String => Guard::String,
            TypeDescriptor::Array(_) | TypeDescriptor::Tuple(_) => Guard::Array,
            TypeDescriptor::Union(_) | TypeDescriptor::Generic(_) => Guard::Any,
        }
    }

    /// Guards of every member, flattening unions
    pub fn guards(&self) -> Vec<Guard> {
        match self {
            TypeDescriptor::Union(members) => members.iter().flat_map(|m| m.guards()).collect(),
            other => vec![other.guard()],
        }
    }

    /// Expression testing that `subject` has this type at runtime
    pub fn guard_expr(&self, subject: Expr) -> Expr {
        match self {
            TypeDescriptor::Union(members) => members
                .iter()
                .map(|m| m.guard_expr(subject.clone()))
                .reduce(|acc, next| binary(acc, BinaryOp::Or, next))
                .unwrap_or_else(|| binary(subject, BinaryOp::StrictNe, Expr::Undefined)),
            other => match other.guard() {
                Guard::Number => type_of(subject, "number"),
                Guard::Boolean => type_of(subject, "boolean"),
                Guard::String => type_of(subject, "string"),
                Guard::Buffer => method_call(ident("Buffer"), "isBuffer", vec![subject]),
                Guard::Array => method_call(ident("Array"), "isArray", vec![subject]),
                Guard::Any => binary(subject, BinaryOp::StrictNe, Expr::Undefined),
            },
        }
    }

    pub fn to_type_node(&self) -> TypeNode {
        match self {
            TypeDescriptor::Integer => TypeNode::Number,
            TypeDescriptor::Boolean => TypeNode::Boolean,
            TypeDescriptor::Bytes => TypeNode::reference("Buffer"),
            TypeDescriptor::String => TypeNode::String,
            TypeDescriptor::Array(inner) => TypeNode::array(inner.to_type_node()),
            TypeDescriptor::Tuple(items) => {
                TypeNode::Tuple(items.iter().map(|t| t.to_type_node()).collect())
            }
            TypeDescriptor::Union(members) => {
                TypeNode::Union(members.iter().map(|t| t.to_type_node()).collect())
            }
            TypeDescriptor::Generic(name) => TypeNode::reference(name.clone()),
        }
    }

    fn members(&self) -> Vec<TypeDescriptor> {
        match self {
            TypeDescriptor::Union(members) => members.clone(),
            other => vec![other.clone()],
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Integer => write!(f, "integer"),
            TypeDescriptor::Boolean => write!(f, "boolean"),
            TypeDescriptor::Bytes => write!(f, "bytes"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Array(inner) => write!(f, "array<{}>", inner),
            TypeDescriptor::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "tuple<{}>", items.join(", "))
            }
            TypeDescriptor::Union(members) => {
                let members: Vec<String> = members.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", members.join(" | "))
            }
            TypeDescriptor::Generic(name) => write!(f, "{}", name),
        }
    }
}

fn type_of(subject: Expr, name: &str) -> Expr {
    binary(Expr::TypeOf(Box::new(subject)), BinaryOp::StrictEq, string(name))
}

/// Split `T[]` or `T[N]` into `T`
fn strip_array_suffix(raw: &str) -> Option<&str> {
    let body = raw.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let size = &body[open + 1..];
    if size.chars().all(|c| c.is_ascii_digit()) {
        Some(&raw[..open])
    } else {
        None
    }
}

fn is_known_opaque(raw: &str) -> bool {
    raw == "address"
        || raw == "string"
        || raw == "function"
        || raw.starts_with("fixed")
        || raw.starts_with("ufixed")
}

/// Map a parameter onto its descriptor; `scope` qualifies error messages
pub fn map_param(param: &Param, scope: &str) -> Result<TypeDescriptor> {
    let path = if param.name.is_empty() {
        format!("{}.<unnamed>", scope)
    } else {
        format!("{}.{}", scope, param.name)
    };
    map_type(&param.kind, param.components.as_deref(), &path)
}

/// Map a raw ABI type string onto its descriptor
pub fn map_type(raw: &str, components: Option<&[Param]>, path: &str) -> Result<TypeDescriptor> {
    if let Some(base) = strip_array_suffix(raw) {
        return Ok(TypeDescriptor::Array(Box::new(map_type(base, components, path)?)));
    }

    let lower = raw.to_ascii_lowercase();
    if lower.contains("int") {
        Ok(TypeDescriptor::Integer)
    } else if lower.contains("bool") {
        Ok(TypeDescriptor::Boolean)
    } else if lower.contains("tuple") {
        let components = match components {
            Some(c) if !c.is_empty() => c,
            _ => return Err(Error::EmptyTuple { parameter: path.to_string() }),
        };
        components
            .iter()
            .map(|c| map_param(c, path))
            .collect::<Result<Vec<_>>>()
            .map(TypeDescriptor::Tuple)
    } else if lower.contains("bytes") {
        Ok(TypeDescriptor::Bytes)
    } else {
        if !is_known_opaque(&lower) {
            warn!(raw, parameter = path, "unrecognized ABI type, falling back to string");
        }
        Ok(TypeDescriptor::String)
    }
}

/// Merge the descriptors one parameter takes across overloads.
///
/// Distinct types widen to a union as long as every member keeps a distinct
/// runtime guard; otherwise the generated dispatch could not tell them apart.
pub fn combine_types(
    left: &TypeDescriptor,
    right: &TypeDescriptor,
    function: &str,
    parameter: &str,
) -> Result<TypeDescriptor> {
    if left == right {
        return Ok(left.clone());
    }

    let mut members: Vec<TypeDescriptor> = Vec::new();
    for candidate in left.members().into_iter().chain(right.members()) {
        if members.contains(&candidate) {
            continue;
        }
        if let Some(clash) = members
            .iter()
            .find(|m| m.guard().overlaps(&candidate.guard()))
        {
            return Err(Error::TypeConflict {
                function: function.to_string(),
                parameter: parameter.to_string(),
                left: clash.to_string(),
                right: candidate.to_string(),
            });
        }
        members.push(candidate);
    }

    if members.len() == 1 {
        Ok(members.remove(0))
    } else {
        Ok(TypeDescriptor::Union(members))
    }
}
