//! Signature normalization
//!
//! Partitions a contract's entries, derives canonical signatures and resolves
//! overloaded names into the members of the generated class.

use std::collections::HashSet;

use solts_common::{Error, Result};
use tracing::{debug, warn};

use crate::config::OverloadPolicy;
use crate::contract::CONTRACT;
use crate::decoder::DECODE;
use crate::deployer::{DEPLOY, LINKS};
use crate::encoder::ENCODE;
use crate::helpers::{CALL, REPLACE};
use crate::parser::{Constructor, ContractDescriptor, Entry, Event, Function, Param};
use crate::provider::READABLE;
use crate::selector::selector;
use crate::syntax::{avoid_locals, is_reserved, safe_identifier, Parameter};
use crate::types::{combine_types, map_param, Guard, TypeDescriptor};

/// Members the generated contract class defines for itself
pub const RESERVED_MEMBERS: &[&str] = &[
    "constructor",
    "client",
    "address",
    "withAddress",
    "getAddress",
    "deploy",
];

/// Locals generated code binds around member parameters
pub const PARAMETER_LOCALS: &[&str] = &["client", "data"];

/// Module declarations and globals that generated bodies refer to
pub const MODULE_SCOPE: &[&str] = &[
    ENCODE, DECODE, CALL, REPLACE, DEPLOY, LINKS, CONTRACT, READABLE, "Provider", "Buffer",
    "Array", "Error", "Promise", "Uint8Array", "undefined",
];

/// Identifier for a declared parameter name that shadows neither `locals`
/// nor anything in [`MODULE_SCOPE`]
pub fn parameter_ident(name: &str, locals: &[&str]) -> String {
    let mut ident = safe_identifier(name);
    loop {
        let next = avoid_locals(avoid_locals(ident.clone(), locals), MODULE_SCOPE);
        if next == ident {
            return ident;
        }
        ident = next;
    }
}

/// Canonical form of a function or event signature and its selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub canonical: String,
    pub selector: String,
}

impl Signature {
    pub fn of(name: &str, inputs: &[Param]) -> Self {
        let canonical = canonical_signature(name, inputs);
        let selector = selector(&canonical);
        Self { canonical, selector }
    }
}

/// Canonical type string, expanding tuples into their component types
pub fn canonical_type(param: &Param) -> String {
    match (param.kind.strip_prefix("tuple"), &param.components) {
        (Some(suffix), Some(components)) => {
            let inner: Vec<String> = components.iter().map(canonical_type).collect();
            format!("({}){}", inner.join(","), suffix)
        }
        _ => param.kind.clone(),
    }
}

/// `name(type1,type2,...)`, or the name itself when it already carries a parameter list
pub fn canonical_signature(name: &str, inputs: &[Param]) -> String {
    if name.contains('(') {
        return name.to_string();
    }
    let types: Vec<String> = inputs.iter().map(canonical_type).collect();
    format!("{}({})", name, types.join(","))
}

/// Parameter of a generated member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParam {
    /// Declared ABI name
    pub name: String,
    /// Identifier used in generated code
    pub ident: String,
    pub ty: TypeDescriptor,
    /// Absent from at least one overload
    pub optional: bool,
}

impl GroupParam {
    fn from_input(input: &Param, ty: TypeDescriptor) -> Self {
        Self {
            name: input.name.clone(),
            ident: parameter_ident(&input.name, PARAMETER_LOCALS),
            ty,
            optional: false,
        }
    }

    pub fn to_parameter(&self) -> Parameter {
        let parameter = Parameter::new(self.ident.clone(), self.ty.to_type_node());
        if self.optional {
            parameter.optional()
        } else {
            parameter
        }
    }
}

/// One ABI function bound to its signature
#[derive(Debug, Clone)]
pub struct Overload<'a> {
    pub function: &'a Function,
    pub signature: Signature,
}

impl<'a> Overload<'a> {
    fn new(function: &'a Function) -> Self {
        Self {
            function,
            signature: Signature::of(&function.name, &function.inputs),
        }
    }
}

/// Functions exposed through a single generated member
#[derive(Debug, Clone)]
pub struct MethodGroup<'a> {
    /// Declared name shared by the overloads
    pub name: String,
    /// Member identifier in the generated class and tables
    pub ident: String,
    /// Never empty
    pub overloads: Vec<Overload<'a>>,
    pub params: Vec<GroupParam>,
}

impl<'a> MethodGroup<'a> {
    /// Outputs shared by every overload
    pub fn outputs(&self) -> &'a [Param] {
        &self.overloads[0].function.outputs
    }

    pub fn is_overloaded(&self) -> bool {
        self.overloads.len() > 1
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.params.iter().map(GroupParam::to_parameter).collect()
    }

    /// Type a given overload assigns to a group parameter, if it takes it
    pub fn overload_type(&self, overload: &Overload<'_>, param: &GroupParam) -> Result<Option<TypeDescriptor>> {
        overload
            .function
            .inputs
            .iter()
            .find(|input| input.is_named() && input.name == param.name)
            .map(|input| map_param(input, &self.name))
            .transpose()
    }
}

/// An event bound to its subscription member
#[derive(Debug, Clone)]
pub struct EventBinding<'a> {
    pub event: &'a Event,
    pub ident: String,
    pub signature: Signature,
}

/// Normalized view of one contract interface
#[derive(Debug, Clone)]
pub struct Interface<'a> {
    pub contract: &'a str,
    pub constructor: Option<&'a Constructor>,
    pub methods: Vec<MethodGroup<'a>>,
    pub events: Vec<EventBinding<'a>>,
    /// Every non-constructor entry that carries a selector, in declaration order
    pub signatures: Vec<Signature>,
}

/// Hands out member identifiers that are unique within one class
struct NameRegistry {
    taken: HashSet<String>,
    /// Declared names kept for the one member that owns them
    held: HashSet<String>,
}

impl NameRegistry {
    fn new() -> Self {
        Self {
            taken: RESERVED_MEMBERS.iter().map(|s| s.to_string()).collect(),
            held: HashSet::new(),
        }
    }

    fn is_free(&self, name: &str) -> bool {
        !self.taken.contains(name) && !self.held.contains(name)
    }

    /// Keep `name` away from every claim except [`NameRegistry::claim_held`]
    fn hold(&mut self, name: String) {
        if !self.taken.contains(&name) {
            self.held.insert(name);
        }
    }

    /// Claim a held name for its owner, else fall back to [`NameRegistry::claim`]
    fn claim_held(&mut self, candidates: &[String]) -> String {
        if let Some(first) = candidates.first() {
            if self.held.remove(first) {
                self.taken.insert(first.clone());
                return first.clone();
            }
        }
        self.claim(candidates)
    }

    /// Claim the first free candidate, numbering the last one when all are taken
    fn claim(&mut self, candidates: &[String]) -> String {
        for candidate in candidates {
            if self.is_free(candidate) {
                self.taken.insert(candidate.clone());
                return candidate.clone();
            }
        }
        let base = candidates.last().cloned().unwrap_or_default();
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.is_free(&candidate) {
                self.taken.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }
}

/// Declared name without any parameter list
fn base_name(name: &str) -> &str {
    name.split('(').next().unwrap_or(name)
}

/// Member identifier for a declared name; reserved words are legal member names
fn member_identifier(name: &str) -> String {
    let base = base_name(name);
    if is_reserved(base) {
        base.to_string()
    } else {
        safe_identifier(base)
    }
}

fn concat_names(inputs: &[Param]) -> String {
    inputs
        .iter()
        .flat_map(|p| p.name.chars())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

fn group_by_name<'a, T, F>(items: Vec<&'a T>, name: F) -> Vec<(String, Vec<&'a T>)>
where
    F: Fn(&T) -> &str,
{
    let mut groups: Vec<(String, Vec<&'a T>)> = Vec::new();
    for item in items {
        let key = base_name(name(item)).to_string();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
}

/// Normalize a contract's entries under the given overload policy
pub fn normalize(contract: &ContractDescriptor, policy: OverloadPolicy) -> Result<Interface<'_>> {
    let mut constructor = None;
    let mut functions = Vec::new();
    let mut events = Vec::new();
    let mut signatures = Vec::new();

    for entry in &contract.abi {
        match entry {
            Entry::Constructor(c) => {
                if constructor.replace(c).is_some() {
                    return Err(Error::DuplicateConstructor {
                        contract: contract.name.clone(),
                    });
                }
            }
            Entry::Function(f) if f.name.is_empty() => {
                if !f.inputs.is_empty() {
                    warn!(contract = %contract.name, "unnamed function with inputs has no generated member");
                    signatures.push(Signature::of(&f.name, &f.inputs));
                }
            }
            Entry::Function(f) => {
                signatures.push(Signature::of(&f.name, &f.inputs));
                functions.push(f);
            }
            Entry::Event(e) if e.name.is_empty() => {
                warn!(contract = %contract.name, "unnamed event has no generated member");
                if !e.inputs.is_empty() {
                    signatures.push(Signature::of(&e.name, &e.inputs));
                }
            }
            Entry::Event(e) => {
                signatures.push(Signature::of(&e.name, &e.inputs));
                events.push(e);
            }
        }
    }

    let mut registry = NameRegistry::new();
    let function_groups = group_by_name(functions, |f: &Function| f.name.as_str());
    let function_names: HashSet<String> =
        function_groups.iter().map(|(name, _)| name.clone()).collect();
    let event_groups: Vec<(String, Vec<&Event>, bool)> =
        group_by_name(events, |e: &Event| e.name.as_str())
            .into_iter()
            .map(|(name, members)| {
                let clash = members.len() > 1
                    || function_names.contains(&name)
                    || RESERVED_MEMBERS.contains(&name.as_str());
                (name, members, clash)
            })
            .collect();

    // Members that were never overloaded keep their declared names
    for (name, members) in &function_groups {
        if members.len() == 1 || policy == OverloadPolicy::Combine {
            registry.hold(member_identifier(name));
        }
    }
    for (name, _, clash) in &event_groups {
        if !clash {
            registry.hold(member_identifier(name));
        }
    }

    let mut methods = Vec::new();
    for (name, members) in function_groups {
        match policy {
            OverloadPolicy::Combine => methods.push(combine_group(name, members, &mut registry)?),
            OverloadPolicy::Mangle => methods.extend(mangle_group(name, members, &mut registry)?),
        }
    }

    let mut bindings = Vec::new();
    for (name, members, clash) in event_groups {
        for event in members {
            let plain = member_identifier(&name);
            let mangled = format!("{}{}", plain, concat_names(&event.inputs));
            let ident = if clash {
                registry.claim(&[mangled])
            } else {
                registry.claim_held(&[plain, mangled])
            };
            bindings.push(EventBinding {
                event,
                ident,
                signature: Signature::of(&event.name, &event.inputs),
            });
        }
    }

    debug!(
        contract = %contract.name,
        methods = methods.len(),
        events = bindings.len(),
        policy = %policy,
        "normalized interface"
    );

    Ok(Interface {
        contract: &contract.name,
        constructor,
        methods,
        events: bindings,
        signatures,
    })
}

fn named_params(function: &Function, scope: &str) -> Result<Vec<GroupParam>> {
    function
        .inputs
        .iter()
        .filter(|input| input.is_named())
        .map(|input| Ok(GroupParam::from_input(input, map_param(input, scope)?)))
        .collect()
}

fn mangle_group<'a>(
    name: String,
    functions: Vec<&'a Function>,
    registry: &mut NameRegistry,
) -> Result<Vec<MethodGroup<'a>>> {
    let overloaded = functions.len() > 1;
    functions
        .into_iter()
        .map(|function| {
            let plain = member_identifier(&name);
            let mangled = format!("{}{}", plain, concat_names(&function.inputs));
            let ident = if overloaded {
                registry.claim(&[mangled])
            } else {
                registry.claim_held(&[plain, mangled])
            };
            Ok(MethodGroup {
                params: named_params(function, &name)?,
                name: name.clone(),
                ident,
                overloads: vec![Overload::new(function)],
            })
        })
        .collect()
}

fn combine_group<'a>(
    name: String,
    functions: Vec<&'a Function>,
    registry: &mut NameRegistry,
) -> Result<MethodGroup<'a>> {
    let overloads: Vec<Overload<'a>> = functions.into_iter().map(Overload::new).collect();

    let mut params: Vec<GroupParam> = Vec::new();
    let mut shapes: Vec<Vec<(String, TypeDescriptor)>> = Vec::with_capacity(overloads.len());
    for overload in &overloads {
        let own = named_params(overload.function, &name)?;
        for param in &own {
            match params.iter_mut().find(|p| p.name == param.name) {
                Some(existing) => {
                    existing.ty = combine_types(&existing.ty, &param.ty, &name, &param.name)?;
                }
                None => params.push(param.clone()),
            }
        }
        shapes.push(own.into_iter().map(|p| (p.name, p.ty)).collect());
    }

    for param in params.iter_mut() {
        param.optional = shapes
            .iter()
            .any(|shape| !shape.iter().any(|(n, _)| *n == param.name));
    }

    // Dispatch conditions per overload: the guards of the parameters it takes,
    // `None` for the group parameters it leaves undefined.
    let conditions: Vec<Vec<Option<Vec<Guard>>>> = shapes
        .iter()
        .map(|shape| {
            params
                .iter()
                .map(|p| {
                    shape
                        .iter()
                        .find(|(n, _)| *n == p.name)
                        .map(|(_, ty)| ty.guards())
                })
                .collect()
        })
        .collect();
    for i in 0..conditions.len() {
        for j in (i + 1)..conditions.len() {
            if conditions[i] == conditions[j] {
                return Err(Error::AmbiguousOverload {
                    function: name,
                    first: overloads[i].signature.canonical.clone(),
                    second: overloads[j].signature.canonical.clone(),
                });
            }
        }
    }

    let first = &overloads[0];
    for other in &overloads[1..] {
        if !same_outputs(&first.function.outputs, &other.function.outputs) {
            return Err(Error::OutputConflict {
                function: name,
                first: first.signature.canonical.clone(),
                second: other.signature.canonical.clone(),
            });
        }
    }

    let plain = member_identifier(&name);
    let mangled = format!("{}{}", plain, concat_names(&first.function.inputs));
    let ident = registry.claim_held(&[plain, mangled]);

    if overloads.len() > 1 {
        debug!(function = %name, overloads = overloads.len(), "combined overloads");
    }

    Ok(MethodGroup {
        name,
        ident,
        overloads,
        params,
    })
}

fn same_outputs(left: &[Param], right: &[Param]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l.name == r.name && canonical_type(l) == canonical_type(r))
}
