//! Syntax tree for generated modules
//!
//! Builders return these nodes and never produce text; the printer owns formatting.

/// Type annotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    String,
    Number,
    Boolean,
    Any,
    Void,
    /// Named type with optional type arguments, e.g. `Promise<T>`
    Reference { name: String, args: Vec<TypeNode> },
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Union(Vec<TypeNode>),
    /// Object type literal with named fields
    Object(Vec<PropertySignature>),
    /// Function type, e.g. `(err: Error) => void`
    Function { params: Vec<Parameter>, returns: Box<TypeNode> },
}

impl TypeNode {
    pub fn reference<S: Into<String>>(name: S) -> Self {
        TypeNode::Reference { name: name.into(), args: Vec::new() }
    }

    pub fn generic<S: Into<String>>(name: S, args: Vec<TypeNode>) -> Self {
        TypeNode::Reference { name: name.into(), args }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array(Box::new(element))
    }

    pub fn promise(inner: TypeNode) -> Self {
        TypeNode::generic("Promise", vec![inner])
    }

    pub fn function(params: Vec<Parameter>, returns: TypeNode) -> Self {
        TypeNode::Function { params, returns: Box::new(returns) }
    }
}

/// Field of an object type literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySignature {
    pub name: String,
    pub ty: TypeNode,
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub optional: bool,
    /// Collects the remaining arguments
    pub rest: bool,
    pub default: Option<Expr>,
}

impl Parameter {
    pub fn new<S: Into<String>>(name: S, ty: TypeNode) -> Self {
        Self { name: name.into(), ty: Some(ty), optional: false, rest: false, default: None }
    }

    pub fn untyped<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), ty: None, optional: false, rest: false, default: None }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    pub fn with_default(mut self, value: Expr) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    StrictEq,
    StrictNe,
    And,
    Or,
}

impl BinaryOp {
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Str(String),
    Number(u64),
    Undefined,
    This,
    Array(Vec<Expr>),
    /// Object literal; keys are emitted verbatim or quoted when not identifiers
    Object(Vec<(String, Expr)>),
    Property(Box<Expr>, String),
    Call { callee: Box<Expr>, type_args: Vec<TypeNode>, args: Vec<Expr> },
    New { class: Box<Expr>, type_args: Vec<TypeNode>, args: Vec<Expr> },
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    TypeOf(Box<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    Arrow {
        type_params: Vec<String>,
        params: Vec<Parameter>,
        returns: Option<TypeNode>,
        body: Vec<Statement>,
    },
}

/// Left-hand side of a constant declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Name(String),
    /// Positional destructuring, e.g. `const [a, b] = ...`
    Array(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Const { binding: Binding, init: Expr },
    Expr(Expr),
    Return(Option<Expr>),
    If { cond: Expr, then: Vec<Statement>, otherwise: Vec<Statement> },
    Throw(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Interface method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    Property { visibility: Visibility, name: String, ty: TypeNode },
    Constructor { params: Vec<Parameter>, body: Vec<Statement> },
    Method {
        visibility: Visibility,
        name: String,
        params: Vec<Parameter>,
        returns: Option<TypeNode>,
        body: Vec<Statement>,
    },
}

impl ClassMember {
    /// Member name; constructors are named `constructor`
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Property { name, .. } | ClassMember::Method { name, .. } => name,
            ClassMember::Constructor { .. } => "constructor",
        }
    }
}

/// Top-level and namespace-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Import { names: Vec<String>, module: String },
    Interface {
        exported: bool,
        name: String,
        type_params: Vec<String>,
        methods: Vec<MethodSignature>,
    },
    Class {
        exported: bool,
        name: String,
        type_params: Vec<String>,
        members: Vec<ClassMember>,
    },
    Function {
        exported: bool,
        name: String,
        type_params: Vec<String>,
        params: Vec<Parameter>,
        returns: Option<TypeNode>,
        body: Vec<Statement>,
    },
    Const { exported: bool, name: String, init: Expr },
    Namespace { exported: bool, name: String, body: Vec<Declaration> },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Import { module, .. } => module,
            Declaration::Interface { name, .. }
            | Declaration::Class { name, .. }
            | Declaration::Function { name, .. }
            | Declaration::Const { name, .. }
            | Declaration::Namespace { name, .. } => name,
        }
    }
}

/// One generated file, consumed once by a printer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIr {
    pub declarations: Vec<Declaration>,
}

impl ModuleIr {
    pub fn find(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}

pub fn ident<S: Into<String>>(name: S) -> Expr {
    Expr::Ident(name.into())
}

pub fn string<S: Into<String>>(value: S) -> Expr {
    Expr::Str(value.into())
}

pub fn property<S: Into<String>>(object: Expr, name: S) -> Expr {
    Expr::Property(Box::new(object), name.into())
}

pub fn access_this<S: Into<String>>(name: S) -> Expr {
    property(Expr::This, name)
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call { callee: Box::new(callee), type_args: Vec::new(), args }
}

pub fn call_generic(callee: Expr, type_args: Vec<TypeNode>, args: Vec<Expr>) -> Expr {
    Expr::Call { callee: Box::new(callee), type_args, args }
}

pub fn method_call<S: Into<String>>(object: Expr, method: S, args: Vec<Expr>) -> Expr {
    call(property(object, method), args)
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary { left: Box::new(left), op, right: Box::new(right) }
}

pub fn assign(target: Expr, value: Expr) -> Statement {
    Statement::Expr(Expr::Assign(Box::new(target), Box::new(value)))
}

pub fn arrow(params: Vec<Parameter>, returns: Option<TypeNode>, body: Vec<Statement>) -> Expr {
    Expr::Arrow { type_params: Vec::new(), params, returns, body }
}

pub fn declare_const<S: Into<String>>(name: S, init: Expr) -> Statement {
    Statement::Const { binding: Binding::Name(name.into()), init }
}

/// Fold conditions with `&&`; an empty list yields `None`
pub fn all_of(conditions: Vec<Expr>) -> Option<Expr> {
    conditions
        .into_iter()
        .reduce(|acc, next| binary(acc, BinaryOp::And, next))
}

const RESOLVE: &str = "resolve";
const REJECT: &str = "reject";

/// `new Promise((resolve, reject) => { ... })`
pub fn new_promise(body: Vec<Statement>) -> Expr {
    Expr::New {
        class: Box::new(ident("Promise")),
        type_args: Vec::new(),
        args: vec![callback(RESOLVE, REJECT, body)],
    }
}

/// Two-argument untyped callback, e.g. `(err, exec) => { ... }`
pub fn callback(first: &str, second: &str, body: Vec<Statement>) -> Expr {
    arrow(vec![Parameter::untyped(first), Parameter::untyped(second)], None, body)
}

/// `if (err) { reject(err); } else { ...; resolve(value); }`
pub fn reject_or_resolve(err: &str, mut before: Vec<Statement>, value: Expr) -> Statement {
    before.push(Statement::Expr(call(ident(RESOLVE), vec![value])));
    Statement::If {
        cond: ident(err),
        then: vec![Statement::Expr(call(ident(REJECT), vec![ident(err)]))],
        otherwise: before,
    }
}

/// `Buffer.from(value)`
pub fn buffer_from(value: Expr) -> Expr {
    method_call(ident("Buffer"), "from", vec![value])
}

const RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Whether `name` is a valid identifier that is not a reserved word
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') && !is_reserved(name)
}

/// Turn an ABI name into a usable variable identifier
pub fn safe_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_reserved(&out) {
        out.push('_');
    }
    out
}

/// Append `_` until `name` no longer shadows one of the generated `locals`
pub fn avoid_locals(mut name: String, locals: &[&str]) -> String {
    while locals.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier() {
        assert_eq!(safe_identifier("owner"), "owner");
        assert_eq!(safe_identifier("new"), "new_");
        assert_eq!(safe_identifier("1st"), "_1st");
        assert_eq!(safe_identifier("a-b"), "a_b");
        assert_eq!(safe_identifier(""), "_");
    }

    #[test]
    fn test_avoid_locals() {
        assert_eq!(avoid_locals("data".into(), &["data", "data_"]), "data__");
        assert_eq!(avoid_locals("owner".into(), &["data"]), "owner");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("Token"));
        assert!(is_identifier("_private$"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("class"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_all_of_folds_left() {
        assert_eq!(all_of(vec![]), None);
        let folded = all_of(vec![ident("a"), ident("b"), ident("c")]).unwrap();
        assert_eq!(
            folded,
            binary(binary(ident("a"), BinaryOp::And, ident("b")), BinaryOp::And, ident("c"))
        );
    }
}
