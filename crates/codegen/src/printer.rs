//! TypeScript rendering of the module syntax tree

use crate::syntax::{
    is_identifier, is_reserved, BinaryOp, Binding, ClassMember, Declaration, Expr,
    MethodSignature, ModuleIr, Parameter, PropertySignature, Statement, TypeNode, Visibility,
};

/// Renders a module syntax tree to source text
pub trait Printer {
    fn print(&self, module: &ModuleIr) -> String;
}

/// Printer for TypeScript source
#[derive(Debug, Clone)]
pub struct TypeScriptPrinter {
    indent: String,
}

impl Default for TypeScriptPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptPrinter {
    pub fn new() -> Self {
        Self::with_indent(4)
    }

    pub fn with_indent(width: usize) -> Self {
        Self { indent: " ".repeat(width) }
    }
}

impl Printer for TypeScriptPrinter {
    fn print(&self, module: &ModuleIr) -> String {
        let mut writer = Writer { indent: &self.indent, level: 0 };
        let blocks: Vec<String> = module
            .declarations
            .iter()
            .map(|d| writer.declaration(d))
            .collect();
        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }
}

struct Writer<'a> {
    indent: &'a str,
    level: usize,
}

fn quote(value: &str) -> String {
    // JSON string literals are valid TypeScript string literals
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn property_key(key: &str) -> String {
    if is_identifier(key) || is_reserved(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn export(exported: bool) -> &'static str {
    if exported {
        "export "
    } else {
        ""
    }
}

fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::StrictEq | BinaryOp::StrictNe => 3,
        BinaryOp::Plus => 4,
    }
}

impl<'a> Writer<'a> {
    fn pad(&self) -> String {
        self.indent.repeat(self.level)
    }

    fn declaration(&mut self, declaration: &Declaration) -> String {
        let pad = self.pad();
        match declaration {
            Declaration::Import { names, module } => {
                format!("{}import {{ {} }} from {};", pad, names.join(", "), quote(module))
            }
            Declaration::Interface { exported, name, type_params: tps, methods } => {
                self.level += 1;
                let inner = self.pad();
                let lines: Vec<String> = methods
                    .iter()
                    .map(|m| format!("{}{};", inner, self.method_signature(m)))
                    .collect();
                self.level -= 1;
                format!(
                    "{}{}interface {}{} {{\n{}\n{}}}",
                    pad,
                    export(*exported),
                    name,
                    type_params(tps),
                    lines.join("\n"),
                    pad
                )
            }
            Declaration::Class { exported, name, type_params: tps, members } => {
                self.level += 1;
                let mut lines = Vec::with_capacity(members.len());
                let mut previous: Option<&ClassMember> = None;
                for member in members {
                    let both_properties = matches!(previous, Some(ClassMember::Property { .. }))
                        && matches!(member, ClassMember::Property { .. });
                    if previous.is_some() && !both_properties {
                        lines.push(String::new());
                    }
                    lines.push(self.class_member(member));
                    previous = Some(member);
                }
                self.level -= 1;
                format!(
                    "{}{}class {}{} {{\n{}\n{}}}",
                    pad,
                    export(*exported),
                    name,
                    type_params(tps),
                    lines.join("\n"),
                    pad
                )
            }
            Declaration::Function { exported, name, type_params: tps, params, returns, body } => {
                format!(
                    "{}{}function {}{}({}){} {}",
                    pad,
                    export(*exported),
                    name,
                    type_params(tps),
                    self.parameters(params),
                    self.return_annotation(returns.as_ref()),
                    self.block(body)
                )
            }
            Declaration::Const { exported, name, init } => {
                format!("{}{}const {} = {};", pad, export(*exported), name, self.expr(init))
            }
            Declaration::Namespace { exported, name, body } => {
                self.level += 1;
                let inner: Vec<String> = body.iter().map(|d| self.declaration(d)).collect();
                self.level -= 1;
                format!(
                    "{}{}namespace {} {{\n{}\n{}}}",
                    pad,
                    export(*exported),
                    name,
                    inner.join("\n\n"),
                    pad
                )
            }
        }
    }

    fn method_signature(&mut self, method: &MethodSignature) -> String {
        format!(
            "{}({}): {}",
            method.name,
            self.parameters(&method.params),
            self.type_node(&method.returns)
        )
    }

    fn class_member(&mut self, member: &ClassMember) -> String {
        let pad = self.pad();
        match member {
            ClassMember::Property { visibility, name, ty } => {
                format!("{}{}{}: {};", pad, modifier(*visibility), name, self.type_node(ty))
            }
            ClassMember::Constructor { params, body } => {
                format!("{}constructor({}) {}", pad, self.parameters(params), self.block(body))
            }
            ClassMember::Method { visibility, name, params, returns, body } => format!(
                "{}{}{}({}){} {}",
                pad,
                modifier(*visibility),
                name,
                self.parameters(params),
                self.return_annotation(returns.as_ref()),
                self.block(body)
            ),
        }
    }

    fn return_annotation(&mut self, returns: Option<&TypeNode>) -> String {
        returns
            .map(|ty| format!(": {}", self.type_node(ty)))
            .unwrap_or_default()
    }

    fn parameters(&mut self, params: &[Parameter]) -> String {
        params
            .iter()
            .map(|p| self.parameter(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn parameter(&mut self, param: &Parameter) -> String {
        let mut out = String::new();
        if param.rest {
            out.push_str("...");
        }
        out.push_str(&param.name);
        if param.optional {
            out.push('?');
        }
        if let Some(ty) = &param.ty {
            out.push_str(": ");
            out.push_str(&self.type_node(ty));
        }
        if let Some(default) = &param.default {
            out.push_str(" = ");
            out.push_str(&self.expr(default));
        }
        out
    }

    fn type_node(&mut self, ty: &TypeNode) -> String {
        match ty {
            TypeNode::String => "string".to_string(),
            TypeNode::Number => "number".to_string(),
            TypeNode::Boolean => "boolean".to_string(),
            TypeNode::Any => "any".to_string(),
            TypeNode::Void => "void".to_string(),
            TypeNode::Reference { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    format!("{}<{}>", name, self.type_list(args))
                }
            }
            TypeNode::Array(element) => {
                let inner = self.type_node(element);
                match element.as_ref() {
                    TypeNode::Union(_) | TypeNode::Function { .. } => format!("({})[]", inner),
                    _ => format!("{}[]", inner),
                }
            }
            TypeNode::Tuple(items) => format!("[{}]", self.type_list(items)),
            TypeNode::Union(members) => members
                .iter()
                .map(|m| match m {
                    TypeNode::Function { .. } => format!("({})", self.type_node(m)),
                    _ => self.type_node(m),
                })
                .collect::<Vec<_>>()
                .join(" | "),
            TypeNode::Object(fields) => self.object_type(fields),
            TypeNode::Function { params, returns } => {
                format!("({}) => {}", self.parameters(params), self.type_node(returns))
            }
        }
    }

    fn type_list(&mut self, types: &[TypeNode]) -> String {
        types
            .iter()
            .map(|t| self.type_node(t))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn object_type(&mut self, fields: &[PropertySignature]) -> String {
        if fields.is_empty() {
            return "{}".to_string();
        }
        let fields: Vec<String> = fields
            .iter()
            .map(|f| format!("{}: {};", property_key(&f.name), self.type_node(&f.ty)))
            .collect();
        format!("{{ {} }}", fields.join(" "))
    }

    fn block(&mut self, statements: &[Statement]) -> String {
        if statements.is_empty() {
            return "{}".to_string();
        }
        let pad = self.pad();
        self.level += 1;
        let lines: Vec<String> = statements.iter().map(|s| self.statement(s)).collect();
        self.level -= 1;
        format!("{{\n{}\n{}}}", lines.join("\n"), pad)
    }

    fn statement(&mut self, statement: &Statement) -> String {
        let pad = self.pad();
        match statement {
            Statement::Const { binding, init } => {
                let target = match binding {
                    Binding::Name(name) => name.clone(),
                    Binding::Array(names) => format!("[{}]", names.join(", ")),
                };
                format!("{}const {} = {};", pad, target, self.expr(init))
            }
            Statement::Expr(expr) => format!("{}{};", pad, self.expr(expr)),
            Statement::Return(None) => format!("{}return;", pad),
            Statement::Return(Some(expr)) => format!("{}return {};", pad, self.expr(expr)),
            Statement::If { cond, then, otherwise } => {
                let mut out = format!("{}if ({}) {}", pad, self.expr(cond), self.block(then));
                if !otherwise.is_empty() {
                    out.push_str(" else ");
                    out.push_str(&self.block(otherwise));
                }
                out
            }
            Statement::Throw(expr) => format!("{}throw {};", pad, self.expr(expr)),
        }
    }

    fn args(&mut self, args: &[Expr]) -> String {
        args.iter()
            .map(|a| self.expr(a))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn type_args(&mut self, args: &[TypeNode]) -> String {
        if args.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_list(args))
        }
    }

    /// Expression in a position that binds tighter than any operator
    fn operand(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Arrow { .. } | Expr::Binary { .. } | Expr::Assign(..) | Expr::TypeOf(_) => {
                format!("({})", self.expr(expr))
            }
            _ => self.expr(expr),
        }
    }

    fn binary_side(&mut self, expr: &Expr, parent: BinaryOp, right: bool) -> String {
        match expr {
            Expr::Binary { op, .. } => {
                let (child, parent) = (precedence(*op), precedence(parent));
                if child < parent || (right && child == parent) {
                    format!("({})", self.expr(expr))
                } else {
                    self.expr(expr)
                }
            }
            Expr::Arrow { .. } | Expr::Assign(..) => format!("({})", self.expr(expr)),
            _ => self.expr(expr),
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(name) => name.clone(),
            Expr::Str(value) => quote(value),
            Expr::Number(n) => n.to_string(),
            Expr::Undefined => "undefined".to_string(),
            Expr::This => "this".to_string(),
            Expr::Array(items) => format!("[{}]", self.args(items)),
            Expr::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let pad = self.pad();
                self.level += 1;
                let inner = self.pad();
                let lines: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}{}: {},", inner, property_key(key), self.expr(value)))
                    .collect();
                self.level -= 1;
                format!("{{\n{}\n{}}}", lines.join("\n"), pad)
            }
            Expr::Property(object, name) => format!("{}.{}", self.operand(object), name),
            Expr::Call { callee, type_args, args } => format!(
                "{}{}({})",
                self.operand(callee),
                self.type_args(type_args),
                self.args(args)
            ),
            Expr::New { class, type_args, args } => format!(
                "new {}{}({})",
                self.operand(class),
                self.type_args(type_args),
                self.args(args)
            ),
            Expr::Binary { left, op, right } => format!(
                "{} {} {}",
                self.binary_side(left, *op, false),
                op.token(),
                self.binary_side(right, *op, true)
            ),
            Expr::TypeOf(operand) => format!("typeof {}", self.operand(operand)),
            Expr::Assign(target, value) => format!("{} = {}", self.expr(target), self.expr(value)),
            Expr::Arrow { type_params: tps, params, returns, body } => format!(
                "{}({}){} => {}",
                type_params(tps),
                self.parameters(params),
                self.return_annotation(returns.as_ref()),
                self.block(body)
            ),
        }
    }
}

fn modifier(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "",
        Visibility::Private => "private ",
    }
}
