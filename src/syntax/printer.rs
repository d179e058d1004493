//! Deterministic source printer
//!
//! Serializes a (possibly augmented) [`CompilationUnit`] as fully explicit
//! source. Layout is fixed: one declaration or statement per line, members
//! separated by a blank line, and parentheses only where the tree requires
//! them. The same tree always prints to the same bytes.

use std::fmt::Write as _;

use super::ast::*;

/// Printer layout options
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Number of spaces per indentation level
    pub indent_width: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl PrintOptions {
    /// Indentation string for the given level
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Print a compilation unit.
pub fn print_unit(unit: &CompilationUnit, options: &PrintOptions) -> String {
    let mut printer = Printer {
        options,
        out: String::new(),
        level: 0,
    };
    printer.unit(unit);
    printer.out
}

/// Print a single expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

struct Printer<'o> {
    options: &'o PrintOptions,
    out: String,
    level: usize,
}

impl Printer<'_> {
    fn indent(&mut self) {
        let indent = self.options.indent(self.level);
        self.out.push_str(&indent);
    }

    fn line(&mut self, text: &str) {
        self.indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn unit(&mut self, unit: &CompilationUnit) {
        if let Some(package) = &unit.package {
            self.line(&format!("package {};", package.dotted()));
            self.out.push('\n');
        }
        if !unit.imports.is_empty() {
            for import in &unit.imports {
                let star = if import.on_demand { ".*" } else { "" };
                self.line(&format!("import {}{};", import.path.dotted(), star));
            }
            self.out.push('\n');
        }
        for (idx, decl) in unit.types.iter().enumerate() {
            if idx > 0 {
                self.out.push('\n');
            }
            self.type_decl(decl);
        }
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        let mut head = modifiers_prefix(&decl.modifiers);
        head.push_str(match decl.kind {
            TypeDeclKind::Class => "class ",
            TypeDeclKind::Interface => "interface ",
        });
        head.push_str(&decl.name.text);
        if !decl.extends.is_empty() {
            head.push_str(" extends ");
            head.push_str(&join_types(&decl.extends));
        }
        if !decl.implements.is_empty() {
            head.push_str(" implements ");
            head.push_str(&join_types(&decl.implements));
        }
        head.push_str(" {");
        self.line(&head);

        self.level += 1;
        for (idx, member) in decl.members.iter().enumerate() {
            if idx > 0 {
                self.out.push('\n');
            }
            match member {
                Member::Field(field) => self.field(field),
                Member::Method(method) => self.method(method),
                Member::Type(nested) => self.type_decl(nested),
            }
        }
        self.level -= 1;
        self.line("}");
    }

    fn field(&mut self, field: &FieldDecl) {
        let text = format!(
            "{}{} {};",
            modifiers_prefix(&field.modifiers),
            field.ty,
            declarators(&field.declarators)
        );
        self.line(&text);
    }

    fn method(&mut self, method: &MethodDecl) {
        let mut head = modifiers_prefix(&method.modifiers);
        if let Some(ret) = &method.return_type {
            let _ = write!(head, "{} ", ret);
        }
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{}{} {}", modifiers_prefix(&p.modifiers), p.ty, p.name.text))
            .collect();
        let _ = write!(head, "{}({})", method.name.text, params.join(", "));
        match &method.body {
            None => {
                head.push(';');
                self.line(&head);
            }
            Some(body) => {
                head.push_str(" {");
                self.line(&head);
                self.stmts(&body.stmts);
                self.line("}");
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn stmts(&mut self, stmts: &[Stmt]) {
        self.level += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.level -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.line("{");
                self.stmts(&block.stmts);
                self.line("}");
            }
            Stmt::LocalVar(decl) => {
                let text = format!("{};", local_var(decl));
                self.line(&text);
            }
            Stmt::Expr { expr, .. } => {
                let text = format!("{};", print_expr(expr));
                self.line(&text);
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let head = format!("if ({})", print_expr(cond));
                let mut inline = self.clause(&head, then_branch, false);
                let mut next = else_branch.as_deref();
                while let Some(branch) = next {
                    match branch {
                        Stmt::If {
                            cond,
                            then_branch,
                            else_branch,
                            ..
                        } => {
                            let head = format!("else if ({})", print_expr(cond));
                            inline = self.clause(&head, then_branch, inline);
                            next = else_branch.as_deref();
                        }
                        other => {
                            inline = self.clause("else", other, inline);
                            next = None;
                        }
                    }
                }
                if inline {
                    self.out.push('\n');
                }
            }
            Stmt::While { cond, body, .. } => {
                let head = format!("while ({})", print_expr(cond));
                if self.clause(&head, body, false) {
                    self.out.push('\n');
                }
            }
            Stmt::DoWhile { body, cond, .. } => {
                let tail = format!("while ({});", print_expr(cond));
                if self.clause("do", body, false) {
                    self.out.push(' ');
                    self.out.push_str(&tail);
                    self.out.push('\n');
                } else {
                    self.line(&tail);
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                let init: Vec<String> = init
                    .iter()
                    .map(|s| match s {
                        Stmt::LocalVar(decl) => local_var(decl),
                        Stmt::Expr { expr, .. } => print_expr(expr),
                        _ => String::new(),
                    })
                    .collect();
                let cond = cond.as_ref().map(print_expr).unwrap_or_default();
                let update: Vec<String> = update.iter().map(print_expr).collect();
                let head = format!(
                    "for ({}; {}; {})",
                    init.join(", "),
                    cond,
                    update.join(", ")
                );
                if self.clause(&head, body, false) {
                    self.out.push('\n');
                }
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let text = format!("return {};", print_expr(value));
                    self.line(&text);
                }
                None => self.line("return;"),
            },
            Stmt::Break(_) => self.line("break;"),
            Stmt::Continue(_) => self.line("continue;"),
            Stmt::Empty(_) => self.line(";"),
        }
    }

    /// Print `head` followed by a nested statement. Returns `true` when the
    /// output ends with a closing brace and no newline yet.
    fn clause(&mut self, head: &str, body: &Stmt, continued: bool) -> bool {
        if continued {
            self.out.push(' ');
        } else {
            self.indent();
        }
        self.out.push_str(head);
        match body {
            Stmt::Block(block) => {
                self.out.push_str(" {\n");
                self.stmts(&block.stmts);
                self.indent();
                self.out.push('}');
                true
            }
            other => {
                self.out.push('\n');
                self.level += 1;
                self.stmt(other);
                self.level -= 1;
                false
            }
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn modifiers_prefix(modifiers: &Modifiers) -> String {
    let mut out = String::new();
    for modifier in modifiers.iter() {
        out.push_str(modifier.as_str());
        out.push(' ');
    }
    out
}

fn join_types(types: &[TypeExpr]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn declarators(declarators: &[VarDeclarator]) -> String {
    declarators
        .iter()
        .map(|d| match &d.init {
            Some(init) => format!("{} = {}", d.name.text, print_expr(init)),
            None => d.name.text.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn local_var(decl: &LocalVarDecl) -> String {
    format!(
        "{}{} {}",
        modifiers_prefix(&decl.modifiers),
        decl.ty,
        declarators(&decl.declarators)
    )
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

const PREC_ASSIGN: u8 = 0;
const PREC_CONDITIONAL: u8 = 1;
const PREC_INSTANCEOF: u8 = 8;
const PREC_UNARY: u8 = 12;
const PREC_POSTFIX: u8 = 13;

/// Binding strength of an expression's outermost operator.
fn expr_prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Assign { .. } => PREC_ASSIGN,
        ExprKind::Conditional { .. } => PREC_CONDITIONAL,
        // binary precedences are 1..=10; shift them above the conditional
        ExprKind::Binary { op, .. } => op.precedence() + 1,
        ExprKind::InstanceOf { .. } => PREC_INSTANCEOF,
        ExprKind::Unary { op, .. } if !op.is_postfix() => PREC_UNARY,
        ExprKind::Cast { .. } => PREC_UNARY,
        _ => PREC_POSTFIX,
    }
}

fn write_operand(out: &mut String, expr: &Expr, wrap: bool) {
    if wrap {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

fn write_args(out: &mut String, args: &[Expr]) {
    out.push('(');
    for (idx, arg) in args.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_expr(out, arg);
    }
    out.push(')');
}

fn write_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(lit) => out.push_str(&lit.text),
        ExprKind::Name(name) => out.push_str(&name.dotted()),
        ExprKind::This => out.push_str("this"),
        ExprKind::FieldAccess { target, name } => {
            write_operand(out, target, expr_prec(target) < PREC_POSTFIX);
            out.push('.');
            out.push_str(&name.text);
        }
        ExprKind::MethodCall {
            receiver,
            name,
            args,
        } => {
            match receiver {
                Receiver::Implicit => {}
                Receiver::Super => out.push_str("super."),
                Receiver::Expr(target) => {
                    write_operand(out, target, expr_prec(target) < PREC_POSTFIX);
                    out.push('.');
                }
            }
            out.push_str(&name.text);
            write_args(out, args);
        }
        ExprKind::ConstructorCall { kind, args } => {
            out.push_str(match kind {
                ConstructorCallKind::This => "this",
                ConstructorCallKind::Super => "super",
            });
            write_args(out, args);
        }
        ExprKind::New { class, args } => {
            out.push_str("new ");
            out.push_str(&class.dotted());
            write_args(out, args);
        }
        ExprKind::NewArray {
            element,
            dims,
            extra_dims,
        } => {
            let _ = write!(out, "new {}", element);
            for dim in dims {
                out.push('[');
                write_expr(out, dim);
                out.push(']');
            }
            for _ in 0..*extra_dims {
                out.push_str("[]");
            }
        }
        ExprKind::ArrayAccess { array, index } => {
            write_operand(out, array, expr_prec(array) < PREC_POSTFIX);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        ExprKind::Unary { op, operand } => {
            let mut inner = String::new();
            write_operand(&mut inner, operand, expr_prec(operand) < PREC_UNARY);
            if op.is_postfix() {
                out.push_str(&inner);
                out.push_str(op.as_str());
            } else {
                out.push_str(op.as_str());
                // keep `- -x` and `+ +x` from fusing into `--x` / `++x`
                let sign = op.as_str().chars().last();
                if sign.is_some() && inner.starts_with(|c| Some(c) == sign) {
                    out.push(' ');
                }
                out.push_str(&inner);
            }
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let prec = op.precedence() + 1;
            write_operand(out, lhs, expr_prec(lhs) < prec);
            let _ = write!(out, " {} ", op.as_str());
            write_operand(out, rhs, expr_prec(rhs) <= prec);
        }
        ExprKind::Assign { op, target, value } => {
            write_expr(out, target);
            let _ = write!(out, " {} ", op.as_str());
            write_expr(out, value);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            write_operand(out, cond, expr_prec(cond) <= PREC_CONDITIONAL);
            out.push_str(" ? ");
            write_expr(out, then_expr);
            out.push_str(" : ");
            write_operand(out, else_expr, expr_prec(else_expr) < PREC_CONDITIONAL);
        }
        ExprKind::Cast { ty, expr: inner } => {
            let _ = write!(out, "({}) ", ty);
            write_operand(out, inner, expr_prec(inner) < PREC_UNARY);
        }
        ExprKind::InstanceOf { expr: inner, ty } => {
            write_operand(out, inner, expr_prec(inner) < PREC_INSTANCEOF);
            let _ = write!(out, " instanceof {}", ty);
        }
        ExprKind::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
    }
}
