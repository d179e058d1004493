//! Pass 5: append the level's generated members as source.
//!
//! Only files without diagnostics are augmented. Generated members are
//! appended after the user's members in table order and every type
//! reference they contain is spelled out, so the printed unit compiles
//! without the level's shorthand:
//!
//! ```text
//! class Point { int x; }        public Point(int x) { this.x = x; }
//!        │                      public int x() { return this.x; }
//!        └── elementary ──────► public String toString() { ... }
//!                               public boolean equals(Object o) { ... }
//!                               public int hashCode() { ... }
//! ```

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::Environment;
use crate::base::Span;
use crate::hir::InvariantViolation;
use crate::hir::symbols::{ClassId, ClassKind, ClassState, MethodOrigin, ScopeId};
use crate::syntax::ast::{
    AssignOp, BinaryOp, Block, CompilationUnit, ConstructorCallKind, Expr, ExprKind, Literal,
    LiteralKind, LocalVarDecl, Member, MethodDecl, Modifier, Modifiers, Name, Param,
    PrimitiveType, QualifiedName, Receiver, Stmt, TypeDecl, TypeExpr, VarDeclarator,
};
use crate::syntax::literals::escape;
use crate::syntax::printer::{PrintOptions, print_unit};

pub fn run(units: &mut [CompilationUnit], env: &mut Environment) -> Result<(), InvariantViolation> {
    debug!("augment: {} files", units.len());
    for unit in units.iter_mut() {
        if !env.is_clean(unit.file) {
            let path = env
                .files
                .path(unit.file)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            warn!("not augmenting '{}': it has diagnostics", path);
            continue;
        }
        let package = unit.package_name();
        for decl in unit.types.iter_mut() {
            augment_type(env, &package, decl)?;
        }
        let text = print_unit(unit, &PrintOptions::default());
        env.outputs.insert(unit.file, text);
    }
    Ok(())
}

fn augment_type(
    env: &mut Environment,
    package: &str,
    decl: &mut TypeDecl,
) -> Result<(), InvariantViolation> {
    for member in decl.members.iter_mut() {
        if let Member::Type(inner) = member {
            augment_type(env, package, inner)?;
        }
    }
    let Some(id) = env.class_of(decl) else {
        return Err(InvariantViolation::Uncataloged(decl.span));
    };
    let generated: Vec<ScopeId> = env
        .table
        .class(id)
        .methods
        .values()
        .copied()
        .filter(|scope| {
            env.table
                .method(*scope)
                .is_some_and(|m| m.origin == MethodOrigin::Generated)
        })
        .collect();

    let builder = Builder {
        env: &*env,
        package,
        class: id,
        span: decl.span,
    };
    let mut methods = Vec::with_capacity(generated.len());
    for scope in generated {
        methods.push(builder.method(scope)?);
    }
    trace!("'{}' gains {} members", decl.name.text, methods.len());
    decl.members.extend(methods.into_iter().map(Member::Method));
    env.table.class_mut(id).state = ClassState::Augmented;
    Ok(())
}

// ============================================================================
// BUILDER
// ============================================================================

/// Syntax factory for the generated members of one class. Every node
/// carries the class declaration's span.
struct Builder<'a> {
    env: &'a Environment,
    package: &'a str,
    class: ClassId,
    span: Span,
}

impl Builder<'_> {
    fn name(&self, text: &str) -> Name {
        Name::new(text, self.span)
    }

    fn expr(&self, kind: ExprKind) -> Expr {
        Expr::new(kind, self.span)
    }

    fn var(&self, name: &str) -> Expr {
        self.expr(ExprKind::Name(QualifiedName::simple(self.name(name))))
    }

    fn this(&self) -> Expr {
        self.expr(ExprKind::This)
    }

    fn field(&self, target: Expr, name: &str) -> Expr {
        self.expr(ExprKind::FieldAccess {
            target: Box::new(target),
            name: self.name(name),
        })
    }

    fn this_field(&self, name: &str) -> Expr {
        self.field(self.this(), name)
    }

    fn literal(&self, kind: LiteralKind, text: impl Into<SmolStr>) -> Expr {
        self.expr(ExprKind::Literal(Literal {
            kind,
            text: text.into(),
        }))
    }

    fn int(&self, value: i32) -> Expr {
        self.literal(LiteralKind::Int, value.to_string())
    }

    fn string(&self, text: &str) -> Expr {
        self.literal(LiteralKind::String, format!("\"{}\"", escape(text)))
    }

    fn boolean(&self, value: bool) -> Expr {
        self.literal(LiteralKind::Bool, if value { "true" } else { "false" })
    }

    fn binary(&self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn call(&self, target: Expr, name: &str, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::MethodCall {
            receiver: Receiver::Expr(Box::new(target)),
            name: self.name(name),
            args,
        })
    }

    fn conditional(&self, cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        self.expr(ExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn assign(&self, target: Expr, value: Expr) -> Stmt {
        self.stmt(self.expr(ExprKind::Assign {
            op: AssignOp::Assign,
            target: Box::new(target),
            value: Box::new(value),
        }))
    }

    fn stmt(&self, expr: Expr) -> Stmt {
        Stmt::Expr {
            expr,
            span: self.span,
        }
    }

    fn ret(&self, value: Expr) -> Stmt {
        Stmt::Return {
            value: Some(value),
            span: self.span,
        }
    }

    fn local(&self, ty: TypeExpr, name: &str, init: Expr) -> Stmt {
        Stmt::LocalVar(LocalVarDecl {
            modifiers: Modifiers::empty(self.span),
            ty,
            declarators: vec![VarDeclarator {
                name: self.name(name),
                init: Some(init),
                span: self.span,
            }],
            span: self.span,
        })
    }

    fn if_then(&self, cond: Expr, then: Vec<Stmt>) -> Stmt {
        Stmt::If {
            cond,
            then_branch: Box::new(Stmt::Block(self.block(then))),
            else_branch: None,
            span: self.span,
        }
    }

    fn block(&self, stmts: Vec<Stmt>) -> Block {
        Block {
            stmts,
            span: self.span,
        }
    }

    /// Source spelling of a type as seen from this class's file.
    fn type_expr(&self, id: ClassId) -> TypeExpr {
        let class = self.env.table.class(id);
        match class.kind {
            ClassKind::Primitive(prim) => TypeExpr::Primitive(prim, self.span),
            ClassKind::Void => TypeExpr::Void(self.span),
            ClassKind::Array(element) => {
                TypeExpr::Array(Box::new(self.type_expr(element)), self.span)
            }
            _ => {
                let visible = class.package == "java.lang" || class.package == self.package;
                let text = match class.qname.strip_prefix(class.package.as_str()) {
                    Some(rest) if visible && !class.package.is_empty() => {
                        rest.trim_start_matches('.')
                    }
                    _ => class.qname.as_str(),
                };
                let parts = text.split('.').map(|part| self.name(part)).collect();
                TypeExpr::Named(QualifiedName {
                    parts,
                    span: self.span,
                })
            }
        }
    }

    fn fields(&self) -> Vec<(SmolStr, ClassId)> {
        self.env
            .table
            .class(self.class)
            .fields
            .iter()
            .map(|field| self.env.table.var(*field))
            .filter(|var| !var.is_static())
            .map(|var| (var.name.clone(), var.ty.class))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    fn method(&self, scope: ScopeId) -> Result<MethodDecl, InvariantViolation> {
        let Some(method) = self.env.table.method(scope) else {
            return Err(InvariantViolation::UnknownGenerated(SmolStr::default()));
        };
        let params: Vec<(SmolStr, ClassId)> = method
            .params
            .iter()
            .map(|p| {
                let var = self.env.table.var(*p);
                (var.name.clone(), var.ty.class)
            })
            .collect();
        let fields = self.fields();
        let name = method.name.clone();

        let stmts = if method.is_constructor() {
            let forwarded = self.env.super_args.get(&scope).copied().unwrap_or(0);
            self.constructor_body(&params, forwarded)
        } else if params.is_empty() && fields.iter().any(|(field, _)| *field == name) {
            vec![self.ret(self.this_field(&name))]
        } else {
            match name.as_str() {
                "toString" => self.to_string_body(&fields),
                "equals" => self.equals_body(&fields),
                "hashCode" => self.hash_code_body(&fields),
                _ => return Err(InvariantViolation::UnknownGenerated(name)),
            }
        };

        let mut modifiers = Modifiers::empty(self.span);
        modifiers.push(Modifier::Public);
        let class_name = self.env.table.class(self.class).name.clone();
        Ok(MethodDecl {
            modifiers,
            return_type: method.return_type.map(|ty| self.type_expr(ty.class)),
            name: self.name(if method.is_constructor() {
                &class_name
            } else {
                &name
            }),
            params: params
                .iter()
                .map(|(param, ty)| Param {
                    modifiers: Modifiers::empty(self.span),
                    ty: self.type_expr(*ty),
                    name: self.name(param),
                    span: self.span,
                })
                .collect(),
            body: Some(self.block(stmts)),
            span: self.span,
        })
    }

    /// `super(<forwarded>)` then one assignment per remaining parameter.
    fn constructor_body(&self, params: &[(SmolStr, ClassId)], forwarded: usize) -> Vec<Stmt> {
        let (to_super, to_fields) = params.split_at(forwarded.min(params.len()));
        let mut stmts = Vec::with_capacity(to_fields.len() + 1);
        if !to_super.is_empty() {
            let args = to_super.iter().map(|(name, _)| self.var(name)).collect();
            stmts.push(self.stmt(self.expr(ExprKind::ConstructorCall {
                kind: ConstructorCallKind::Super,
                args,
            })));
        }
        for (name, _) in to_fields {
            stmts.push(self.assign(self.this_field(name), self.var(name)));
        }
        stmts
    }

    /// `"Name(" + this.a + ", " + this.b + ")"`
    fn to_string_body(&self, fields: &[(SmolStr, ClassId)]) -> Vec<Stmt> {
        let class_name = self.env.table.class(self.class).name.clone();
        if fields.is_empty() {
            return vec![self.ret(self.string(&format!("{}()", class_name)))];
        }
        let mut text = self.string(&format!("{}(", class_name));
        for (idx, (field, _)) in fields.iter().enumerate() {
            if idx > 0 {
                text = self.binary(BinaryOp::Add, text, self.string(", "));
            }
            text = self.binary(BinaryOp::Add, text, self.this_field(field));
        }
        text = self.binary(BinaryOp::Add, text, self.string(")"));
        vec![self.ret(text)]
    }

    fn equals_body(&self, fields: &[(SmolStr, ClassId)]) -> Vec<Stmt> {
        let null = || self.literal(LiteralKind::Null, "null");
        let mut stmts = vec![
            self.if_then(
                self.binary(BinaryOp::Eq, self.this(), self.var("o")),
                vec![self.ret(self.boolean(true))],
            ),
            self.if_then(
                self.binary(
                    BinaryOp::Or,
                    self.binary(BinaryOp::Eq, self.var("o"), null()),
                    self.binary(
                        BinaryOp::Ne,
                        self.call(self.this(), "getClass", Vec::new()),
                        self.call(self.var("o"), "getClass", Vec::new()),
                    ),
                ),
                vec![self.ret(self.boolean(false))],
            ),
        ];
        if fields.is_empty() {
            stmts.push(self.ret(self.boolean(true)));
            return stmts;
        }

        let own = self.type_expr(self.class);
        let cast = self.expr(ExprKind::Cast {
            ty: own.clone(),
            expr: Box::new(self.var("o")),
        });
        stmts.push(self.local(own, "other", cast));

        let mut result: Option<Expr> = None;
        for (field, ty) in fields {
            let mine = || self.this_field(field);
            let theirs = || self.field(self.var("other"), field);
            let same = if self.env.table.class(*ty).primitive().is_some() {
                self.binary(BinaryOp::Eq, mine(), theirs())
            } else {
                self.conditional(
                    self.binary(BinaryOp::Eq, mine(), null()),
                    self.binary(BinaryOp::Eq, theirs(), null()),
                    self.call(mine(), "equals", vec![theirs()]),
                )
            };
            result = Some(match result {
                Some(acc) => self.binary(BinaryOp::And, acc, same),
                None => same,
            });
        }
        if let Some(result) = result {
            stmts.push(self.ret(result));
        }
        stmts
    }

    fn hash_code_body(&self, fields: &[(SmolStr, ClassId)]) -> Vec<Stmt> {
        let int = TypeExpr::Primitive(PrimitiveType::Int, self.span);
        let seed = self.call(
            self.call(self.this(), "getClass", Vec::new()),
            "hashCode",
            Vec::new(),
        );
        let mut stmts = vec![self.local(int.clone(), "result", seed)];
        for (field, ty) in fields {
            let hash = self.field_hash(field, *ty, &int);
            let scaled = self.binary(BinaryOp::Mul, self.int(31), self.var("result"));
            stmts.push(self.assign(
                self.var("result"),
                self.binary(BinaryOp::Add, scaled, hash),
            ));
        }
        stmts.push(self.ret(self.var("result")));
        stmts
    }

    /// An `int` hash of one field.
    fn field_hash(&self, field: &str, ty: ClassId, int: &TypeExpr) -> Expr {
        let value = || self.this_field(field);
        match self.env.table.class(ty).primitive() {
            Some(PrimitiveType::Boolean) => {
                self.conditional(value(), self.int(1231), self.int(1237))
            }
            Some(PrimitiveType::Long) => {
                let shifted = self.binary(BinaryOp::UShr, value(), self.int(32));
                self.expr(ExprKind::Cast {
                    ty: int.clone(),
                    expr: Box::new(self.binary(BinaryOp::BitXor, value(), shifted)),
                })
            }
            Some(PrimitiveType::Float) => {
                self.call(self.var("Float"), "hashCode", vec![value()])
            }
            Some(PrimitiveType::Double) => {
                self.call(self.var("Double"), "hashCode", vec![value()])
            }
            Some(_) => value(),
            None => self.conditional(
                self.binary(
                    BinaryOp::Eq,
                    value(),
                    self.literal(LiteralKind::Null, "null"),
                ),
                self.int(0),
                self.call(value(), "hashCode", Vec::new()),
            ),
        }
    }
}

#[cfg(test)]
#[path = "tests/tests_augment.rs"]
mod tests;
