//! Pass 4: type-check method bodies and field initializers.
//!
//! Every expression is given a [`TypeData`]. Dotted names are decided left
//! to right: the first part is a variable, else a type, else the start of a
//! package prefix; each further part selects a field or a member type, or
//! extends the prefix until it names a class.
//!
//! Definite assignment lives on the variable records. A local declared
//! without an initializer starts unassigned and the first assignment
//! obtains its value. Branches are checked from the same starting state
//! and merged afterwards; anything assigned on only one side is released.
//!
//! ```text
//! if (c) { x = 1; } else { y = 2; }
//!        ├─ then: x ✓ y ✗
//!        ├─ else: x ✗ y ✓
//!        └─ merged: x ✗ y ✗
//! ```

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::Environment;
use crate::base::{FileId, Position, Span};
use crate::hir::InvariantViolation;
use crate::hir::diagnostics::DiagnosticKind;
use crate::hir::resolve::TypeLookup;
use crate::hir::symbols::{
    ClassId, ClassKind, InstanceType, MethodOrigin, PackagePrefix, ScopeId, ScopeKind, TypeData,
    VarId, VariableData,
};
use crate::syntax::ast::{
    AssignOp, BinaryOp, Block, CompilationUnit, ConstructorCallKind, Expr, ExprKind, Literal,
    LiteralKind, LocalVarDecl, Member, MethodDecl, Modifier, Name, PrimitiveType, QualifiedName,
    Receiver, Stmt, TypeDecl, TypeExpr, UnaryOp,
};
use crate::syntax::literals::literal_value;

const KIND: DiagnosticKind = DiagnosticKind::TypeCheck;

pub fn run(units: &mut [CompilationUnit], env: &mut Environment) -> Result<(), InvariantViolation> {
    debug!("bodies: {} files", units.len());
    for unit in units.iter() {
        for decl in super::all_type_decls(unit) {
            let Some(class) = env.class_of(decl) else {
                continue;
            };
            check_class(env, unit.file, decl, class)?;
        }
    }
    Ok(())
}

fn check_class(
    env: &mut Environment,
    file: FileId,
    decl: &TypeDecl,
    class: ClassId,
) -> Result<(), InvariantViolation> {
    let class_scope = env.table.class(class).scope;
    for member in &decl.members {
        match member {
            Member::Field(field) => {
                let is_static = field.modifiers.contains(Modifier::Static);
                for declarator in &field.declarators {
                    let (Some(init), Some(&var)) =
                        (&declarator.init, env.decl_fields.get(&declarator.span))
                    else {
                        continue;
                    };
                    let ty = env.table.var(var).ty.class;
                    let mut checker = BodyChecker::new(env, file, class, class_scope, is_static);
                    checker.initializer(init, ty)?;
                }
            }
            Member::Method(method) => {
                let (Some(body), Some(&scope)) = (&method.body, env.decl_methods.get(&method.span))
                else {
                    continue;
                };
                let is_static = env.table.method(scope).is_some_and(|m| m.is_static());
                let mut checker = BodyChecker::new(env, file, class, scope, is_static);
                checker.method = Some(scope);
                checker.method_body(method, body)?;
            }
            Member::Type(_) => {}
        }
    }
    check_default_constructor(env, decl, class);
    Ok(())
}

/// Final fields left unassigned by the language's default constructor.
fn check_default_constructor(env: &mut Environment, decl: &TypeDecl, class: ClassId) {
    let implicit: Vec<bool> = env
        .table
        .class(class)
        .constructors()
        .map(|(_, scope)| {
            env.table
                .method(scope)
                .is_some_and(|m| m.origin == MethodOrigin::Implicit)
        })
        .collect();
    if implicit.is_empty() || implicit.contains(&false) {
        return;
    }
    for member in &decl.members {
        let Member::Field(field) = member else {
            continue;
        };
        for declarator in &field.declarators {
            let Some(&var) = env.decl_fields.get(&declarator.span) else {
                continue;
            };
            let data = env.table.var(var);
            if data.is_final() && !data.is_static() && !data.has_initializer {
                let message = format!(
                    "variable '{}' not initialized in the default constructor",
                    data.name
                );
                env.diagnostics.type_check(declarator.name.span, message);
            }
        }
    }
}

// ============================================================================
// CHECKER
// ============================================================================

type Snapshot = Vec<(VarId, bool)>;

struct LoopFrame {
    /// Number of locals declared before the loop started.
    outer_locals: usize,
    broken: bool,
}

/// Outcome of walking a dotted name.
enum Selected {
    /// Found by simple name: local, parameter or field in scope.
    Var(VarId),
    /// Selected as a member of another value or type.
    Field(VarId),
    Type(ClassId),
    Package(PackagePrefix),
    /// Already reported.
    Error,
}

/// What a call resolves against, for messages.
enum Callee<'a> {
    Method(&'a str),
    Constructor(ClassId),
}

struct BodyChecker<'e> {
    env: &'e mut Environment,
    file: FileId,
    class: ClassId,
    method: Option<ScopeId>,
    scope: ScopeId,
    is_static: bool,
    /// Final fields the constructor being checked has to assign.
    ctor_finals: Vec<VarId>,
    locals: Vec<VarId>,
    loops: Vec<LoopFrame>,
    reported: FxHashSet<VarId>,
}

impl<'e> BodyChecker<'e> {
    fn new(
        env: &'e mut Environment,
        file: FileId,
        class: ClassId,
        scope: ScopeId,
        is_static: bool,
    ) -> Self {
        Self {
            env,
            file,
            class,
            method: None,
            scope,
            is_static,
            ctor_finals: Vec::new(),
            locals: Vec::new(),
            loops: Vec::new(),
            reported: FxHashSet::default(),
        }
    }

    fn report(&mut self, span: Span, message: impl Into<String>) {
        self.env.diagnostics.type_check(span, message.into());
    }

    fn error(&self) -> ClassId {
        self.env.table.well_known().error
    }

    fn void(&self) -> ClassId {
        self.env.table.well_known().void
    }

    fn prim_class(&self, prim: PrimitiveType) -> ClassId {
        self.env.table.well_known().primitive(prim)
    }

    fn prim(&self, id: ClassId) -> Option<PrimitiveType> {
        self.env.table.class(id).primitive()
    }

    fn kind(&self, id: ClassId) -> ClassKind {
        self.env.table.class(id).kind
    }

    fn is_error(&self, id: ClassId) -> bool {
        self.kind(id) == ClassKind::Error
    }

    fn type_name(&self, id: ClassId) -> SmolStr {
        self.env.table.type_name(id)
    }

    fn in_constructor(&self) -> bool {
        self.method
            .and_then(|scope| self.env.table.method(scope))
            .is_some_and(|m| m.is_constructor())
    }

    fn enter_block(&mut self) -> ScopeId {
        let saved = self.scope;
        self.scope = self.env.table.add_block(saved);
        saved
    }

    // ------------------------------------------------------------------------
    // Definite assignment
    // ------------------------------------------------------------------------

    /// Constructor finals first so earlier snapshots stay prefixes of later ones.
    fn snapshot(&self) -> Snapshot {
        self.ctor_finals
            .iter()
            .chain(&self.locals)
            .map(|var| (*var, self.env.table.var(*var).assigned))
            .collect()
    }

    fn set_assigned(&mut self, var: VarId, assigned: bool) {
        let data = self.env.table.var_mut(var);
        if data.assigned == assigned {
            return;
        }
        let outcome = if assigned {
            data.obtain_value()
        } else {
            data.release_value()
        };
        debug_assert!(outcome.is_ok());
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        for (var, assigned) in snapshot {
            self.set_assigned(*var, *assigned);
        }
    }

    /// Join two branches; `None` is a branch that cannot complete normally.
    fn merge(&mut self, before: &Snapshot, left: Option<Snapshot>, right: Option<Snapshot>) {
        for (idx, (var, was)) in before.iter().enumerate() {
            let on = |side: &Option<Snapshot>| side.as_ref().is_none_or(|s| s[idx].1);
            let assigned = *was || (on(&left) && on(&right));
            self.set_assigned(*var, assigned);
        }
    }

    fn is_tracked(&self, var: VarId, simple: bool) -> bool {
        self.locals.contains(&var) || (simple && self.ctor_finals.contains(&var))
    }

    fn is_local(&self, var: VarId) -> bool {
        let owner = self.env.table.var(var).owner;
        matches!(self.env.table.scope(owner).kind, ScopeKind::Body(_))
    }

    fn is_param(&self, var: VarId) -> bool {
        let owner = self.env.table.var(var).owner;
        self.env
            .table
            .scope(owner)
            .method()
            .is_some_and(|m| m.params.contains(&var))
    }

    fn read_var(&mut self, var: VarId, span: Span, simple: bool) {
        if self.is_tracked(var, simple) && !self.env.table.var(var).assigned {
            let name = self.env.table.var(var).name.clone();
            self.report(span, format!("variable '{}' might not have been initialized", name));
        }
    }

    /// Record an assignment to `var`; `simple` when written by simple name
    /// or through `this`.
    fn assign_var(&mut self, var: VarId, span: Span, compound: bool, simple: bool) {
        if compound {
            self.read_var(var, span, simple);
        }
        let tracked = self.is_tracked(var, simple);
        let data = self.env.table.var(var);
        let (name, is_final, has_initializer, assigned) = (
            data.name.clone(),
            data.is_final(),
            data.has_initializer,
            data.assigned,
        );
        if !is_final {
            if tracked {
                self.set_assigned(var, true);
            }
            return;
        }
        if self.is_param(var) {
            self.report(span, format!("final parameter {} may not be assigned", name));
            return;
        }
        if !tracked || has_initializer {
            self.report(span, format!("cannot assign a value to final variable '{}'", name));
            return;
        }
        if assigned {
            self.report(span, format!("variable '{}' might already have been assigned", name));
            return;
        }
        let in_loop = self.loops.last().is_some_and(|frame| {
            self.ctor_finals.contains(&var)
                || self
                    .locals
                    .iter()
                    .position(|local| *local == var)
                    .is_some_and(|idx| idx < frame.outer_locals)
        });
        if in_loop {
            self.report(span, format!("variable '{}' might be assigned in loop", name));
        }
        self.set_assigned(var, true);
    }

    fn enter_constructor(&mut self) {
        let fields = self.env.table.class(self.class).fields.clone();
        self.ctor_finals = fields
            .into_iter()
            .filter(|field| {
                let data = self.env.table.var(*field);
                data.is_final() && !data.is_static() && !data.has_initializer
            })
            .collect();
        for var in self.ctor_finals.clone() {
            self.set_assigned(var, false);
        }
    }

    fn leave_constructor(&mut self) {
        for var in std::mem::take(&mut self.ctor_finals) {
            self.set_assigned(var, false);
        }
    }

    fn check_finals_assigned(&mut self, span: Span) {
        for var in self.ctor_finals.clone() {
            if !self.env.table.var(var).assigned && self.reported.insert(var) {
                let name = self.env.table.var(var).name.clone();
                self.report(span, format!("variable '{}' might not have been initialized", name));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Bodies and statements
    // ------------------------------------------------------------------------

    fn initializer(&mut self, init: &Expr, ty: ClassId) -> Result<(), InvariantViolation> {
        let value = self.value(init)?;
        self.check_assignable(init, value, ty, init.span);
        Ok(())
    }

    fn method_body(&mut self, method: &MethodDecl, body: &Block) -> Result<(), InvariantViolation> {
        let Some(scope) = self.method else {
            return Ok(());
        };
        let void = self.void();
        let Some((is_ctor, returns_value)) = self
            .env
            .table
            .method(scope)
            .map(|m| (m.is_constructor(), m.return_type.is_some_and(|t| t.class != void)))
        else {
            return Ok(());
        };
        trace!("checking body of '{}'", self.env.describe_method(scope));

        let saved = self.enter_block();
        let mut stmts = body.stmts.as_slice();
        if is_ctor {
            self.enter_constructor();
            let explicit = match stmts.first() {
                Some(Stmt::Expr { expr, .. }) => match &expr.kind {
                    ExprKind::ConstructorCall { kind, args } => Some((*kind, args, expr.span)),
                    _ => None,
                },
                _ => None,
            };
            match explicit {
                Some((kind, args, span)) => {
                    self.constructor_call(kind, args, span)?;
                    stmts = &stmts[1..];
                }
                None => self.implicit_super(method.name.span),
            }
        }

        let completes = self.statements(stmts)?;
        if completes && returns_value {
            let end = body.span.end;
            let brace = Position::new(end.line, end.column.saturating_sub(1));
            self.report(Span::new(self.file, brace, end), "missing return statement");
        }
        if is_ctor {
            if completes {
                self.check_finals_assigned(method.name.span);
            }
            self.leave_constructor();
        }
        self.scope = saved;
        Ok(())
    }

    fn block(&mut self, block: &Block) -> Result<bool, InvariantViolation> {
        let saved = self.enter_block();
        let completes = self.statements(&block.stmts);
        self.scope = saved;
        completes
    }

    /// Check a statement list; returns whether it can complete normally.
    fn statements(&mut self, stmts: &[Stmt]) -> Result<bool, InvariantViolation> {
        let mut live = true;
        let mut reported = false;
        for stmt in stmts {
            if !live && !reported {
                self.report(stmt.span(), "unreachable statement");
                reported = true;
            }
            let completes = self.statement(stmt)?;
            live = live && completes;
        }
        Ok(live)
    }

    fn loop_allowed(&mut self, what: &str, span: Span) {
        if !self.env.config.allow_loops {
            let level = self.env.level_name();
            self.env.diagnostics.not_allowed(KIND, span, what, level);
        }
    }

    /// Check a loop body; returns whether it contains a `break`.
    fn loop_body(&mut self, body: &Stmt, update: &[Expr]) -> Result<bool, InvariantViolation> {
        self.loops.push(LoopFrame {
            outer_locals: self.locals.len(),
            broken: false,
        });
        self.statement(body)?;
        for expr in update {
            self.expr(expr)?;
        }
        Ok(self.loops.pop().is_some_and(|frame| frame.broken))
    }

    fn statement(&mut self, stmt: &Stmt) -> Result<bool, InvariantViolation> {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::LocalVar(decl) => {
                self.local_vars(decl)?;
                Ok(true)
            }
            Stmt::Expr { expr, span } => {
                if let ExprKind::ConstructorCall { kind, args } = &expr.kind {
                    let which = match kind {
                        ConstructorCallKind::This => "this",
                        ConstructorCallKind::Super => "super",
                    };
                    self.report(
                        *span,
                        format!("call to {} must be first statement in constructor", which),
                    );
                    self.arguments(args)?;
                    return Ok(true);
                }
                if !is_statement_expression(expr) {
                    self.report(*span, "not a statement");
                }
                self.expr(expr)?;
                Ok(true)
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.condition(cond)?;
                let before = self.snapshot();
                let then_completes = self.statement(then_branch)?;
                let after_then = then_completes.then(|| self.snapshot());
                self.restore(&before);
                let (else_completes, after_else) = match else_branch {
                    Some(stmt) => {
                        let completes = self.statement(stmt)?;
                        (completes, completes.then(|| self.snapshot()))
                    }
                    None => (true, Some(before.clone())),
                };
                self.merge(&before, after_then, after_else);
                Ok(then_completes || else_completes)
            }
            Stmt::While { cond, body, span } => {
                self.loop_allowed("'while' loop", *span);
                self.condition(cond)?;
                let before = self.snapshot();
                let broken = self.loop_body(body, &[])?;
                self.restore(&before);
                Ok(!is_constant_true(cond) || broken)
            }
            Stmt::DoWhile { body, cond, span } => {
                self.loop_allowed("'do' loop", *span);
                let broken = self.loop_body(body, &[])?;
                self.condition(cond)?;
                Ok(!is_constant_true(cond) || broken)
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                span,
            } => {
                self.loop_allowed("'for' loop", *span);
                let saved = self.enter_block();
                for stmt in init {
                    self.statement(stmt)?;
                }
                if let Some(cond) = cond {
                    self.condition(cond)?;
                }
                let before = self.snapshot();
                let broken = self.loop_body(body, update)?;
                self.restore(&before);
                self.scope = saved;
                let infinite = cond.as_ref().is_none_or(is_constant_true);
                Ok(!infinite || broken)
            }
            Stmt::Return { value, span } => {
                self.return_stmt(value.as_ref(), *span)?;
                Ok(false)
            }
            Stmt::Break(span) => {
                match self.loops.last_mut() {
                    Some(frame) => frame.broken = true,
                    None => self.report(*span, "break outside switch or loop"),
                }
                Ok(false)
            }
            Stmt::Continue(span) => {
                if self.loops.is_empty() {
                    self.report(*span, "continue outside of loop");
                }
                Ok(false)
            }
            Stmt::Empty(_) => Ok(true),
        }
    }

    fn return_stmt(&mut self, value: Option<&Expr>, span: Span) -> Result<(), InvariantViolation> {
        let Some(scope) = self.method else {
            return Ok(());
        };
        let void = self.void();
        let Some((is_ctor, ret)) = self
            .env
            .table
            .method(scope)
            .map(|m| (m.is_constructor(), m.return_type.map(|t| t.class)))
        else {
            return Ok(());
        };
        match (value, ret) {
            (Some(value), Some(ret)) if ret != void => {
                let found = self.value(value)?;
                self.check_assignable(value, found, ret, value.span);
            }
            (Some(value), _) => {
                self.value(value)?;
                self.report(value.span, "incompatible types: unexpected return value");
            }
            (None, Some(ret)) if ret != void => self.report(span, "missing return value"),
            (None, _) => {}
        }
        if is_ctor {
            self.check_finals_assigned(span);
        }
        Ok(())
    }

    fn local_vars(&mut self, decl: &LocalVarDecl) -> Result<(), InvariantViolation> {
        for modifier in decl.modifiers.iter() {
            if modifier != Modifier::Final {
                let message = format!("modifier '{}' not allowed here", modifier);
                self.report(decl.modifiers.span, message);
            } else if !self.env.config.allows_modifier(modifier) {
                let level = self.env.level_name();
                self.env
                    .diagnostics
                    .not_allowed(KIND, decl.modifiers.span, "modifier 'final'", level);
            }
        }
        self.env.check_array_type(&decl.ty, KIND);
        let ty = self.env.resolve_type(self.file, &decl.ty, Some(self.class));

        for declarator in &decl.declarators {
            if let Some(init) = &declarator.init {
                self.initializer(init, ty)?;
            }
            let name = &declarator.name;
            if let Some(existing) = self.env.table.lookup_var(self.scope, &name.text)
                && self.is_local(existing)
            {
                self.already_defined(name);
                continue;
            }
            let mut var = VariableData::new(
                name.text.clone(),
                decl.modifiers.clone(),
                InstanceType::new(ty),
                self.scope,
                declarator.span,
            );
            if declarator.init.is_some() {
                var = var.with_initializer();
            }
            match self.env.table.add_var(self.scope, var) {
                Ok(var) => self.locals.push(var),
                Err(_) => self.already_defined(name),
            }
        }
        Ok(())
    }

    fn already_defined(&mut self, name: &Name) {
        let Some(scope) = self.method else {
            return;
        };
        let what = if self.in_constructor() {
            "constructor"
        } else {
            "method"
        };
        let shown = self.env.describe_method(scope);
        self.report(
            name.span,
            format!(
                "variable '{}' is already defined in {} '{}'",
                name.text, what, shown
            ),
        );
    }

    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    fn first_part(&mut self, part: &Name) -> Selected {
        if let Some(var) = self.env.table.lookup_var(self.scope, &part.text) {
            let data = self.env.table.var(var);
            let instance_field =
                !data.is_static() && matches!(self.env.table.scope(data.owner).kind, ScopeKind::Class(_));
            if instance_field && self.is_static {
                self.report(
                    part.span,
                    format!(
                        "non-static variable '{}' cannot be referenced from a static context",
                        part.text
                    ),
                );
            }
            trace!("'{}' is a variable", part.text);
            return Selected::Var(var);
        }
        match self.env.lookup_type(self.file, &part.text, Some(self.class)) {
            TypeLookup::Found(id) => {
                trace!("'{}' is a type", part.text);
                Selected::Type(id)
            }
            TypeLookup::Ambiguous(candidates) => {
                self.env.report_ambiguous(part.span, &part.text, &candidates);
                Selected::Error
            }
            TypeLookup::NotFound => {
                trace!("'{}' starts a package prefix", part.text);
                Selected::Package(PackagePrefix::new(part.text.clone()))
            }
        }
    }

    fn walk_name(&mut self, parts: &[Name]) -> Result<Selected, InvariantViolation> {
        let Some((first, rest)) = parts.split_first() else {
            return Ok(Selected::Error);
        };
        let mut current = self.first_part(first);
        let mut span = first.span;
        for part in rest {
            let owner = match current {
                Selected::Var(var) => {
                    self.read_var(var, span, true);
                    TypeData::Instance(self.env.table.var(var).ty)
                }
                Selected::Field(var) => TypeData::Instance(self.env.table.var(var).ty),
                Selected::Type(id) => TypeData::Class(id),
                Selected::Package(prefix) => TypeData::Package(prefix),
                Selected::Error => return Ok(Selected::Error),
            };
            current = self.select(owner, part)?;
            span = span.to(part.span);
        }
        Ok(current)
    }

    /// Select `part` as a member of `owner`.
    fn select(&mut self, owner: TypeData, part: &Name) -> Result<Selected, InvariantViolation> {
        match owner {
            TypeData::Package(prefix) => {
                let next = prefix.extend(&part.text);
                trace!("prefix extended to '{}'", next.name);
                Ok(match self.env.table.lookup_declared(&next.name) {
                    Some(id) => Selected::Type(id),
                    None => Selected::Package(next),
                })
            }
            TypeData::Class(id) => {
                if let Some(var) = self.env.table.find_field(id, &part.text) {
                    if !self.env.table.var(var).is_static() {
                        self.report(
                            part.span,
                            format!(
                                "non-static variable '{}' cannot be referenced from a static context",
                                part.text
                            ),
                        );
                    }
                    return Ok(Selected::Field(var));
                }
                let nested = self
                    .env
                    .table
                    .superclass_chain(id)
                    .into_iter()
                    .find_map(|class| self.env.table.class(class).nested.get(&part.text).copied());
                match nested {
                    Some(inner) => Ok(Selected::Type(inner)),
                    None => {
                        self.missing_member(part, id);
                        Ok(Selected::Error)
                    }
                }
            }
            TypeData::Instance(ty) => {
                let id = ty.class;
                match self.kind(id) {
                    ClassKind::Error => Ok(Selected::Error),
                    ClassKind::Primitive(_) | ClassKind::Void | ClassKind::Null => {
                        let name = self.type_name(id);
                        self.report(part.span, format!("{} cannot be dereferenced", name));
                        Ok(Selected::Error)
                    }
                    _ => match self.env.table.find_field(id, &part.text) {
                        Some(var) => Ok(Selected::Field(var)),
                        None => {
                            self.missing_member(part, id);
                            Ok(Selected::Error)
                        }
                    },
                }
            }
        }
    }

    fn missing_member(&mut self, part: &Name, class: ClassId) {
        let class = self.type_name(class);
        self.report(
            part.span,
            format!("cannot find symbol: variable '{}' in '{}'", part.text, class),
        );
    }

    /// Report a prefix that never became a type, naming its shortest
    /// leading part that is not a known package.
    fn unresolved(&mut self, prefix: &PackagePrefix, span: Span) {
        let parts: Vec<&str> = prefix.name.split('.').collect();
        let Some((last, packages)) = parts.split_last() else {
            return;
        };
        if packages.is_empty() {
            self.report(span, format!("cannot find symbol: variable '{}'", last));
            return;
        }
        let missing = (1..=packages.len())
            .map(|n| packages[..n].join("."))
            .find(|candidate| !self.env.table.is_package(candidate));
        let message = match missing {
            Some(package) => format!("package '{}' does not exist", package),
            None => format!(
                "cannot find symbol: class '{}' in package '{}'",
                last,
                packages.join(".")
            ),
        };
        self.report(span, message);
    }

    fn name(&mut self, name: &QualifiedName) -> Result<TypeData, InvariantViolation> {
        let error = TypeData::Instance(InstanceType::new(self.error()));
        Ok(match self.walk_name(&name.parts)? {
            Selected::Var(var) => {
                self.read_var(var, name.span, name.is_simple());
                TypeData::Instance(self.env.table.var(var).ty)
            }
            Selected::Field(var) => TypeData::Instance(self.env.table.var(var).ty),
            Selected::Type(id) => TypeData::Class(id),
            Selected::Package(prefix) => {
                self.unresolved(&prefix, name.span);
                error
            }
            Selected::Error => error,
        })
    }

    /// Type of an assignment target; `compound` targets are also read.
    fn assign_target(&mut self, target: &Expr, compound: bool) -> Result<ClassId, InvariantViolation> {
        let error = self.error();
        match &target.kind {
            ExprKind::Name(name) => match self.walk_name(&name.parts)? {
                Selected::Var(var) => {
                    self.assign_var(var, target.span, compound, name.is_simple());
                    Ok(self.env.table.var(var).ty.class)
                }
                Selected::Field(var) => {
                    self.assign_var(var, target.span, compound, false);
                    Ok(self.env.table.var(var).ty.class)
                }
                Selected::Package(prefix) => {
                    self.unresolved(&prefix, name.span);
                    Ok(error)
                }
                Selected::Type(_) => {
                    self.report(target.span, "unexpected type: required variable, found class");
                    Ok(error)
                }
                Selected::Error => Ok(error),
            },
            ExprKind::FieldAccess { target: owner, name } => {
                let through_this = matches!(owner.kind, ExprKind::This);
                let owner = self.expr(owner)?;
                match self.select(owner, name)? {
                    Selected::Field(var) => {
                        self.assign_var(var, target.span, compound, through_this);
                        Ok(self.env.table.var(var).ty.class)
                    }
                    Selected::Error => Ok(error),
                    _ => {
                        self.report(target.span, "unexpected type: required variable, found class");
                        Ok(error)
                    }
                }
            }
            ExprKind::ArrayAccess { .. } => self.value(target),
            ExprKind::Paren(inner) => self.assign_target(inner, compound),
            _ => {
                self.value(target)?;
                self.report(target.span, "unexpected type: required variable, found value");
                Ok(error)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// Type of an expression used as a value.
    fn value(&mut self, expr: &Expr) -> Result<ClassId, InvariantViolation> {
        match self.expr(expr)? {
            TypeData::Instance(ty) => Ok(ty.class),
            TypeData::Class(id) => {
                let name = self.type_name(id);
                self.report(expr.span, format!("cannot find symbol: variable '{}'", name));
                Ok(self.error())
            }
            TypeData::Package(prefix) => prefix.as_class(),
        }
    }

    fn condition(&mut self, cond: &Expr) -> Result<(), InvariantViolation> {
        let found = self.value(cond)?;
        let boolean = self.prim_class(PrimitiveType::Boolean);
        if found != boolean && !self.is_error(found) {
            let found = self.type_name(found);
            self.env.diagnostics.type_mismatch(cond.span, "boolean", &found);
        }
        Ok(())
    }

    fn arguments(&mut self, args: &[Expr]) -> Result<Vec<ClassId>, InvariantViolation> {
        args.iter().map(|arg| self.value(arg)).collect()
    }

    fn expr(&mut self, expr: &Expr) -> Result<TypeData, InvariantViolation> {
        let instance = |id: ClassId| TypeData::Instance(InstanceType::new(id));
        let span = expr.span;
        let ty = match &expr.kind {
            ExprKind::Literal(literal) => self.literal(literal, span, false),
            ExprKind::Name(name) => return self.name(name),
            ExprKind::This => {
                if self.is_static {
                    self.report(
                        span,
                        "non-static variable 'this' cannot be referenced from a static context",
                    );
                }
                self.class
            }
            ExprKind::FieldAccess { target, name } => {
                let owner = self.expr(target)?;
                return Ok(match self.select(owner, name)? {
                    Selected::Var(var) | Selected::Field(var) => {
                        TypeData::Instance(self.env.table.var(var).ty)
                    }
                    Selected::Type(id) => TypeData::Class(id),
                    Selected::Package(prefix) => {
                        self.unresolved(&prefix, span);
                        instance(self.error())
                    }
                    Selected::Error => instance(self.error()),
                });
            }
            ExprKind::MethodCall {
                receiver,
                name,
                args,
            } => self.call(receiver, name, args)?,
            ExprKind::ConstructorCall { kind, args } => {
                let which = match kind {
                    ConstructorCallKind::This => "this",
                    ConstructorCallKind::Super => "super",
                };
                self.report(
                    span,
                    format!("call to {} must be first statement in constructor", which),
                );
                self.arguments(args)?;
                self.void()
            }
            ExprKind::New { class, args } => {
                let id = self.env.resolve_type(
                    self.file,
                    &TypeExpr::Named(class.clone()),
                    Some(self.class),
                );
                let arg_types = self.arguments(args)?;
                if !self.is_error(id) {
                    if self.env.table.class(id).is_abstract() {
                        let name = self.type_name(id);
                        self.report(span, format!("'{}' is abstract; cannot be instantiated", name));
                    } else {
                        let ctors: Vec<ScopeId> =
                            self.env.table.class(id).constructors().map(|(_, s)| s).collect();
                        self.choose(&ctors, &arg_types, Callee::Constructor(id), class.span);
                    }
                }
                id
            }
            ExprKind::NewArray {
                element,
                dims,
                extra_dims,
            } => {
                if !self.env.config.allow_arrays {
                    let level = self.env.level_name();
                    self.env
                        .diagnostics
                        .not_allowed(KIND, span, "array creation", level);
                }
                let mut ty = self.env.resolve_type(self.file, element, Some(self.class));
                for dim in dims {
                    self.index(dim)?;
                }
                if !self.is_error(ty) {
                    for _ in 0..dims.len() + extra_dims {
                        ty = self.env.table.array_of(ty);
                    }
                }
                ty
            }
            ExprKind::ArrayAccess { array, index } => {
                let array_ty = self.value(array)?;
                self.index(index)?;
                match self.kind(array_ty) {
                    ClassKind::Array(element) => element,
                    ClassKind::Error => self.error(),
                    _ => {
                        let name = self.type_name(array_ty);
                        self.report(span, format!("array required, but '{}' found", name));
                        self.error()
                    }
                }
            }
            ExprKind::Unary { op, operand } => self.unary(*op, operand, span)?,
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, span)?,
            ExprKind::Assign { op, target, value } => {
                let found = self.value(value)?;
                let target_ty = self.assign_target(target, *op != AssignOp::Assign)?;
                self.compound_assign(*op, value, found, target_ty, span);
                target_ty
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.condition(cond)?;
                let then_ty = self.value(then_expr)?;
                let else_ty = self.value(else_expr)?;
                self.conditional(then_ty, else_ty, span)
            }
            ExprKind::Cast { ty, expr: inner } => {
                self.env.check_array_type(ty, KIND);
                let target = self.env.resolve_type(self.file, ty, Some(self.class));
                let source = self.value(inner)?;
                if !self.is_error(target) && !self.is_error(source) && !self.castable(source, target)
                {
                    let (to, from) = (self.type_name(target), self.type_name(source));
                    self.env.diagnostics.type_mismatch(span, &to, &from);
                }
                target
            }
            ExprKind::InstanceOf { expr: inner, ty } => {
                let source = self.value(inner)?;
                let target = self.env.resolve_type(self.file, ty, Some(self.class));
                let reference = |c: &Self, id: ClassId| c.kind(id).is_reference() || c.is_error(id);
                if !reference(self, source) || !reference(self, target) {
                    self.report(span, "unexpected type: required reference, found primitive");
                } else if !self.is_error(source)
                    && !self.is_error(target)
                    && !self.castable(source, target)
                {
                    let (to, from) = (self.type_name(target), self.type_name(source));
                    self.env.diagnostics.type_mismatch(span, &to, &from);
                }
                self.prim_class(PrimitiveType::Boolean)
            }
            ExprKind::Paren(inner) => return self.expr(inner),
        };
        Ok(instance(ty))
    }

    fn index(&mut self, index: &Expr) -> Result<(), InvariantViolation> {
        let found = self.value(index)?;
        let int = self.prim_class(PrimitiveType::Int);
        if !self.is_error(found) && !self.env.table.is_assignable(found, int) {
            let found = self.type_name(found);
            self.env.diagnostics.type_mismatch(index.span, "int", &found);
        }
        Ok(())
    }

    fn literal(&mut self, literal: &Literal, span: Span, negated: bool) -> ClassId {
        match literal.kind {
            LiteralKind::Int | LiteralKind::Long => {
                let long = literal.kind == LiteralKind::Long;
                if !integer_fits(&literal.text, negated, long) {
                    self.report(span, "integer number too large");
                }
                self.prim_class(if long {
                    PrimitiveType::Long
                } else {
                    PrimitiveType::Int
                })
            }
            LiteralKind::Float => self.prim_class(PrimitiveType::Float),
            LiteralKind::Double => self.prim_class(PrimitiveType::Double),
            LiteralKind::Char | LiteralKind::String => {
                if let Err(err) = literal_value(&literal.text) {
                    self.report(span, err.to_string());
                }
                if literal.kind == LiteralKind::Char {
                    self.prim_class(PrimitiveType::Char)
                } else {
                    self.env.table.well_known().string
                }
            }
            LiteralKind::Bool => self.prim_class(PrimitiveType::Boolean),
            LiteralKind::Null => self.env.table.well_known().null,
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Result<ClassId, InvariantViolation> {
        let found = if op.is_increment() {
            self.assign_target(operand, true)?
        } else if op == UnaryOp::Neg
            && let ExprKind::Literal(literal) = &operand.kind
        {
            self.literal(literal, operand.span, true)
        } else {
            self.value(operand)?
        };
        if self.is_error(found) {
            return Ok(found);
        }
        let prim = self.prim(found);
        let result = match op {
            UnaryOp::Not => (prim == Some(PrimitiveType::Boolean)).then_some(found),
            UnaryOp::BitNot => prim
                .filter(|p| p.is_integral())
                .map(|p| self.prim_class(promoted(p, p))),
            UnaryOp::Neg | UnaryOp::Plus => prim
                .filter(|p| p.is_numeric())
                .map(|p| self.prim_class(promoted(p, p))),
            _ => prim.filter(|p| p.is_numeric()).map(|_| found),
        };
        Ok(match result {
            Some(ty) => ty,
            None => {
                let name = self.type_name(found);
                self.report(
                    span,
                    format!("bad operand type '{}' for unary operator '{}'", name, op.as_str()),
                );
                self.error()
            }
        })
    }

    fn numeric_pair(&self, left: ClassId, right: ClassId) -> Option<PrimitiveType> {
        match (self.prim(left), self.prim(right)) {
            (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => Some(promoted(a, b)),
            _ => None,
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<ClassId, InvariantViolation> {
        let left = self.value(lhs)?;
        let right = self.value(rhs)?;
        if self.is_error(left) || self.is_error(right) {
            return Ok(self.error());
        }
        let known = self.env.table.well_known().clone();
        let boolean = known.primitive(PrimitiveType::Boolean);
        let both_boolean = left == boolean && right == boolean;
        let result = match op {
            BinaryOp::And | BinaryOp::Or => both_boolean.then_some(boolean),
            BinaryOp::Add if left == known.string || right == known.string => {
                (left != known.void && right != known.void).then_some(known.string)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => self
                .numeric_pair(left, right)
                .map(|p| known.primitive(p)),
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
                match (self.prim(left), self.prim(right)) {
                    (Some(a), Some(b)) if a.is_integral() && b.is_integral() => {
                        Some(known.primitive(promoted(a, a)))
                    }
                    _ => None,
                }
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.numeric_pair(left, right).map(|_| boolean)
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if !self.comparable(left, right) {
                    let (a, b) = (self.type_name(left), self.type_name(right));
                    self.report(span, format!("incomparable types: '{}' and '{}'", a, b));
                }
                Some(boolean)
            }
            BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::BitOr => {
                if both_boolean {
                    Some(boolean)
                } else {
                    match (self.prim(left), self.prim(right)) {
                        (Some(a), Some(b)) if a.is_integral() && b.is_integral() => {
                            Some(known.primitive(promoted(a, b)))
                        }
                        _ => None,
                    }
                }
            }
        };
        Ok(match result {
            Some(ty) => ty,
            None => {
                let (a, b) = (self.type_name(left), self.type_name(right));
                self.report(
                    span,
                    format!(
                        "bad operand types for binary operator '{}': '{}' and '{}'",
                        op.as_str(),
                        a,
                        b
                    ),
                );
                known.error
            }
        })
    }

    fn comparable(&self, left: ClassId, right: ClassId) -> bool {
        match (self.prim(left), self.prim(right)) {
            (Some(a), Some(b)) => (a.is_numeric() && b.is_numeric()) || a == b,
            (None, None) => self.castable(left, right),
            _ => false,
        }
    }

    /// Whether a cast from `from` to `to` may succeed at run time.
    fn castable(&self, from: ClassId, to: ClassId) -> bool {
        let table = &self.env.table;
        match (self.prim(from), self.prim(to)) {
            (Some(a), Some(b)) => (a.is_numeric() && b.is_numeric()) || a == b,
            (None, None) => {
                let (from_kind, to_kind) = (self.kind(from), self.kind(to));
                if !from_kind.is_reference() || !to_kind.is_reference() {
                    return false;
                }
                let open = |id: ClassId| {
                    let class = table.class(id);
                    class.is_interface() || (class.kind == ClassKind::Class && !class.is_final())
                };
                table.is_assignable(from, to)
                    || table.is_assignable(to, from)
                    || (table.class(from).is_interface() && open(to))
                    || (table.class(to).is_interface() && open(from))
            }
            _ => false,
        }
    }

    fn conditional(&mut self, then_ty: ClassId, else_ty: ClassId, span: Span) -> ClassId {
        if self.is_error(then_ty) || self.is_error(else_ty) {
            return self.error();
        }
        if then_ty == else_ty {
            return then_ty;
        }
        if let Some(prim) = self.numeric_pair(then_ty, else_ty) {
            return self.prim_class(prim);
        }
        let table = &self.env.table;
        if self.kind(then_ty).is_reference() && self.kind(else_ty).is_reference() {
            return if table.is_assignable(then_ty, else_ty) {
                else_ty
            } else if table.is_assignable(else_ty, then_ty) {
                then_ty
            } else {
                table.well_known().object
            };
        }
        self.report(span, "incompatible types: bad type in conditional expression");
        self.error()
    }

    fn compound_assign(&mut self, op: AssignOp, value: &Expr, found: ClassId, target: ClassId, span: Span) {
        if self.is_error(found) || self.is_error(target) {
            return;
        }
        match op.binary() {
            None => self.check_assignable(value, found, target, value.span),
            Some(BinaryOp::Add) if target == self.env.table.well_known().string => {}
            Some(bin) => {
                if self.numeric_pair(target, found).is_none() {
                    let (a, b) = (self.type_name(target), self.type_name(found));
                    self.report(
                        span,
                        format!(
                            "bad operand types for binary operator '{}': '{}' and '{}'",
                            bin.as_str(),
                            a,
                            b
                        ),
                    );
                }
            }
        }
    }

    /// Assignment conversion, including narrowing of `int` constants.
    fn check_assignable(&mut self, expr: &Expr, found: ClassId, expected: ClassId, span: Span) {
        if self.env.table.is_assignable(found, expected) {
            return;
        }
        let int = self.prim_class(PrimitiveType::Int);
        if found == int
            && let Some(target) = self.prim(expected)
            && let Some(value) = int_constant(expr)
        {
            let fits = match target {
                PrimitiveType::Byte => i8::try_from(value).is_ok(),
                PrimitiveType::Short => i16::try_from(value).is_ok(),
                PrimitiveType::Char => u16::try_from(value).is_ok(),
                _ => false,
            };
            if fits {
                return;
            }
        }
        let (expected, found) = (self.type_name(expected), self.type_name(found));
        self.env.diagnostics.type_mismatch(span, &expected, &found);
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn call(
        &mut self,
        receiver: &Receiver,
        name: &Name,
        args: &[Expr],
    ) -> Result<ClassId, InvariantViolation> {
        let arg_types = self.arguments(args)?;
        let error = self.error();
        let (candidates, static_only) = match receiver {
            Receiver::Implicit => {
                let mut found = Vec::new();
                let mut current = Some(self.class);
                while let Some(class) = current {
                    found = self.env.table.find_methods(class, &name.text);
                    if !found.is_empty() {
                        break;
                    }
                    current = self.env.table.class(class).enclosing;
                }
                (found, self.is_static)
            }
            Receiver::Super => {
                if self.is_static {
                    self.report(
                        name.span,
                        "non-static variable 'super' cannot be referenced from a static context",
                    );
                }
                let object = self.env.table.well_known().object;
                let sup = self.env.table.class(self.class).superclass.unwrap_or(object);
                (self.env.table.find_methods(sup, &name.text), false)
            }
            Receiver::Expr(target) => match self.expr(target)? {
                TypeData::Class(id) => (self.env.table.find_methods(id, &name.text), true),
                TypeData::Instance(ty) => match self.kind(ty.class) {
                    ClassKind::Error => return Ok(error),
                    ClassKind::Primitive(_) | ClassKind::Void | ClassKind::Null => {
                        let shown = self.type_name(ty.class);
                        self.report(name.span, format!("{} cannot be dereferenced", shown));
                        return Ok(error);
                    }
                    _ => (self.env.table.find_methods(ty.class, &name.text), false),
                },
                TypeData::Package(prefix) => {
                    (self.env.table.find_methods(prefix.as_class()?, &name.text), true)
                }
            },
        };

        let Some(chosen) = self.choose(&candidates, &arg_types, Callee::Method(&name.text), name.span)
        else {
            return Ok(error);
        };
        let void = self.void();
        let Some((is_static, is_abstract, ret, owner)) = self
            .env
            .table
            .method(chosen)
            .map(|m| (m.is_static(), m.is_abstract(), m.return_type, m.class))
        else {
            return Ok(error);
        };
        if static_only && !is_static {
            let shown = self.env.describe_method(chosen);
            self.report(
                name.span,
                format!(
                    "non-static method '{}' cannot be referenced from a static context",
                    shown
                ),
            );
        }
        if matches!(receiver, Receiver::Super) && is_abstract {
            let (shown, owner) = (self.env.describe_method(chosen), self.type_name(owner));
            self.report(
                name.span,
                format!("abstract method '{}' in '{}' cannot be accessed directly", shown, owner),
            );
        }
        Ok(ret.map_or(void, |t| t.class))
    }

    fn applicable(&self, method: ScopeId, args: &[ClassId]) -> bool {
        let params = self.env.table.param_types(method);
        params.len() == args.len()
            && args
                .iter()
                .zip(&params)
                .all(|(arg, param)| self.env.table.is_assignable(*arg, *param))
    }

    fn more_specific(&self, a: ScopeId, b: ScopeId) -> bool {
        let (a, b) = (self.env.table.param_types(a), self.env.table.param_types(b));
        a.iter()
            .zip(&b)
            .all(|(x, y)| self.env.table.is_assignable(*x, *y))
    }

    /// Pick the most specific applicable candidate, reporting when none
    /// or several qualify.
    fn choose(
        &mut self,
        candidates: &[ScopeId],
        args: &[ClassId],
        callee: Callee<'_>,
        span: Span,
    ) -> Option<ScopeId> {
        if args.iter().any(|arg| self.is_error(*arg)) {
            return None;
        }
        let applicable: Vec<ScopeId> = candidates
            .iter()
            .copied()
            .filter(|scope| self.applicable(*scope, args))
            .collect();
        let best: Vec<ScopeId> = applicable
            .iter()
            .copied()
            .filter(|a| {
                applicable
                    .iter()
                    .all(|b| a == b || self.more_specific(*a, *b))
            })
            .collect();
        if let [chosen] = best.as_slice() {
            return Some(*chosen);
        }

        let (kind, name) = match callee {
            Callee::Method(name) => ("method", SmolStr::new(name)),
            Callee::Constructor(class) => ("constructor", self.env.table.class(class).name.clone()),
        };
        let shown = self.env.describe_sig(&name, args);
        let message = if !applicable.is_empty() {
            format!("reference to '{}' is ambiguous", name)
        } else {
            match candidates {
                [] => format!("cannot find symbol: {} {}", kind, shown),
                [only] => {
                    let owner = self
                        .env
                        .table
                        .method(*only)
                        .map(|m| self.type_name(m.class))
                        .unwrap_or_default();
                    format!(
                        "{} '{}' in class '{}' cannot be applied to given types",
                        kind, name, owner
                    )
                }
                _ => format!("no suitable {} found for {}", kind, shown),
            }
        };
        self.report(span, message);
        None
    }

    fn constructor_call(
        &mut self,
        kind: ConstructorCallKind,
        args: &[Expr],
        span: Span,
    ) -> Result<(), InvariantViolation> {
        let arg_types = self.arguments(args)?;
        let object = self.env.table.well_known().object;
        let target = match kind {
            ConstructorCallKind::This => self.class,
            ConstructorCallKind::Super => self.env.table.class(self.class).superclass.unwrap_or(object),
        };
        let ctors: Vec<ScopeId> = self
            .env
            .table
            .class(target)
            .constructors()
            .map(|(_, scope)| scope)
            .collect();
        let Some(chosen) = self.choose(&ctors, &arg_types, Callee::Constructor(target), span) else {
            return Ok(());
        };
        if kind == ConstructorCallKind::This {
            if Some(chosen) == self.method {
                self.report(span, "recursive constructor invocation");
            }
            for var in self.ctor_finals.clone() {
                self.set_assigned(var, true);
            }
        }
        Ok(())
    }

    /// A constructor without `this(...)` or `super(...)` calls `super()`.
    fn implicit_super(&mut self, span: Span) {
        let Some(sup) = self.env.table.class(self.class).superclass else {
            return;
        };
        let ctors: Vec<ScopeId> = self
            .env
            .table
            .class(sup)
            .constructors()
            .map(|(_, scope)| scope)
            .collect();
        if !ctors.is_empty() && ctors.iter().all(|s| !self.env.table.param_types(*s).is_empty()) {
            let name = self.type_name(sup);
            self.report(
                span,
                format!(
                    "constructor '{}' in class '{}' cannot be applied to given types",
                    name, name
                ),
            );
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Binary numeric promotion; never narrower than `int`.
fn promoted(a: PrimitiveType, b: PrimitiveType) -> PrimitiveType {
    match a.numeric_rank().max(b.numeric_rank()) {
        6 => PrimitiveType::Double,
        5 => PrimitiveType::Float,
        4 => PrimitiveType::Long,
        _ => PrimitiveType::Int,
    }
}

fn is_constant_true(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(literal) => literal.kind == LiteralKind::Bool && literal.text == "true",
        ExprKind::Paren(inner) => is_constant_true(inner),
        _ => false,
    }
}

fn is_statement_expression(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Assign { .. }
        | ExprKind::MethodCall { .. }
        | ExprKind::New { .. }
        | ExprKind::ConstructorCall { .. } => true,
        ExprKind::Unary { op, .. } => op.is_increment(),
        _ => false,
    }
}

fn parse_integer(text: &str) -> Option<(u64, bool)> {
    let digits: String = text
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    u64::from_str_radix(body, radix)
        .ok()
        .map(|value| (value, radix == 10))
}

/// Whether an integer literal is in range; a decimal literal may reach one
/// past the maximum when negated.
fn integer_fits(text: &str, negated: bool, long: bool) -> bool {
    let Some((value, decimal)) = parse_integer(text) else {
        return false;
    };
    let max = match (decimal, long) {
        (true, false) => i32::MAX as u64 + u64::from(negated),
        (true, true) => i64::MAX as u64 + u64::from(negated),
        (false, false) => u64::from(u32::MAX),
        (false, true) => u64::MAX,
    };
    value <= max
}

/// Value of an `int` constant expression made of a literal, `-` and parens.
fn int_constant(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(literal) if literal.kind == LiteralKind::Int => {
            let (value, decimal) = parse_integer(&literal.text)?;
            if decimal {
                i64::try_from(value).ok()
            } else {
                u32::try_from(value).ok().map(|v| i64::from(v as i32))
            }
        }
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => int_constant(operand).map(|v| -v),
        ExprKind::Paren(inner) => int_constant(inner),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/tests_bodies.rs"]
mod tests;
