//! Pass 3: bind fields, methods and level-generated members.
//!
//! Runs in two phases. The first walks the trees: written modifiers are
//! checked against the level and the implied ones are appended in place, so
//! the printed output carries them. The second creates the member records,
//! superclasses before subclasses, and adds the members the level generates.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::Environment;
use crate::base::{FileId, Span};
use crate::hir::InvariantViolation;
use crate::hir::diagnostics::DiagnosticKind;
use crate::hir::symbols::{
    ClassId, InstanceType, MethodOrigin, MethodScope, MethodSig, ScopeId, VariableData,
};
use crate::syntax::ast::{
    CompilationUnit, FieldDecl, Member, MethodDecl, Modifier, Modifiers, PrimitiveType, TypeDecl,
};

const KIND: DiagnosticKind = DiagnosticKind::MemberBinding;

pub fn run(units: &mut [CompilationUnit], env: &mut Environment) -> Result<(), InvariantViolation> {
    debug!("members: {} files at {} level", units.len(), env.level_name());
    for unit in units.iter_mut() {
        for decl in unit.types.iter_mut() {
            check_type(env, decl, false);
        }
    }

    let mut pending: IndexMap<ClassId, (FileId, &TypeDecl)> = IndexMap::new();
    for unit in units.iter() {
        for decl in super::all_type_decls(unit) {
            if let Some(id) = env.class_of(decl) {
                pending.insert(id, (unit.file, decl));
            }
        }
    }
    let mut done = FxHashSet::default();
    let ids: Vec<ClassId> = pending.keys().copied().collect();
    for id in ids {
        bind_in_order(env, &pending, &mut done, id);
    }
    Ok(())
}

// ============================================================================
// MODIFIERS
// ============================================================================

/// Report written modifiers the level does not allow.
fn check_explicit(env: &mut Environment, modifiers: &Modifiers) {
    for modifier in modifiers.iter() {
        let allowed = match modifier {
            Modifier::Abstract => env.config.allow_abstract,
            _ => env.config.allows_modifier(modifier),
        };
        if !allowed {
            let level = env.level_name();
            env.diagnostics.not_allowed(
                KIND,
                modifiers.span,
                &format!("modifier '{}'", modifier),
                level,
            );
        }
    }
    let visibilities: Vec<Modifier> = modifiers.iter().filter(|m| m.is_visibility()).collect();
    if let [first, second, ..] = visibilities.as_slice() {
        illegal_combination(env, modifiers.span, *first, *second);
    }
}

fn not_here(env: &mut Environment, span: Span, modifier: Modifier) {
    env.diagnostics
        .member_binding(span, format!("modifier '{}' not allowed here", modifier));
}

fn illegal_combination(env: &mut Environment, span: Span, a: Modifier, b: Modifier) {
    env.diagnostics.member_binding(
        span,
        format!("illegal combination of modifiers: '{}' and '{}'", a, b),
    );
}

/// Append `implied` modifiers; a visibility only when none is written.
fn append_implied(modifiers: &mut Modifiers, implied: &[Modifier]) {
    for modifier in implied {
        if modifier.is_visibility() && modifiers.visibility().is_some() {
            continue;
        }
        modifiers.push(*modifier);
    }
}

fn check_type(env: &mut Environment, decl: &mut TypeDecl, nested: bool) {
    let level = env.level_name();
    if decl.is_interface() && !env.config.allow_interfaces {
        env.diagnostics
            .not_allowed(KIND, decl.name.span, "interface", level);
    }
    if !decl.implements.is_empty() && !env.config.allow_interfaces {
        env.diagnostics
            .not_allowed(KIND, decl.name.span, "'implements' clause", level);
    }
    if nested && !env.config.allow_nested_types {
        env.diagnostics
            .not_allowed(KIND, decl.name.span, "nested type", level);
    }
    check_explicit(env, &decl.modifiers);
    if !nested {
        for modifier in [Modifier::Private, Modifier::Protected, Modifier::Static] {
            if decl.modifiers.contains(modifier) {
                not_here(env, decl.name.span, modifier);
            }
        }
    }
    let is_final = decl.modifiers.contains(Modifier::Final);
    if decl.is_interface() && is_final {
        not_here(env, decl.name.span, Modifier::Final);
    } else if is_final && decl.modifiers.contains(Modifier::Abstract) {
        illegal_combination(env, decl.name.span, Modifier::Abstract, Modifier::Final);
    }

    let interface = decl.is_interface();
    for member in decl.members.iter_mut() {
        match member {
            Member::Field(field) => check_field(env, field, interface),
            Member::Method(method) => check_method(env, method, interface),
            Member::Type(inner) => check_type(env, inner, true),
        }
    }
}

fn check_field(env: &mut Environment, field: &mut FieldDecl, interface: bool) {
    check_explicit(env, &field.modifiers);
    let span = field.modifiers.span;
    if field.modifiers.contains(Modifier::Abstract) {
        not_here(env, span, Modifier::Abstract);
    }
    if interface {
        for modifier in [Modifier::Private, Modifier::Protected] {
            if field.modifiers.contains(modifier) {
                not_here(env, span, modifier);
            }
        }
        append_implied(
            &mut field.modifiers,
            &[Modifier::Public, Modifier::Static, Modifier::Final],
        );
    } else {
        append_implied(&mut field.modifiers, env.config.implied_field_modifiers);
    }
}

fn check_method(env: &mut Environment, method: &mut MethodDecl, interface: bool) {
    check_explicit(env, &method.modifiers);
    let span = method.name.span;
    let modifiers = &method.modifiers;
    if method.is_constructor() {
        if interface {
            env.diagnostics
                .member_binding(span, "interfaces cannot declare constructors");
        }
        for modifier in [Modifier::Abstract, Modifier::Static, Modifier::Final] {
            if modifiers.contains(modifier) {
                not_here(env, span, modifier);
            }
        }
    } else if interface {
        for modifier in [Modifier::Private, Modifier::Protected, Modifier::Static, Modifier::Final] {
            if modifiers.contains(modifier) {
                not_here(env, span, modifier);
            }
        }
        if method.body.is_some() {
            env.diagnostics
                .member_binding(span, "interface abstract methods cannot have body");
        }
    } else if modifiers.contains(Modifier::Abstract) {
        for modifier in [Modifier::Final, Modifier::Private, Modifier::Static] {
            if modifiers.contains(modifier) {
                illegal_combination(env, span, Modifier::Abstract, modifier);
            }
        }
        if method.body.is_some() {
            env.diagnostics
                .member_binding(span, "abstract methods cannot have a body");
        }
    } else if method.body.is_none() {
        env.diagnostics
            .member_binding(span, "missing method body, or declare abstract");
    }

    if interface && !method.is_constructor() {
        append_implied(&mut method.modifiers, &[Modifier::Public, Modifier::Abstract]);
    } else {
        append_implied(&mut method.modifiers, env.config.implied_method_modifiers);
    }
}

// ============================================================================
// MEMBER RECORDS
// ============================================================================

fn bind_in_order(
    env: &mut Environment,
    pending: &IndexMap<ClassId, (FileId, &TypeDecl)>,
    done: &mut FxHashSet<ClassId>,
    id: ClassId,
) {
    if !done.insert(id) {
        return;
    }
    let class = env.table.class(id);
    let supers: Vec<ClassId> = class
        .superclass
        .into_iter()
        .chain(class.interfaces.iter().copied())
        .collect();
    for sup in supers {
        if pending.contains_key(&sup) {
            bind_in_order(env, pending, done, sup);
        }
    }
    if let Some((file, decl)) = pending.get(&id) {
        bind_class(env, *file, decl, id);
    }
}

fn bind_class(env: &mut Environment, file: FileId, decl: &TypeDecl, id: ClassId) {
    trace!("binding members of '{}'", env.table.class(id).qname);
    for member in &decl.members {
        match member {
            Member::Field(field) => bind_field(env, file, field, id),
            Member::Method(method) => bind_method(env, file, method, id),
            Member::Type(_) => {}
        }
    }
    if !decl.is_interface() {
        generate(env, decl, id);
        check_abstract_implemented(env, decl, id);
    }
}

fn bind_field(env: &mut Environment, file: FileId, field: &FieldDecl, id: ClassId) {
    env.check_array_type(&field.ty, KIND);
    let ty = env.resolve_type(file, &field.ty, Some(id));
    let scope = env.table.class(id).scope;
    for declarator in &field.declarators {
        let name = declarator.name.text.clone();
        let mut var = VariableData::new(
            name.clone(),
            field.modifiers.clone(),
            InstanceType::new(ty),
            scope,
            declarator.span,
        );
        if declarator.init.is_some() {
            var = var.with_initializer();
        }
        match env.table.add_var(scope, var) {
            Ok(var) => {
                env.table.class_mut(id).fields.push(var);
                env.decl_fields.insert(declarator.span, var);
            }
            Err(_) => {
                let class = env.table.type_name(id);
                env.diagnostics.member_binding(
                    declarator.name.span,
                    format!("variable '{}' is already defined in class '{}'", name, class),
                );
            }
        }
    }
}

fn bind_method(env: &mut Environment, file: FileId, method: &MethodDecl, id: ClassId) {
    let class_name = env.table.class(id).name.clone();
    if method.is_constructor() && method.name.text != class_name {
        env.diagnostics.member_binding(
            method.name.span,
            "invalid method declaration; return type required",
        );
        return;
    }

    let mut param_types = Vec::with_capacity(method.params.len());
    for param in &method.params {
        env.check_array_type(&param.ty, KIND);
        param_types.push(env.resolve_type(file, &param.ty, Some(id)));
    }
    let return_type = match &method.return_type {
        Some(ty) => {
            env.check_array_type(ty, KIND);
            Some(InstanceType::new(env.resolve_type(file, ty, Some(id))))
        }
        None => None,
    };
    let sig = match return_type {
        Some(_) => MethodSig::new(method.name.text.clone(), param_types.clone()),
        None => MethodSig::constructor(param_types.clone()),
    };
    let record = MethodScope {
        name: method.name.text.clone(),
        modifiers: method.modifiers.clone(),
        params: Vec::new(),
        return_type,
        class: id,
        origin: MethodOrigin::Source,
        span: method.span,
    };
    let scope = match env.table.add_method(sig.clone(), record) {
        Ok(scope) => scope,
        Err(_) => {
            let shown = env.describe_sig(&method.name.text, &param_types);
            let class = env.table.type_name(id);
            env.diagnostics.member_binding(
                method.name.span,
                format!("method '{}' is already defined in class '{}'", shown, class),
            );
            return;
        }
    };
    env.decl_methods.insert(method.span, scope);

    let shown = env.describe_sig(&method.name.text, &param_types);
    for (param, ty) in method.params.iter().zip(param_types) {
        let var = VariableData::new(
            param.name.text.clone(),
            param.modifiers.clone(),
            InstanceType::new(ty),
            scope,
            param.span,
        )
        .with_initializer();
        match env.table.add_var(scope, var) {
            Ok(var) => env.table.push_param(scope, var),
            Err(_) => {
                env.diagnostics.member_binding(
                    param.name.span,
                    format!(
                        "variable '{}' is already defined in method '{}'",
                        param.name.text, shown
                    ),
                );
            }
        }
    }

    if !method.is_constructor() {
        check_override(env, id, &sig, scope, method.name.span);
    }
}

fn access_rank(modifiers: &Modifiers) -> u8 {
    match modifiers.visibility() {
        Some(Modifier::Private) => 0,
        None => 1,
        Some(Modifier::Protected) => 2,
        _ => 3,
    }
}

/// Compare `scope` with the nearest inherited method of the same signature.
fn check_override(env: &mut Environment, id: ClassId, sig: &MethodSig, scope: ScopeId, span: Span) {
    for sup in env.table.all_supertypes(id).into_iter().skip(1) {
        let Some(&inherited) = env.table.class(sup).methods.get(sig) else {
            continue;
        };
        let (Some(new), Some(old)) = (env.table.method(scope), env.table.method(inherited)) else {
            return;
        };
        if old.modifiers.contains(Modifier::Private) {
            continue;
        }
        let problem = if old.is_static() && !new.is_static() {
            Some("overridden method is static".to_string())
        } else if new.is_static() && !old.is_static() {
            Some("overriding method is static".to_string())
        } else if old.modifiers.contains(Modifier::Final) {
            Some("overridden method is final".to_string())
        } else if access_rank(&new.modifiers) < access_rank(&old.modifiers) {
            let was = old
                .modifiers
                .visibility()
                .map_or("package", |m| m.as_str());
            Some(format!(
                "attempting to assign weaker access privileges; was {}",
                was
            ))
        } else {
            let new_ret = new.return_type.map(|t| t.class);
            let old_ret = old.return_type.map(|t| t.class);
            match (new_ret, old_ret) {
                (Some(a), Some(b))
                    if a != b
                        && !(env.table.class(a).kind.is_reference()
                            && env.table.is_assignable(a, b)) =>
                {
                    Some(format!(
                        "return type '{}' is not compatible with '{}'",
                        env.table.type_name(a),
                        env.table.type_name(b)
                    ))
                }
                _ => None,
            }
        };
        if let Some(problem) = problem {
            let here = env.describe_method(scope);
            let there = env.describe_method(inherited);
            let message = format!(
                "'{}' in '{}' cannot override '{}' in '{}'; {}",
                here,
                env.table.type_name(id),
                there,
                env.table.type_name(sup),
                problem
            );
            env.diagnostics.member_binding(span, message);
        }
        return;
    }
}

fn check_abstract_implemented(env: &mut Environment, decl: &TypeDecl, id: ClassId) {
    if env.table.class(id).is_abstract() {
        return;
    }
    let chain = env.table.superclass_chain(id);
    for sup in env.table.all_supertypes(id) {
        let methods: Vec<(MethodSig, ScopeId)> = env
            .table
            .class(sup)
            .methods
            .iter()
            .map(|(sig, scope)| (sig.clone(), *scope))
            .collect();
        for (sig, scope) in methods {
            if !env.table.method(scope).is_some_and(MethodScope::is_abstract) {
                continue;
            }
            let implemented = chain.iter().any(|class| {
                env.table
                    .class(*class)
                    .methods
                    .get(&sig)
                    .and_then(|s| env.table.method(*s))
                    .is_some_and(|m| !m.is_abstract())
            });
            if !implemented {
                let message = format!(
                    "'{}' is not abstract and does not override abstract method '{}' in '{}'",
                    env.table.type_name(id),
                    env.describe_method(scope),
                    env.table.type_name(sup)
                );
                env.diagnostics.member_binding(decl.name.span, message);
                return;
            }
        }
    }
}

// ============================================================================
// GENERATED MEMBERS
// ============================================================================

fn public(span: Span) -> Modifiers {
    let mut modifiers = Modifiers::empty(span);
    modifiers.push(Modifier::Public);
    modifiers
}

/// Add a generated method (a constructor when `ret` is `None`).
fn add_generated(
    env: &mut Environment,
    id: ClassId,
    name: &str,
    params: Vec<(SmolStr, ClassId)>,
    ret: Option<ClassId>,
    origin: MethodOrigin,
    span: Span,
) -> Option<ScopeId> {
    let types: Vec<ClassId> = params.iter().map(|(_, ty)| *ty).collect();
    let sig = match ret {
        Some(_) => MethodSig::new(name, types),
        None => MethodSig::constructor(types),
    };
    let record = MethodScope {
        name: SmolStr::new(name),
        modifiers: public(span),
        params: Vec::new(),
        return_type: ret.map(InstanceType::new),
        class: id,
        origin,
        span,
    };
    let scope = env.table.add_method(sig, record).ok()?;
    for (param, ty) in params {
        let mut var =
            VariableData::new(param, Modifiers::empty(span), InstanceType::new(ty), scope, span)
                .with_initializer();
        var.generated = true;
        if let Ok(var) = env.table.add_var(scope, var) {
            env.table.push_param(scope, var);
        }
    }
    trace!("generated '{}' in '{}'", name, env.table.class(id).qname);
    Some(scope)
}

fn generate(env: &mut Environment, decl: &TypeDecl, id: ClassId) {
    let span = decl.span;
    let class_name = decl.name.text.clone();
    if env.table.class(id).constructors().next().is_none() {
        if env.config.generate_constructor {
            generate_constructor(env, id, &class_name, span);
        } else {
            implicit_constructor(env, decl, id);
        }
    }

    if env.config.generate_accessors {
        let fields = env.table.class(id).fields.clone();
        for field in fields {
            let var = env.table.var(field);
            if var.is_static() {
                continue;
            }
            let (name, ty) = (var.name.clone(), var.ty.class);
            let sig = MethodSig::new(name.clone(), Vec::new());
            if !env.table.class(id).methods.contains_key(&sig) {
                add_generated(env, id, &name, Vec::new(), Some(ty), MethodOrigin::Generated, span);
            }
        }
    }

    if env.config.generate_object_methods {
        let known = env.table.well_known().clone();
        let boolean = known.primitive(PrimitiveType::Boolean);
        let int = known.primitive(PrimitiveType::Int);
        let wanted: [(&str, Vec<(SmolStr, ClassId)>, ClassId); 3] = [
            ("toString", Vec::new(), known.string),
            ("equals", vec![(SmolStr::new_static("o"), known.object)], boolean),
            ("hashCode", Vec::new(), int),
        ];
        for (name, params, ret) in wanted {
            let types: Vec<ClassId> = params.iter().map(|(_, ty)| *ty).collect();
            let sig = MethodSig::new(name, types);
            if !env.table.class(id).methods.contains_key(&sig) {
                add_generated(env, id, name, params, Some(ret), MethodOrigin::Generated, span);
            }
        }
    }
}

/// Parameters of the superclass constructor a generated constructor
/// forwards to: a generated one, else the no-argument one, else the first.
fn super_constructor_params(env: &Environment, sup: ClassId) -> Vec<(SmolStr, ClassId)> {
    let ctors: Vec<ScopeId> = env.table.class(sup).constructors().map(|(_, s)| s).collect();
    let chosen = ctors
        .iter()
        .find(|s| {
            env.table
                .method(**s)
                .is_some_and(|m| m.origin == MethodOrigin::Generated)
        })
        .or_else(|| ctors.iter().find(|s| env.table.param_types(**s).is_empty()))
        .or_else(|| ctors.first());
    let Some(method) = chosen.and_then(|s| env.table.method(*s)) else {
        return Vec::new();
    };
    method
        .params
        .iter()
        .map(|p| {
            let var = env.table.var(*p);
            (var.name.clone(), var.ty.class)
        })
        .collect()
}

fn generate_constructor(env: &mut Environment, id: ClassId, name: &str, span: Span) {
    let super_params = match env.table.class(id).superclass {
        Some(sup) => super_constructor_params(env, sup),
        None => Vec::new(),
    };
    let forwarded = super_params.len();
    let mut params: Vec<(SmolStr, ClassId)> = super_params
        .into_iter()
        .map(|(name, ty)| (SmolStr::new(format!("super_{}", name)), ty))
        .collect();
    for field in &env.table.class(id).fields {
        let var = env.table.var(*field);
        if var.is_final() && !var.is_static() && !var.has_initializer {
            params.push((var.name.clone(), var.ty.class));
        }
    }
    if let Some(scope) = add_generated(env, id, name, params, None, MethodOrigin::Generated, span) {
        env.super_args.insert(scope, forwarded);
    }
}

/// The language's default constructor; it calls `super()`.
fn implicit_constructor(env: &mut Environment, decl: &TypeDecl, id: ClassId) {
    add_generated(
        env,
        id,
        &decl.name.text,
        Vec::new(),
        None,
        MethodOrigin::Implicit,
        decl.span,
    );
    let Some(sup) = env.table.class(id).superclass else {
        return;
    };
    let ctors: Vec<ScopeId> = env.table.class(sup).constructors().map(|(_, s)| s).collect();
    if !ctors.is_empty() && ctors.iter().all(|s| !env.table.param_types(*s).is_empty()) {
        let name = env.table.type_name(sup);
        env.diagnostics.member_binding(
            decl.name.span,
            format!(
                "constructor '{}' in class '{}' cannot be applied to given types",
                name, name
            ),
        );
    }
}

#[cfg(test)]
#[path = "tests/tests_members.rs"]
mod tests;
