//! Built-in library model.
//!
//! Every run starts from a table holding the primitive types, `void`, the
//! null type and a small slice of `java.lang` / `java.io`: enough for the
//! root type, strings, boxed values, `Math` and `System.out.println`.
//! Members are written as compact signatures, e.g.
//! `"static int max(int, int)"` or `"<init>(java.lang.String)"`.

use smol_str::SmolStr;

use super::InvariantViolation;
use super::symbols::{
    ClassId, ClassKind, ClassOrigin, ClassState, InstanceType, MethodOrigin, MethodScope,
    MethodSig, SymbolTable, VariableData,
};
use crate::base::{FileId, Span};
use crate::syntax::ast::{Modifier, Modifiers, PrimitiveType};

/// Handles of the classes the passes refer to directly.
#[derive(Debug, Clone)]
pub struct WellKnown {
    pub object: ClassId,
    pub string: ClassId,
    pub void: ClassId,
    pub null: ClassId,
    pub error: ClassId,
    primitives: [ClassId; 8],
}

impl WellKnown {
    pub(crate) fn placeholder() -> Self {
        let zero = ClassId::new(0);
        Self {
            object: zero,
            string: zero,
            void: zero,
            null: zero,
            error: zero,
            primitives: [zero; 8],
        }
    }

    pub fn primitive(&self, prim: PrimitiveType) -> ClassId {
        self.primitives[prim as usize]
    }
}

struct LibraryClass {
    qname: &'static str,
    superclass: Option<&'static str>,
    interface: bool,
    modifiers: &'static [Modifier],
    fields: &'static [&'static str],
    methods: &'static [&'static str],
}

const OBJECT: &str = "java.lang.Object";

const LIBRARY: &[LibraryClass] = &[
    LibraryClass {
        qname: OBJECT,
        superclass: None,
        interface: false,
        modifiers: &[Modifier::Public],
        fields: &[],
        methods: &[
            "<init>()",
            "boolean equals(java.lang.Object)",
            "int hashCode()",
            "java.lang.String toString()",
            "java.lang.Class getClass()",
        ],
    },
    LibraryClass {
        qname: "java.lang.Comparable",
        superclass: None,
        interface: true,
        modifiers: &[Modifier::Public],
        fields: &[],
        methods: &["abstract int compareTo(java.lang.Object)"],
    },
    LibraryClass {
        qname: "java.lang.String",
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public, Modifier::Final],
        fields: &[],
        methods: &[
            "<init>()",
            "<init>(java.lang.String)",
            "int length()",
            "char charAt(int)",
            "boolean isEmpty()",
            "java.lang.String concat(java.lang.String)",
            "java.lang.String substring(int)",
            "java.lang.String substring(int, int)",
            "int indexOf(java.lang.String)",
            "int compareTo(java.lang.String)",
            "boolean equals(java.lang.Object)",
            "int hashCode()",
            "java.lang.String toString()",
            "java.lang.String toUpperCase()",
            "java.lang.String toLowerCase()",
            "static java.lang.String valueOf(int)",
            "static java.lang.String valueOf(double)",
            "static java.lang.String valueOf(java.lang.Object)",
        ],
    },
    LibraryClass {
        qname: "java.lang.Class",
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public, Modifier::Final],
        fields: &[],
        methods: &["java.lang.String getName()"],
    },
    LibraryClass {
        qname: "java.lang.Math",
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public, Modifier::Final],
        fields: &["static final double PI", "static final double E"],
        methods: &[
            "static int abs(int)",
            "static long abs(long)",
            "static double abs(double)",
            "static int max(int, int)",
            "static long max(long, long)",
            "static double max(double, double)",
            "static int min(int, int)",
            "static long min(long, long)",
            "static double min(double, double)",
            "static double sqrt(double)",
            "static double pow(double, double)",
            "static double random()",
            "static long round(double)",
            "static double floor(double)",
            "static double ceil(double)",
        ],
    },
    LibraryClass {
        qname: "java.lang.System",
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public, Modifier::Final],
        fields: &[
            "static final java.io.PrintStream out",
            "static final java.io.PrintStream err",
        ],
        methods: &["static long currentTimeMillis()"],
    },
    LibraryClass {
        qname: "java.io.PrintStream",
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public],
        fields: &[],
        methods: &[
            "void println()",
            "void println(boolean)",
            "void println(char)",
            "void println(int)",
            "void println(long)",
            "void println(double)",
            "void println(java.lang.String)",
            "void println(java.lang.Object)",
            "void print(boolean)",
            "void print(char)",
            "void print(int)",
            "void print(long)",
            "void print(double)",
            "void print(java.lang.String)",
            "void print(java.lang.Object)",
        ],
    },
    boxed(
        "java.lang.Boolean",
        &["static final java.lang.Boolean TRUE", "static final java.lang.Boolean FALSE"],
        &[
            "static int hashCode(boolean)",
            "static java.lang.String toString(boolean)",
            "static boolean parseBoolean(java.lang.String)",
            "boolean booleanValue()",
        ],
    ),
    boxed(
        "java.lang.Character",
        &[],
        &[
            "static int hashCode(char)",
            "static java.lang.String toString(char)",
            "static boolean isDigit(char)",
            "static boolean isLetter(char)",
            "char charValue()",
        ],
    ),
    boxed(
        "java.lang.Byte",
        &[],
        &["static int hashCode(byte)", "byte byteValue()"],
    ),
    boxed(
        "java.lang.Short",
        &[],
        &["static int hashCode(short)", "short shortValue()"],
    ),
    boxed(
        "java.lang.Integer",
        &["static final int MAX_VALUE", "static final int MIN_VALUE"],
        &[
            "static int hashCode(int)",
            "static java.lang.String toString(int)",
            "static int parseInt(java.lang.String)",
            "int intValue()",
        ],
    ),
    boxed(
        "java.lang.Long",
        &["static final long MAX_VALUE", "static final long MIN_VALUE"],
        &[
            "static int hashCode(long)",
            "static java.lang.String toString(long)",
            "static long parseLong(java.lang.String)",
            "long longValue()",
        ],
    ),
    boxed(
        "java.lang.Float",
        &[],
        &["static int hashCode(float)", "float floatValue()"],
    ),
    boxed(
        "java.lang.Double",
        &["static final double MAX_VALUE", "static final double MIN_VALUE"],
        &[
            "static int hashCode(double)",
            "static java.lang.String toString(double)",
            "static double parseDouble(java.lang.String)",
            "static int compare(double, double)",
            "double doubleValue()",
        ],
    ),
];

/// A final wrapper class of a primitive.
const fn boxed(
    qname: &'static str,
    fields: &'static [&'static str],
    methods: &'static [&'static str],
) -> LibraryClass {
    LibraryClass {
        qname,
        superclass: Some(OBJECT),
        interface: false,
        modifiers: &[Modifier::Public, Modifier::Final],
        fields,
        methods,
    }
}

fn library_span() -> Span {
    Span::empty(FileId::new(0))
}

fn modifiers_of(list: &[Modifier]) -> Modifiers {
    let mut modifiers = Modifiers::empty(library_span());
    for modifier in list {
        modifiers.push(*modifier);
    }
    modifiers
}

/// Load the library into an empty table.
pub(crate) fn preload(table: &mut SymbolTable) -> Result<WellKnown, InvariantViolation> {
    let mut primitives = [ClassId::new(0); 8];
    for prim in PrimitiveType::ALL {
        primitives[prim as usize] = builtin(table, prim.as_str(), ClassKind::Primitive(prim));
    }
    let void = builtin(table, "void", ClassKind::Void);
    let null = builtin(table, "null", ClassKind::Null);
    let error = builtin(table, "<error>", ClassKind::Error);

    // declare every class before any signature mentions it
    for class in LIBRARY {
        let kind = if class.interface {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };
        table.declare_class(
            class.qname,
            kind,
            modifiers_of(class.modifiers),
            ClassOrigin::Library,
            None,
        );
    }

    let lookup = |table: &SymbolTable, name: &str| {
        table
            .lookup_class(name)
            .ok_or_else(|| InvariantViolation::MissingLibraryClass(SmolStr::new(name)))
    };
    let object = lookup(table, OBJECT)?;
    let string = lookup(table, "java.lang.String")?;

    for class in LIBRARY {
        let id = lookup(table, class.qname)?;
        let superclass = match class.superclass {
            Some(name) => Some(lookup(table, name)?),
            None if class.interface => Some(object),
            None => None,
        };
        {
            let decl = table.class_mut(id);
            decl.superclass = superclass;
            decl.state = ClassState::Resolved;
        }
        for field in class.fields {
            add_field(table, id, field)?;
        }
        for method in class.methods {
            add_method(table, id, method)?;
        }
    }

    Ok(WellKnown {
        object,
        string,
        void,
        null,
        error,
        primitives,
    })
}

fn builtin(table: &mut SymbolTable, name: &str, kind: ClassKind) -> ClassId {
    let id = table.declare_class(
        name,
        kind,
        modifiers_of(&[Modifier::Public, Modifier::Final]),
        ClassOrigin::Library,
        None,
    );
    table.class_mut(id).state = ClassState::Resolved;
    id
}

/// Split leading modifier keywords off a signature.
fn take_modifiers(text: &str) -> (Modifiers, &str) {
    let mut modifiers = Modifiers::empty(library_span());
    let mut rest = text.trim();
    loop {
        let modifier = [Modifier::Static, Modifier::Final, Modifier::Abstract]
            .into_iter()
            .find(|m| {
                rest.strip_prefix(m.as_str())
                    .is_some_and(|after| after.starts_with(' '))
            });
        match modifier {
            Some(m) => {
                modifiers.push(m);
                rest = rest[m.as_str().len()..].trim_start();
            }
            None => break,
        }
    }
    modifiers.push(Modifier::Public);
    (modifiers, rest)
}

fn resolve(table: &SymbolTable, name: &str) -> Result<ClassId, InvariantViolation> {
    table
        .lookup_class(name.trim())
        .ok_or_else(|| InvariantViolation::MissingLibraryClass(SmolStr::new(name.trim())))
}

fn add_field(table: &mut SymbolTable, class: ClassId, text: &str) -> Result<(), InvariantViolation> {
    let (modifiers, rest) = take_modifiers(text);
    let (ty, name) = rest
        .rsplit_once(' ')
        .ok_or_else(|| InvariantViolation::MalformedLibrarySignature(SmolStr::new(text)))?;
    let ty = resolve(table, ty)?;
    let scope = table.class(class).scope;
    let var = VariableData::new(name, modifiers, InstanceType::new(ty), scope, library_span())
        .with_initializer();
    let id = table
        .add_var(scope, var)
        .map_err(|_| InvariantViolation::MalformedLibrarySignature(SmolStr::new(text)))?;
    table.class_mut(class).fields.push(id);
    Ok(())
}

fn add_method(table: &mut SymbolTable, class: ClassId, text: &str) -> Result<(), InvariantViolation> {
    let malformed = || InvariantViolation::MalformedLibrarySignature(SmolStr::new(text));
    let (modifiers, rest) = take_modifiers(text);
    let (head, params) = rest.split_once('(').ok_or_else(malformed)?;
    let params = params.strip_suffix(')').ok_or_else(malformed)?;

    let (return_type, name) = match head.rsplit_once(' ') {
        Some((ret, name)) => (Some(InstanceType::new(resolve(table, ret)?)), name),
        None => (None, head),
    };
    let param_types = params
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| resolve(table, p))
        .collect::<Result<Vec<_>, _>>()?;

    let sig = match return_type {
        Some(_) => MethodSig::new(name, param_types.clone()),
        None => MethodSig::constructor(param_types.clone()),
    };
    let method = MethodScope {
        name: SmolStr::new(name),
        modifiers,
        params: Vec::new(),
        return_type,
        class,
        origin: MethodOrigin::Source,
        span: library_span(),
    };
    let scope = table.add_method(sig, method).map_err(|_| malformed())?;
    for (idx, ty) in param_types.into_iter().enumerate() {
        let var = VariableData::new(
            format!("arg{}", idx),
            Modifiers::empty(library_span()),
            InstanceType::new(ty),
            scope,
            library_span(),
        )
        .with_initializer();
        let var = table.add_var(scope, var).map_err(|_| malformed())?;
        table.push_param(scope, var);
    }
    Ok(())
}
