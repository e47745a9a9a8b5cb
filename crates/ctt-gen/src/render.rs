//! Artifact rendering
//!
//! Stateless serialization of shapes and oracles into C++ source text. All
//! spelling of grammar values lives here; the model types carry semantic
//! fields only.

use crate::catalog::{
    Catalog, CallableShape, ClosureQualifiers, MEMBER_FUNCTION_NAME, MemberQualifiers, ShapeKind,
};
use crate::config::{GrammarConfig, Header};
use crate::grammar::{
    BaseType, ExceptionSpec, Mutability, PointerSpec, Qualifier, ReferenceKind, TypeSignature,
};
use crate::oracle::{ClassIdentity, NAMED_ARG_SLOTS, PROBED_ARG_SLOTS, TraitOracle};

/// First line of every generated file
pub const BANNER: &str = "/* This file was auto-generated */";

/// Program entry point closing the artifact
pub const EPILOGUE: &str = "int main() { return 0; }";

/// Keyword for a qualifier, `None` when unqualified
#[must_use]
pub const fn qualifier_keyword(qualifier: Qualifier) -> Option<&'static str> {
    match qualifier {
        Qualifier::None => None,
        Qualifier::Const => Some("const"),
        Qualifier::Volatile => Some("volatile"),
        Qualifier::ConstVolatile => Some("const volatile"),
    }
}

/// C++ spelling of a base type
#[must_use]
pub const fn base_type_name(base: BaseType) -> &'static str {
    match base {
        BaseType::Void => "void",
        BaseType::Bool => "bool",
        BaseType::Int => "int",
        BaseType::Float => "float",
        BaseType::String => "std::string",
    }
}

/// Reference declarator token
#[must_use]
pub const fn reference_token(reference: ReferenceKind) -> &'static str {
    match reference {
        ReferenceKind::LValue => "&",
        ReferenceKind::RValue => "&&",
    }
}

/// Pointer declarator, e.g. `*` or `* const`
#[must_use]
pub fn spell_pointer(pointer: PointerSpec) -> String {
    match qualifier_keyword(pointer.qualifier) {
        Some(q) => format!("* {q}"),
        None => "*".to_string(),
    }
}

/// Full type spelling, e.g. `const int * volatile &`
#[must_use]
pub fn spell_type(ty: &TypeSignature) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if let Some(q) = qualifier_keyword(ty.qualifier) {
        parts.push(q.to_string());
    }
    parts.push(base_type_name(ty.base).to_string());
    if let Some(pointer) = ty.pointer {
        parts.push(spell_pointer(pointer));
    }
    if let Some(reference) = ty.reference {
        parts.push(reference_token(reference).to_string());
    }
    parts.join(" ")
}

/// Include directive for a header
#[must_use]
pub fn spell_header(header: &Header) -> String {
    if header.system {
        format!("#include <{}>", header.name)
    } else {
        format!("#include \"{}\"", header.name)
    }
}

fn exception_suffix(exception: Option<ExceptionSpec>) -> &'static str {
    match exception {
        Some(ExceptionSpec::Noexcept) => " noexcept",
        None => "",
    }
}

/// Parameter list between the parentheses, with a trailing ellipsis when
/// variadic
#[must_use]
pub fn spell_parameter_list(parameters: &[TypeSignature], variadic: bool) -> String {
    let mut list = parameters
        .iter()
        .map(spell_type)
        .collect::<Vec<_>>()
        .join(", ");
    if variadic {
        if !list.is_empty() {
            list.push_str(", ");
        }
        list.push_str("...");
    }
    list
}

/// Trailing member-function qualifiers with a leading space each; empty
/// when no qualifier is present
#[must_use]
pub fn spell_member_qualifiers(qualifiers: &MemberQualifiers) -> String {
    let mut out = String::new();
    if let Some(q) = qualifier_keyword(qualifiers.qualifier) {
        out.push(' ');
        out.push_str(q);
    }
    if let Some(r) = qualifiers.reference {
        out.push(' ');
        out.push_str(reference_token(r));
    }
    out.push_str(exception_suffix(qualifiers.exception));
    out
}

/// Lambda specifiers with a leading space each
#[must_use]
pub fn spell_closure_qualifiers(qualifiers: &ClosureQualifiers) -> String {
    let mut out = String::new();
    if let Some(Mutability::Mutable) = qualifiers.mutability {
        out.push_str(" mutable");
    }
    out.push_str(exception_suffix(qualifiers.exception));
    out
}

/// Declaration of a shape, without the terminating semicolon
#[must_use]
pub fn render_declaration(shape: &CallableShape) -> String {
    let return_type = spell_type(&shape.return_type);
    let params = spell_parameter_list(&shape.parameters, shape.variadic);

    match &shape.kind {
        ShapeKind::FreeFunction { exception } => format!(
            "{return_type} {}({params}){}",
            shape.name,
            exception_suffix(*exception)
        ),
        ShapeKind::MemberFunction {
            class_name,
            qualifiers,
        } => format!(
            "struct {class_name} {{ {return_type} {MEMBER_FUNCTION_NAME}({params}){}; }}",
            spell_member_qualifiers(qualifiers)
        ),
        ShapeKind::Closure {
            instance_name,
            qualifiers,
        } => format!(
            "[[maybe_unused]] const auto {instance_name} = []({params}){} -> {return_type} {{}}",
            spell_closure_qualifiers(qualifiers)
        ),
    }
}

/// No pointer, plus one pointer per qualifier
const POINTER_FORMS: usize = 5;

/// Length of the wrapper cycle
pub const WRAPPER_COUNT: usize = 3 * POINTER_FORMS * 4;

/// Qualified, pointer and reference form a free function's type is viewed
/// through by one assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionTypeWrapper {
    /// Qualifier applied to the function type
    pub qualifier: Qualifier,
    /// Pointer added on top, with its own qualifier
    pub pointer: Option<PointerSpec>,
    /// Reference added last
    pub reference: Option<ReferenceKind>,
}

impl FunctionTypeWrapper {
    /// All wrappers: reference (outer), pointer, qualifier (inner)
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut all = Vec::with_capacity(WRAPPER_COUNT);
        for reference in ReferenceKind::options() {
            for pointer in PointerSpec::options() {
                for qualifier in Qualifier::all() {
                    all.push(Self {
                        qualifier,
                        pointer,
                        reference,
                    });
                }
            }
        }
        all
    }

    /// Wrapper used by the assertion with running sequence number `seq`
    #[must_use]
    pub fn for_sequence(seq: usize) -> Self {
        let index = seq % WRAPPER_COUNT;
        let qualifiers = Qualifier::all();
        let pointer = match (index / qualifiers.len()) % POINTER_FORMS {
            0 => None,
            p => Some(PointerSpec::new(qualifiers[p - 1])),
        };
        Self {
            qualifier: qualifiers[index % qualifiers.len()],
            pointer,
            reference: ReferenceKind::options()[index / (qualifiers.len() * POINTER_FORMS)],
        }
    }

    /// Wrap a function type expression
    #[must_use]
    pub fn apply(&self, function_type: &str) -> String {
        let mut ty = add_qualifier(function_type.to_string(), self.qualifier);
        if let Some(pointer) = self.pointer {
            ty = add_qualifier(format!("std::add_pointer_t<{ty}>"), pointer.qualifier);
        }
        match self.reference {
            Some(ReferenceKind::LValue) => format!("std::add_lvalue_reference_t<{ty}>"),
            Some(ReferenceKind::RValue) => format!("std::add_rvalue_reference_t<{ty}>"),
            None => ty,
        }
    }
}

fn add_qualifier(ty: String, qualifier: Qualifier) -> String {
    match qualifier {
        Qualifier::None => ty,
        Qualifier::Const => format!("std::add_const_t<{ty}>"),
        Qualifier::Volatile => format!("std::add_volatile_t<{ty}>"),
        Qualifier::ConstVolatile => format!("std::add_cv_t<{ty}>"),
    }
}

/// One compile-time check against the facility
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraitCheck {
    /// `result_type` equals the type
    ResultType(TypeSignature),
    /// `argN_type` presence
    NamedSlotPresence {
        /// Slot index
        index: usize,
        /// Expected presence
        present: bool,
    },
    /// `argN_type` equals the type
    NamedArg {
        /// Slot index
        index: usize,
        /// Expected type
        ty: TypeSignature,
    },
    /// `arg_type<N>` equals the type
    IndexedArg {
        /// Position
        index: usize,
        /// Expected type
        ty: TypeSignature,
    },
    /// `arity` equals the count
    Arity(usize),
    /// A boolean member equals the value
    Flag {
        /// Member name
        member: &'static str,
        /// Expected value
        value: bool,
    },
    /// `class_type` presence
    ClassTypePresence(bool),
    /// `class_type` equals the identity
    ClassType(ClassIdentity),
}

/// Checks for one oracle, in emission order
#[must_use]
pub fn trait_checks(oracle: &TraitOracle) -> Vec<TraitCheck> {
    let mut checks = vec![TraitCheck::ResultType(oracle.result_type)];

    for (index, present) in oracle.named_slot_presence().into_iter().enumerate() {
        checks.push(TraitCheck::NamedSlotPresence { index, present });
    }

    for (index, &ty) in oracle.arg_types.iter().enumerate() {
        if let Some(&named) = oracle.named_arg(index) {
            checks.push(TraitCheck::NamedArg { index, ty: named });
        }
        checks.push(TraitCheck::IndexedArg { index, ty });
    }

    checks.push(TraitCheck::Arity(oracle.arity));
    for (member, value) in [
        ("is_functor", oracle.is_functor),
        ("is_member_function", oracle.is_member_function),
        ("is_variadic", oracle.is_variadic),
        ("is_noexcept", oracle.is_noexcept),
        ("is_const", oracle.is_const),
        ("is_volatile", oracle.is_volatile),
        ("is_lvalue_reference", oracle.is_lvalue_reference),
        ("is_rvalue_reference", oracle.is_rvalue_reference),
    ] {
        checks.push(TraitCheck::Flag { member, value });
    }

    checks.push(TraitCheck::ClassTypePresence(oracle.has_class_type()));
    if let Some(class) = &oracle.class_type {
        checks.push(TraitCheck::ClassType(class.clone()));
    }

    checks
}

/// Type expression naming a class identity
#[must_use]
pub fn spell_class(class: &ClassIdentity) -> String {
    match class {
        ClassIdentity::Struct(name) => name.clone(),
        ClassIdentity::Closure(name) => format!("std::remove_const_t<decltype({name})>"),
    }
}

/// Serializes catalogs into the verification artifact
#[derive(Debug, Clone)]
pub struct Renderer {
    headers: Vec<Header>,
    traits_template: String,
    helper_namespace: String,
    wrap_free_function_types: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&GrammarConfig::default())
    }
}

impl Renderer {
    /// Take rendering options from a configuration
    #[must_use]
    pub fn new(config: &GrammarConfig) -> Self {
        Self {
            headers: config.headers.clone(),
            traits_template: config.traits_template.clone(),
            helper_namespace: config.helper_namespace.clone(),
            wrap_free_function_types: config.wrap_free_function_types,
        }
    }

    /// Traits instantiation the `seq`-th assertion of `shape` is made against
    #[must_use]
    pub fn subject(&self, shape: &CallableShape, seq: usize) -> String {
        let callable_type = match &shape.kind {
            ShapeKind::FreeFunction { .. } => {
                let function_type = format!("decltype({})", shape.name);
                if self.wrap_free_function_types {
                    FunctionTypeWrapper::for_sequence(seq).apply(&function_type)
                } else {
                    function_type
                }
            }
            ShapeKind::MemberFunction { class_name, .. } => {
                format!("decltype(&{class_name}::{MEMBER_FUNCTION_NAME})")
            }
            ShapeKind::Closure { instance_name, .. } => format!("decltype({instance_name})"),
        };
        format!("{}<{callable_type}>", self.traits_template)
    }

    /// One `static_assert` line
    #[must_use]
    pub fn render_check(&self, check: &TraitCheck, subject: &str) -> String {
        let ns = &self.helper_namespace;
        let condition = match check {
            TraitCheck::ResultType(ty) => {
                format!("std::is_same_v<{subject}::result_type, {}>", spell_type(ty))
            }
            TraitCheck::NamedSlotPresence { index, present } => {
                format!("{ns}::has_arg{index}_type_v<{subject}> == {present}")
            }
            TraitCheck::NamedArg { index, ty } => {
                format!("std::is_same_v<{subject}::arg{index}_type, {}>", spell_type(ty))
            }
            TraitCheck::IndexedArg { index, ty } => {
                format!("std::is_same_v<{subject}::arg_type<{index}>, {}>", spell_type(ty))
            }
            TraitCheck::Arity(arity) => format!("{subject}::arity == {arity}"),
            TraitCheck::Flag { member, value } => format!("{subject}::{member} == {value}"),
            TraitCheck::ClassTypePresence(present) => {
                format!("{ns}::has_class_type_v<{subject}> == {present}")
            }
            TraitCheck::ClassType(class) => {
                format!("std::is_same_v<{subject}::class_type, {}>", spell_class(class))
            }
        };
        format!("static_assert({condition});")
    }

    /// Assertion lines for a shape.
    ///
    /// `first_seq` is the running free-function assertion number the block
    /// starts at; it only affects free-function subjects.
    #[must_use]
    pub fn render_assertions(
        &self,
        shape: &CallableShape,
        oracle: &TraitOracle,
        first_seq: usize,
    ) -> Vec<String> {
        trait_checks(oracle)
            .iter()
            .enumerate()
            .map(|(i, check)| self.render_check(check, &self.subject(shape, first_seq + i)))
            .collect()
    }

    /// Append the declaration plus assertion block of one shape to `out`,
    /// returning the number of assertions written
    pub fn render_block(
        &self,
        out: &mut String,
        shape: &CallableShape,
        oracle: &TraitOracle,
        first_seq: usize,
    ) -> usize {
        let assertions = self.render_assertions(shape, oracle, first_seq);
        out.push_str(&render_declaration(shape));
        out.push_str(";\n");
        for line in &assertions {
            out.push_str(line);
            out.push('\n');
        }
        assertions.len()
    }

    /// Banner and include lines
    #[must_use]
    pub fn render_prelude(&self) -> String {
        let includes = self
            .headers
            .iter()
            .map(spell_header)
            .collect::<Vec<_>>()
            .join("\n");
        format!("{BANNER}\n\n{includes}\n\n")
    }

    /// Complete artifact for a catalog
    #[must_use]
    pub fn render(&self, catalog: &Catalog) -> String {
        let mut out = self.render_prelude();
        let mut free_seq = 0;

        for shape in &catalog.shapes {
            let oracle = TraitOracle::derive(shape);
            let written = self.render_block(&mut out, shape, &oracle, free_seq);
            if matches!(shape.kind, ShapeKind::FreeFunction { .. }) {
                free_seq += written;
            }
        }

        out.push_str(EPILOGUE);
        out.push('\n');
        tracing::debug!(shapes = catalog.len(), bytes = out.len(), "artifact rendered");
        out
    }

    /// Companion header defining the `has_*_v` detection helpers
    #[must_use]
    pub fn render_helper_header(&self) -> String {
        let ns = &self.helper_namespace;
        let members = (0..PROBED_ARG_SLOTS)
            .map(|i| format!("arg{i}_type"))
            .chain(std::iter::once("class_type".to_string()));

        let mut out = format!(
            "{BANNER}\n\n#pragma once\n\n#include <type_traits>\n\nnamespace {ns} {{\n\n"
        );
        for member in members {
            out.push_str(&format!(
                "template <typename T, typename = void>\n\
                 struct has_{member} : std::false_type {{}};\n\
                 template <typename T>\n\
                 struct has_{member}<T, std::void_t<typename T::{member}>> : std::true_type {{}};\n\
                 template <typename T>\n\
                 inline constexpr auto has_{member}_v = has_{member}<T>::value;\n\n"
            ));
        }
        out.push_str(&format!("}} // namespace {ns}\n"));
        out
    }
}

// Named slots are only probed inside the presence range.
const _: () = assert!(NAMED_ARG_SLOTS <= PROBED_ARG_SLOTS);
