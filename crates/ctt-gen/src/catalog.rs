//! Shape catalog builder
//!
//! Turns the filtered signature lists into an ordered catalog of callable
//! shapes without taking the full cross product of every axis:
//!
//! 1. The legal parameter types are chunked per arity into parameter lists,
//!    so catalog size stays linear in the number of parameter types.
//! 2. Return types, parameter lists, the variadic flag and the variant's
//!    qualifier options are bound with [`cyclic_bind`]: the longest axis is
//!    walked once and every shorter axis wraps around in lock-step.
//! 3. Each binding is specialised into a free function, member function or
//!    closure with a synthesized identifier.

use crate::config::GrammarConfig;
use crate::grammar::{
    ExceptionSpec, Mutability, Qualifier, ReferenceKind, SignatureSets, TypeSignature,
};
use serde::{Deserialize, Serialize};

/// Identifier of the single member declared by a member-function fixture
pub const MEMBER_FUNCTION_NAME: &str = "mem_fn";

/// Values of the variadic axis
pub const VARIADIC_OPTIONS: [bool; 2] = [false, true];

/// Callable variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeVariant {
    /// Free-standing function
    FreeFunction,
    /// Non-static member function
    MemberFunction,
    /// Lambda closure object
    Closure,
}

impl ShapeVariant {
    /// All variants in catalog order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::FreeFunction, Self::MemberFunction, Self::Closure]
    }
}

impl std::fmt::Display for ShapeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FreeFunction => write!(f, "free_function"),
            Self::MemberFunction => write!(f, "member_function"),
            Self::Closure => write!(f, "closure"),
        }
    }
}

/// Trailing qualifiers of a member function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberQualifiers {
    /// cv-qualifier of the implicit object
    pub qualifier: Qualifier,
    /// Ref-qualifier of the implicit object
    pub reference: Option<ReferenceKind>,
    /// Exception specification
    pub exception: Option<ExceptionSpec>,
}

impl MemberQualifiers {
    /// Create member qualifiers
    #[must_use]
    pub const fn new(
        qualifier: Qualifier,
        reference: Option<ReferenceKind>,
        exception: Option<ExceptionSpec>,
    ) -> Self {
        Self {
            qualifier,
            reference,
            exception,
        }
    }

    /// No trailing qualifiers are written
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.qualifier.is_qualified() && self.reference.is_none() && self.exception.is_none()
    }

    /// Full cross product: exception (outer), reference, qualifier (inner)
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut all = Vec::with_capacity(24);
        for exception in ExceptionSpec::options() {
            for reference in ReferenceKind::options() {
                for qualifier in Qualifier::all() {
                    all.push(Self::new(qualifier, reference, exception));
                }
            }
        }
        all
    }
}

/// Specifiers of a closure's call operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClosureQualifiers {
    /// `mutable` marker
    pub mutability: Option<Mutability>,
    /// Exception specification
    pub exception: Option<ExceptionSpec>,
}

impl ClosureQualifiers {
    /// Create closure qualifiers
    #[must_use]
    pub const fn new(mutability: Option<Mutability>, exception: Option<ExceptionSpec>) -> Self {
        Self {
            mutability,
            exception,
        }
    }

    /// Call operator is declared `mutable`
    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.mutability.is_some()
    }

    /// Full cross product: exception (outer), mutability (inner)
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut all = Vec::with_capacity(4);
        for exception in ExceptionSpec::options() {
            for mutability in Mutability::options() {
                all.push(Self::new(mutability, exception));
            }
        }
        all
    }
}

/// Variant-specific part of a shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Free-standing function
    FreeFunction {
        /// Exception specification
        exception: Option<ExceptionSpec>,
    },
    /// Member function wrapped in its own struct
    MemberFunction {
        /// Enclosing struct identifier
        class_name: String,
        /// Trailing qualifiers
        qualifiers: MemberQualifiers,
    },
    /// Named lambda closure
    Closure {
        /// Closure instance identifier
        instance_name: String,
        /// Call-operator specifiers
        qualifiers: ClosureQualifiers,
    },
}

/// One fully bound, renderable callable fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableShape {
    /// Unique name within the catalog
    pub name: String,
    /// Return type
    pub return_type: TypeSignature,
    /// Parameter types, 0 to 4 entries
    pub parameters: Vec<TypeSignature>,
    /// Trailing C-style ellipsis
    pub variadic: bool,
    /// Variant-specific fields
    pub kind: ShapeKind,
}

impl CallableShape {
    /// Variant tag
    #[must_use]
    pub const fn variant(&self) -> ShapeVariant {
        match self.kind {
            ShapeKind::FreeFunction { .. } => ShapeVariant::FreeFunction,
            ShapeKind::MemberFunction { .. } => ShapeVariant::MemberFunction,
            ShapeKind::Closure { .. } => ShapeVariant::Closure,
        }
    }

    /// Number of declared parameters
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Exception specification of whichever variant this is
    #[must_use]
    pub const fn exception(&self) -> Option<ExceptionSpec> {
        match &self.kind {
            ShapeKind::FreeFunction { exception } => *exception,
            ShapeKind::MemberFunction { qualifiers, .. } => qualifiers.exception,
            ShapeKind::Closure { qualifiers, .. } => qualifiers.exception,
        }
    }
}

/// Identifier of the `index`-th free function
#[must_use]
pub fn free_function_name(index: usize) -> String {
    format!("fn_{index}")
}

/// Identifier of the struct enclosing the `index`-th member function
#[must_use]
pub fn class_name(index: usize) -> String {
    format!("class_{index}")
}

/// Identifier of the `index`-th closure instance
#[must_use]
pub fn closure_name(index: usize) -> String {
    format!("lambda_{index}")
}

/// Chunk `parameter_types` into contiguous lists for each arity in turn.
///
/// Arity 0 contributes exactly one empty list. For other arities the last
/// chunk may be shorter than the arity.
#[must_use]
pub fn parameter_lists(
    arities: &[usize],
    parameter_types: &[TypeSignature],
) -> Vec<Vec<TypeSignature>> {
    arities
        .iter()
        .flat_map(|&arity| -> Vec<Vec<TypeSignature>> {
            if arity == 0 {
                vec![Vec::new()]
            } else {
                parameter_types.chunks(arity).map(<[_]>::to_vec).collect()
            }
        })
        .collect()
}

/// One step of a cyclic binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<'a, Q> {
    /// Step index, also the synthesized identifier index
    pub index: usize,
    /// Bound return type
    pub return_type: &'a TypeSignature,
    /// Bound parameter list
    pub parameters: &'a [TypeSignature],
    /// Bound variadic flag
    pub variadic: bool,
    /// Bound variant qualifiers
    pub qualifiers: &'a Q,
}

/// Bind four axes position-synchronously.
///
/// Step `i` takes element `i % len` of every axis and runs for the length of
/// the longest axis. Yields nothing when any axis is empty.
#[must_use]
pub fn cyclic_bind<'a, Q>(
    return_types: &'a [TypeSignature],
    parameter_lists: &'a [Vec<TypeSignature>],
    variadic: &'a [bool],
    qualifiers: &'a [Q],
) -> Vec<Binding<'a, Q>> {
    let lens = [
        return_types.len(),
        parameter_lists.len(),
        variadic.len(),
        qualifiers.len(),
    ];
    if lens.contains(&0) {
        return Vec::new();
    }
    let steps = lens.iter().copied().max().unwrap_or(0);

    (0..steps)
        .map(|i| Binding {
            index: i,
            return_type: &return_types[i % lens[0]],
            parameters: &parameter_lists[i % lens[1]],
            variadic: variadic[i % lens[2]],
            qualifiers: &qualifiers[i % lens[3]],
        })
        .collect()
}

/// Ordered catalog of shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Shapes in catalog order
    pub shapes: Vec<CallableShape>,
}

impl Catalog {
    /// Total shape count
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes of one variant, in catalog order
    pub fn of_variant(&self, variant: ShapeVariant) -> impl Iterator<Item = &CallableShape> {
        self.shapes.iter().filter(move |s| s.variant() == variant)
    }

    /// Shape count of one variant
    #[must_use]
    pub fn count(&self, variant: ShapeVariant) -> usize {
        self.of_variant(variant).count()
    }
}

/// Builds a [`Catalog`] from a grammar configuration
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    signatures: SignatureSets,
    parameter_lists: Vec<Vec<TypeSignature>>,
    variants: Vec<ShapeVariant>,
}

impl CatalogBuilder {
    /// Enumerate and filter signatures and chunk the parameter lists
    #[must_use]
    pub fn new(config: &GrammarConfig) -> Self {
        let signatures = SignatureSets::for_base_types(&config.base_types);
        let parameter_lists = parameter_lists(&config.arities, &signatures.parameters);
        tracing::debug!(
            candidates = signatures.candidates,
            returns = signatures.returns.len(),
            parameters = signatures.parameters.len(),
            parameter_lists = parameter_lists.len(),
            "grammar filtered"
        );

        Self {
            signatures,
            parameter_lists,
            variants: config.variants.clone(),
        }
    }

    /// Filtered signature lists
    #[must_use]
    pub const fn signatures(&self) -> &SignatureSets {
        &self.signatures
    }

    /// Chunked parameter lists
    #[must_use]
    pub fn parameter_lists(&self) -> &[Vec<TypeSignature>] {
        &self.parameter_lists
    }

    /// Build every enabled variant in configuration order
    #[must_use]
    pub fn build(&self) -> Catalog {
        let mut shapes = Vec::new();
        for &variant in &self.variants {
            let before = shapes.len();
            match variant {
                ShapeVariant::FreeFunction => shapes.extend(self.free_functions()),
                ShapeVariant::MemberFunction => shapes.extend(self.member_functions()),
                ShapeVariant::Closure => shapes.extend(self.closures()),
            }
            tracing::debug!(%variant, count = shapes.len() - before, "shapes bound");
        }
        Catalog { shapes }
    }

    /// Free-function shapes
    #[must_use]
    pub fn free_functions(&self) -> Vec<CallableShape> {
        let exceptions = ExceptionSpec::options();
        self.bind(&exceptions)
            .into_iter()
            .map(|b| CallableShape {
                name: free_function_name(b.index),
                return_type: *b.return_type,
                parameters: b.parameters.to_vec(),
                variadic: b.variadic,
                kind: ShapeKind::FreeFunction {
                    exception: *b.qualifiers,
                },
            })
            .collect()
    }

    /// Member-function shapes, one struct each
    #[must_use]
    pub fn member_functions(&self) -> Vec<CallableShape> {
        let qualifiers = MemberQualifiers::all();
        self.bind(&qualifiers)
            .into_iter()
            .map(|b| {
                let class_name = class_name(b.index);
                CallableShape {
                    name: format!("{class_name}::{MEMBER_FUNCTION_NAME}"),
                    return_type: *b.return_type,
                    parameters: b.parameters.to_vec(),
                    variadic: b.variadic,
                    kind: ShapeKind::MemberFunction {
                        class_name,
                        qualifiers: *b.qualifiers,
                    },
                }
            })
            .collect()
    }

    /// Closure shapes
    #[must_use]
    pub fn closures(&self) -> Vec<CallableShape> {
        let qualifiers = ClosureQualifiers::all();
        self.bind(&qualifiers)
            .into_iter()
            .map(|b| {
                let instance_name = closure_name(b.index);
                CallableShape {
                    name: instance_name.clone(),
                    return_type: *b.return_type,
                    parameters: b.parameters.to_vec(),
                    variadic: b.variadic,
                    kind: ShapeKind::Closure {
                        instance_name,
                        qualifiers: *b.qualifiers,
                    },
                }
            })
            .collect()
    }

    fn bind<'a, Q>(&'a self, qualifiers: &'a [Q]) -> Vec<Binding<'a, Q>> {
        cyclic_bind(
            &self.signatures.returns,
            &self.parameter_lists,
            &VARIADIC_OPTIONS,
            qualifiers,
        )
    }
}
