//! Declarator grammar and validity model
//!
//! Defines the finite option set of every type-construction axis and the
//! legality predicates that decide which [`TypeSignature`]s may appear in a
//! return position or a parameter position.
//!
//! The predicates model a deliberately narrow declarator subset. A reference
//! suppresses the cv-conflict check entirely, so `int * const &` is legal
//! while `int * const` is not.

use serde::{Deserialize, Serialize};

/// cv-qualifier on a value type or on a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// No qualifier
    None,
    /// `const`
    Const,
    /// `volatile`
    Volatile,
    /// `const volatile`
    ConstVolatile,
}

impl Qualifier {
    /// All qualifiers, unqualified first
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::None, Self::Const, Self::Volatile, Self::ConstVolatile]
    }

    /// Whether any qualifier is present
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether the qualifier includes `const`
    #[must_use]
    pub const fn is_const(&self) -> bool {
        matches!(self, Self::Const | Self::ConstVolatile)
    }

    /// Whether the qualifier includes `volatile`
    #[must_use]
    pub const fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile | Self::ConstVolatile)
    }
}

/// Base (unqualified, non-compound) type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// `void`
    Void,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `std::string`
    String,
}

impl BaseType {
    /// All base types in grammar order
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [Self::Void, Self::Bool, Self::Int, Self::Float, Self::String]
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Pointer declarator, qualified on the pointer itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerSpec {
    /// Qualifier of the pointer object (`* const`), not of the pointee
    pub qualifier: Qualifier,
}

impl PointerSpec {
    /// Create a pointer declarator
    #[must_use]
    pub const fn new(qualifier: Qualifier) -> Self {
        Self { qualifier }
    }

    /// Pointer axis options: no pointer, then one pointer per qualifier
    #[must_use]
    pub fn options() -> Vec<Option<Self>> {
        std::iter::once(None)
            .chain(Qualifier::all().into_iter().map(|q| Some(Self::new(q))))
            .collect()
    }
}

/// Reference declarator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `&`
    LValue,
    /// `&&`
    RValue,
}

impl ReferenceKind {
    /// Reference axis options: no reference, lvalue, rvalue
    #[must_use]
    pub const fn options() -> [Option<Self>; 3] {
        [None, Some(Self::LValue), Some(Self::RValue)]
    }
}

/// Exception specification marking a callable as non-throwing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionSpec {
    /// `noexcept`
    Noexcept,
}

impl ExceptionSpec {
    /// Exception axis options: potentially throwing, then `noexcept`
    #[must_use]
    pub const fn options() -> [Option<Self>; 2] {
        [None, Some(Self::Noexcept)]
    }
}

/// Closure call-operator mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// `mutable`
    Mutable,
}

impl Mutability {
    /// Mutability axis options: implicitly const, then `mutable`
    #[must_use]
    pub const fn options() -> [Option<Self>; 2] {
        [None, Some(Self::Mutable)]
    }
}

/// Full description of a return or parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSignature {
    /// Qualifier on the base type
    pub qualifier: Qualifier,
    /// Base type
    pub base: BaseType,
    /// Optional pointer declarator
    pub pointer: Option<PointerSpec>,
    /// Optional reference declarator
    pub reference: Option<ReferenceKind>,
}

impl TypeSignature {
    /// Create a type signature
    #[must_use]
    pub const fn new(
        qualifier: Qualifier,
        base: BaseType,
        pointer: Option<PointerSpec>,
        reference: Option<ReferenceKind>,
    ) -> Self {
        Self {
            qualifier,
            base,
            pointer,
            reference,
        }
    }

    /// Unqualified plain value of `base`
    #[must_use]
    pub const fn value(base: BaseType) -> Self {
        Self::new(Qualifier::None, base, None, None)
    }

    /// Has a pointer declarator
    #[must_use]
    pub const fn is_pointer(&self) -> bool {
        self.pointer.is_some()
    }

    /// Has a reference declarator
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Neither pointer nor reference
    #[must_use]
    pub const fn is_value(&self) -> bool {
        !(self.is_pointer() || self.is_reference())
    }

    /// Base type is `void`
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self.base, BaseType::Void)
    }

    /// A cv-qualified plain value, or a cv-qualified pointer not bound by a
    /// reference. Both are dropped from the grammar.
    #[must_use]
    pub const fn is_cv_conflicted(&self) -> bool {
        let qualified_value = self.is_value() && self.qualifier.is_qualified();
        let qualified_pointer = match self.pointer {
            Some(pointer) => pointer.qualifier.is_qualified() && !self.is_reference(),
            None => false,
        };
        qualified_value || qualified_pointer
    }

    /// Whether the signature can be written as a return type
    #[must_use]
    pub const fn is_legal_return(&self) -> bool {
        let void_reference = self.is_void() && self.is_reference() && !self.is_pointer();
        !(self.is_cv_conflicted() || void_reference)
    }

    /// Whether the signature can be written as a parameter type
    #[must_use]
    pub const fn is_legal_parameter(&self) -> bool {
        let void_value_or_reference = self.is_void()
            && (self.is_value() || (self.is_reference() && !self.is_pointer()));
        !(void_value_or_reference || self.is_cv_conflicted())
    }
}

/// Cross product of all axes for the given base types.
///
/// Order: base type, reference, pointer, qualifier (innermost).
#[must_use]
pub fn enumerate_signatures(base_types: &[BaseType]) -> Vec<TypeSignature> {
    let pointers = PointerSpec::options();
    let mut candidates = Vec::with_capacity(base_types.len() * 3 * pointers.len() * 4);

    for &base in base_types {
        for reference in ReferenceKind::options() {
            for &pointer in &pointers {
                for qualifier in Qualifier::all() {
                    candidates.push(TypeSignature::new(qualifier, base, pointer, reference));
                }
            }
        }
    }

    candidates
}

/// Candidate signatures split by the position they may legally occupy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSets {
    /// Number of candidates before filtering
    pub candidates: usize,
    /// Legal return types, in candidate order
    pub returns: Vec<TypeSignature>,
    /// Legal parameter types, in candidate order
    pub parameters: Vec<TypeSignature>,
}

impl SignatureSets {
    /// Filter `candidates` through both legality predicates
    #[must_use]
    pub fn partition(candidates: &[TypeSignature]) -> Self {
        let returns = candidates
            .iter()
            .copied()
            .filter(TypeSignature::is_legal_return)
            .collect();
        let parameters = candidates
            .iter()
            .copied()
            .filter(TypeSignature::is_legal_parameter)
            .collect();

        Self {
            candidates: candidates.len(),
            returns,
            parameters,
        }
    }

    /// Enumerate and partition in one step
    #[must_use]
    pub fn for_base_types(base_types: &[BaseType]) -> Self {
        Self::partition(&enumerate_signatures(base_types))
    }
}
