//! Trait oracle derivation
//!
//! The oracle is the expected answer the introspection facility must give
//! for a shape. It is computed from the shape's own fields only, so any
//! disagreement between the two is a defect in the facility (or in the
//! grammar model), never a tautology.

use crate::catalog::{CallableShape, ShapeKind};
use crate::grammar::{ReferenceKind, TypeSignature};
use serde::{Deserialize, Serialize};

/// Argument positions the facility exposes as `argN_type`
pub const NAMED_ARG_SLOTS: usize = 3;

/// Argument positions probed for named-slot presence
pub const PROBED_ARG_SLOTS: usize = 4;

/// Expected `class_type` of a member function or closure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ClassIdentity {
    /// The struct enclosing a member function
    Struct(String),
    /// The closure type of a named lambda instance
    Closure(String),
}

/// Expected trait values for one shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TraitOracle {
    /// `result_type`
    pub result_type: TypeSignature,
    /// `arg_type<N>` for every position
    pub arg_types: Vec<TypeSignature>,
    /// `arity`
    pub arity: usize,
    /// `is_variadic`
    pub is_variadic: bool,
    /// `is_member_function`
    pub is_member_function: bool,
    /// `is_functor`
    pub is_functor: bool,
    /// `is_noexcept`
    pub is_noexcept: bool,
    /// `is_const`
    pub is_const: bool,
    /// `is_volatile`
    pub is_volatile: bool,
    /// `is_lvalue_reference`
    pub is_lvalue_reference: bool,
    /// `is_rvalue_reference`
    pub is_rvalue_reference: bool,
    /// `class_type`, absent for free functions
    pub class_type: Option<ClassIdentity>,
}

impl TraitOracle {
    /// Derive the expected traits of `shape`
    #[must_use]
    pub fn derive(shape: &CallableShape) -> Self {
        let mut oracle = Self {
            result_type: shape.return_type,
            arg_types: shape.parameters.clone(),
            arity: shape.arity(),
            is_variadic: shape.variadic,
            is_member_function: false,
            is_functor: false,
            is_noexcept: shape.exception().is_some(),
            is_const: false,
            is_volatile: false,
            is_lvalue_reference: false,
            is_rvalue_reference: false,
            class_type: None,
        };

        match &shape.kind {
            ShapeKind::FreeFunction { .. } => {}
            ShapeKind::MemberFunction {
                class_name,
                qualifiers,
            } => {
                oracle.is_member_function = true;
                oracle.is_const = qualifiers.qualifier.is_const();
                oracle.is_volatile = qualifiers.qualifier.is_volatile();
                oracle.is_lvalue_reference = qualifiers.reference == Some(ReferenceKind::LValue);
                oracle.is_rvalue_reference = qualifiers.reference == Some(ReferenceKind::RValue);
                oracle.class_type = Some(ClassIdentity::Struct(class_name.clone()));
            }
            ShapeKind::Closure {
                instance_name,
                qualifiers,
            } => {
                // A non-mutable lambda's call operator is implicitly const.
                oracle.is_functor = true;
                oracle.is_const = !qualifiers.is_mutable();
                oracle.class_type = Some(ClassIdentity::Closure(instance_name.clone()));
            }
        }

        oracle
    }

    /// Whether `argN_type` should exist for position `index`
    #[must_use]
    pub fn has_named_arg(&self, index: usize) -> bool {
        index < NAMED_ARG_SLOTS && index < self.arity
    }

    /// Presence of `arg0_type` through `arg3_type`
    #[must_use]
    pub fn named_slot_presence(&self) -> [bool; PROBED_ARG_SLOTS] {
        std::array::from_fn(|i| self.has_named_arg(i))
    }

    /// Expected `argN_type`, if that slot exists
    #[must_use]
    pub fn named_arg(&self, index: usize) -> Option<&TypeSignature> {
        if self.has_named_arg(index) {
            self.arg_types.get(index)
        } else {
            None
        }
    }

    /// Expected `arg_type<index>`, if the position exists
    #[must_use]
    pub fn indexed_arg(&self, index: usize) -> Option<&TypeSignature> {
        self.arg_types.get(index)
    }

    /// Whether `class_type` should exist
    #[must_use]
    pub const fn has_class_type(&self) -> bool {
        self.class_type.is_some()
    }
}
