//! Proptest strategies for grammar and shape values
//!
//! Strategies draw from the whole declarator space, legal or not, so
//! properties can check that the filters and the oracle agree with the
//! grammar rather than with the generator's own enumeration.

use crate::catalog::{
    CallableShape, ClosureQualifiers, MEMBER_FUNCTION_NAME, MemberQualifiers, ShapeKind,
    class_name, closure_name, free_function_name,
};
use crate::grammar::{
    BaseType, ExceptionSpec, Mutability, PointerSpec, Qualifier, ReferenceKind, TypeSignature,
};
use proptest::prelude::*;

/// Strategy for qualifiers
pub fn qualifier_strategy() -> impl Strategy<Value = Qualifier> {
    prop::sample::select(Qualifier::all().to_vec())
}

/// Strategy for base types
pub fn base_type_strategy() -> impl Strategy<Value = BaseType> {
    prop::sample::select(BaseType::all().to_vec())
}

/// Strategy for reference declarators, including none
pub fn reference_strategy() -> impl Strategy<Value = Option<ReferenceKind>> {
    prop::sample::select(ReferenceKind::options().to_vec())
}

/// Strategy for exception specifications, including none
pub fn exception_strategy() -> impl Strategy<Value = Option<ExceptionSpec>> {
    prop::sample::select(ExceptionSpec::options().to_vec())
}

/// Strategy for any signature, legal or not
pub fn any_signature_strategy() -> impl Strategy<Value = TypeSignature> {
    (
        qualifier_strategy(),
        base_type_strategy(),
        prop::option::of(qualifier_strategy().prop_map(PointerSpec::new)),
        reference_strategy(),
    )
        .prop_map(|(q, b, p, r)| TypeSignature::new(q, b, p, r))
}

/// Strategy for signatures legal in a parameter position
pub fn parameter_signature_strategy() -> impl Strategy<Value = TypeSignature> {
    any_signature_strategy().prop_filter("legal parameter", TypeSignature::is_legal_parameter)
}

/// Strategy for signatures legal in a return position
pub fn return_signature_strategy() -> impl Strategy<Value = TypeSignature> {
    any_signature_strategy().prop_filter("legal return", TypeSignature::is_legal_return)
}

/// Strategy for member qualifiers
pub fn member_qualifiers_strategy() -> impl Strategy<Value = MemberQualifiers> {
    (qualifier_strategy(), reference_strategy(), exception_strategy())
        .prop_map(|(q, r, e)| MemberQualifiers::new(q, r, e))
}

/// Strategy for closure qualifiers
pub fn closure_qualifiers_strategy() -> impl Strategy<Value = ClosureQualifiers> {
    (
        prop::sample::select(Mutability::options().to_vec()),
        exception_strategy(),
    )
        .prop_map(|(m, e)| ClosureQualifiers::new(m, e))
}

/// Strategy for the variant-specific part of a shape
pub fn shape_kind_strategy(index: usize) -> impl Strategy<Value = ShapeKind> {
    prop_oneof![
        exception_strategy().prop_map(|exception| ShapeKind::FreeFunction { exception }),
        member_qualifiers_strategy().prop_map(move |qualifiers| ShapeKind::MemberFunction {
            class_name: class_name(index),
            qualifiers,
        }),
        closure_qualifiers_strategy().prop_map(move |qualifiers| ShapeKind::Closure {
            instance_name: closure_name(index),
            qualifiers,
        }),
    ]
}

/// Strategy for complete, legal shapes
pub fn shape_strategy() -> impl Strategy<Value = CallableShape> {
    (0usize..1000).prop_flat_map(|index| {
        (
            return_signature_strategy(),
            prop::collection::vec(parameter_signature_strategy(), 0..=4),
            any::<bool>(),
            shape_kind_strategy(index),
        )
            .prop_map(move |(return_type, parameters, variadic, kind)| {
                let name = match &kind {
                    ShapeKind::FreeFunction { .. } => free_function_name(index),
                    ShapeKind::MemberFunction { class_name, .. } => {
                        format!("{class_name}::{MEMBER_FUNCTION_NAME}")
                    }
                    ShapeKind::Closure { instance_name, .. } => instance_name.clone(),
                };
                CallableShape {
                    name,
                    return_type,
                    parameters,
                    variadic,
                    kind,
                }
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ShapeVariant, parameter_lists};
    use crate::oracle::TraitOracle;
    use crate::render::{Renderer, render_declaration, spell_type, trait_checks};
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_shape_strategy_generates_legal() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let shape = shape_strategy()
                .new_tree(&mut runner)
                .expect("Failed to generate")
                .current();
            assert!(shape.return_type.is_legal_return());
            assert!(shape.parameters.iter().all(TypeSignature::is_legal_parameter));
            assert!(shape.arity() <= 4);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_cv_conflict_never_legal(sig in any_signature_strategy()) {
            if sig.is_cv_conflicted() {
                prop_assert!(!sig.is_legal_return());
                prop_assert!(!sig.is_legal_parameter());
            }
        }

        #[test]
        fn prop_legal_parameter_is_legal_return(sig in parameter_signature_strategy()) {
            prop_assert!(sig.is_legal_return());
        }

        #[test]
        fn prop_reference_suppresses_conflict(sig in any_signature_strategy()) {
            if sig.is_reference() {
                prop_assert!(!sig.is_cv_conflicted());
            }
        }

        #[test]
        fn prop_variant_flags_exclusive(shape in shape_strategy()) {
            let oracle = TraitOracle::derive(&shape);
            prop_assert_eq!(
                oracle.is_member_function,
                shape.variant() == ShapeVariant::MemberFunction
            );
            prop_assert_eq!(oracle.is_functor, shape.variant() == ShapeVariant::Closure);
            prop_assert!(!(oracle.is_member_function && oracle.is_functor));
            prop_assert_eq!(oracle.has_class_type(), shape.variant() != ShapeVariant::FreeFunction);
        }

        #[test]
        fn prop_closure_const_is_not_mutable(qualifiers in closure_qualifiers_strategy()) {
            let shape = CallableShape {
                name: "lambda_0".to_string(),
                return_type: TypeSignature::value(BaseType::Int),
                parameters: vec![],
                variadic: false,
                kind: ShapeKind::Closure { instance_name: "lambda_0".to_string(), qualifiers },
            };
            let oracle = TraitOracle::derive(&shape);
            prop_assert_eq!(oracle.is_const, !qualifiers.is_mutable());
            prop_assert!(!oracle.is_volatile);
        }

        #[test]
        fn prop_arity_and_slots(shape in shape_strategy()) {
            let oracle = TraitOracle::derive(&shape);
            prop_assert_eq!(oracle.arity, shape.parameters.len());
            for i in 0..4 {
                prop_assert_eq!(oracle.has_named_arg(i), i < 3 && i < oracle.arity);
            }
        }

        #[test]
        fn prop_assertions_reference_only_declared_positions(shape in shape_strategy()) {
            let oracle = TraitOracle::derive(&shape);
            let lines = Renderer::default().render_assertions(&shape, &oracle, 0);
            prop_assert_eq!(lines.len(), trait_checks(&oracle).len());
            for i in shape.arity()..4 {
                let indexed = format!("::arg_type<{i}>");
                let named = format!("::arg{i}_type,");
                prop_assert!(!lines.iter().any(|l| l.contains(&indexed)));
                prop_assert!(!lines.iter().any(|l| l.contains(&named)));
            }
        }

        #[test]
        fn prop_declaration_spells_every_parameter(shape in shape_strategy()) {
            let declaration = render_declaration(&shape);
            for parameter in &shape.parameters {
                prop_assert!(declaration.contains(&spell_type(parameter)));
            }
            prop_assert_eq!(declaration.contains("..."), shape.variadic);
        }

        #[test]
        fn prop_chunks_preserve_order(
            params in prop::collection::vec(parameter_signature_strategy(), 0..20),
            arity in 1usize..=4,
        ) {
            let lists = parameter_lists(&[arity], &params);
            prop_assert!(lists.iter().all(|l| !l.is_empty() && l.len() <= arity));
            prop_assert_eq!(lists.concat(), params);
        }
    }
}
