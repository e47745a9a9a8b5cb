//! Example: Inspecting the shape catalog
//!
//! Builds the catalog for a narrowed grammar and prints the first few
//! shapes of each variant with their declarations and expected traits.
//!
//! Run with: `cargo run --example inspect_catalog -p ctt-gen`

#![allow(clippy::missing_panics_doc)]

use ctt_gen::render::render_declaration;
use ctt_gen::{BaseType, CatalogBuilder, GrammarConfig, ShapeVariant, TraitOracle};

fn main() {
    // Two base types and unary/binary lists keep the output short
    let config = GrammarConfig {
        base_types: vec![BaseType::Int, BaseType::String],
        arities: vec![1, 2],
        ..GrammarConfig::default()
    };

    let builder = CatalogBuilder::new(&config);
    let sets = builder.signatures();
    println!(
        "{} candidates, {} return types, {} parameter types, {} parameter lists",
        sets.candidates,
        sets.returns.len(),
        sets.parameters.len(),
        builder.parameter_lists().len()
    );
    println!();

    let catalog = builder.build();
    for variant in ShapeVariant::all() {
        println!("{variant} ({} shapes):", catalog.count(variant));
        for shape in catalog.of_variant(variant).take(3) {
            let oracle = TraitOracle::derive(shape);
            println!("  {}", render_declaration(shape));
            println!(
                "    arity={} variadic={} noexcept={} const={} class_type={}",
                oracle.arity,
                oracle.is_variadic,
                oracle.is_noexcept,
                oracle.is_const,
                oracle.has_class_type()
            );
        }
        println!();
    }
}
