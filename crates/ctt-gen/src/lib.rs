//! Callable-traits fixture generator
//!
//! Models the grammar of legal callable declarations, enumerates a bounded
//! cross-section of it, derives the expected introspection traits of every
//! declaration independently of the facility under test, and renders
//! declarations plus `static_assert`s into one C++ verification file.
//!
//! # Pipeline
//!
//! ```text
//! GrammarConfig -> grammar (filter) -> catalog (bind) -> oracle -> render
//! ```
//!
//! Every stage is a pure function of its input; generating twice from the
//! same configuration yields byte-identical text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod grammar;
pub mod manifest;
pub mod oracle;
pub mod proptest_impl;
pub mod render;

pub use catalog::{
    CallableShape, Catalog, CatalogBuilder, ClosureQualifiers, MemberQualifiers, ShapeKind,
    ShapeVariant,
};
pub use config::{GrammarConfig, Header};
pub use error::{Error, Result};
pub use grammar::{
    BaseType, ExceptionSpec, Mutability, PointerSpec, Qualifier, ReferenceKind, SignatureSets,
    TypeSignature,
};
pub use manifest::{Manifest, artifact_digest};
pub use oracle::{ClassIdentity, TraitOracle};
pub use render::Renderer;

/// Result of one generation pass
#[derive(Debug, Clone)]
pub struct Generation {
    /// Bound shapes in catalog order
    pub catalog: Catalog,
    /// Rendered verification file
    pub artifact: String,
}

impl Generation {
    /// Run the whole pipeline for `config`
    #[must_use]
    pub fn run(config: &GrammarConfig) -> Self {
        let catalog = CatalogBuilder::new(config).build();
        let artifact = Renderer::new(config).render(&catalog);
        tracing::info!(
            shapes = catalog.len(),
            bytes = artifact.len(),
            "generation complete"
        );
        Self { catalog, artifact }
    }

    /// Manifest describing this pass
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest::new(&self.catalog, &self.artifact)
    }
}

/// Render the verification file for `config`
#[must_use]
pub fn generate(config: &GrammarConfig) -> String {
    Generation::run(config).artifact
}
