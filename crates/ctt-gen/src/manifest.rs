//! Machine-readable export of a generation pass
//!
//! Lists every shape with its rendered declaration and derived oracle, plus
//! a SHA-256 digest of the artifact so a golden file can be pinned without
//! diffing it.

use crate::catalog::{CallableShape, Catalog, ShapeVariant};
use crate::error::Result;
use crate::oracle::TraitOracle;
use crate::render::render_declaration;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One shape and its expected traits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Shape name
    pub name: String,
    /// Variant tag
    pub variant: ShapeVariant,
    /// Declaration as rendered
    pub declaration: String,
    /// Shape fields
    pub shape: CallableShape,
    /// Derived oracle
    pub oracle: TraitOracle,
}

/// Shape counts per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantCounts {
    /// Free functions
    pub free_functions: usize,
    /// Member functions
    pub member_functions: usize,
    /// Closures
    pub closures: usize,
}

/// Export of one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Generator version
    pub generator_version: String,
    /// Hex SHA-256 of the artifact text
    pub artifact_sha256: String,
    /// Counts per variant
    pub counts: VariantCounts,
    /// Records in catalog order
    pub shapes: Vec<ShapeRecord>,
}

impl Manifest {
    /// Build a manifest for `catalog` and the artifact rendered from it
    #[must_use]
    pub fn new(catalog: &Catalog, artifact: &str) -> Self {
        let shapes = catalog
            .shapes
            .iter()
            .map(|shape| ShapeRecord {
                name: shape.name.clone(),
                variant: shape.variant(),
                declaration: render_declaration(shape),
                shape: shape.clone(),
                oracle: TraitOracle::derive(shape),
            })
            .collect();

        Self {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            artifact_sha256: artifact_digest(artifact),
            counts: VariantCounts {
                free_functions: catalog.count(ShapeVariant::FreeFunction),
                member_functions: catalog.count(ShapeVariant::MemberFunction),
                closures: catalog.count(ShapeVariant::Closure),
            },
            shapes,
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Hex SHA-256 of an artifact
#[must_use]
pub fn artifact_digest(artifact: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(artifact.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrammarConfig;
    use crate::catalog::CatalogBuilder;

    fn small_catalog() -> Catalog {
        let config = GrammarConfig {
            base_types: vec![crate::grammar::BaseType::Int],
            arities: vec![0, 2],
            ..GrammarConfig::default()
        };
        CatalogBuilder::new(&config).build()
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let digest = artifact_digest("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_counts_match_catalog() {
        let catalog = small_catalog();
        let manifest = Manifest::new(&catalog, "");
        assert_eq!(manifest.shapes.len(), catalog.len());
        assert_eq!(
            manifest.counts.free_functions
                + manifest.counts.member_functions
                + manifest.counts.closures,
            catalog.len()
        );
    }

    #[test]
    fn test_manifest_oracle_arity_matches_shape() {
        let manifest = Manifest::new(&small_catalog(), "");
        for record in &manifest.shapes {
            assert_eq!(record.oracle.arity, record.shape.parameters.len());
        }
    }

    #[test]
    fn test_manifest_json_roundtrip() {
        let manifest = Manifest::new(&small_catalog(), "text");
        let json = manifest.to_json().expect("json");
        let parsed: Manifest = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_manifest_yaml_mentions_declarations() {
        let manifest = Manifest::new(&small_catalog(), "text");
        let yaml = manifest.to_yaml().expect("yaml");
        assert!(yaml.contains("artifact_sha256"));
        assert!(yaml.contains("fn_0"));
        assert!(yaml.contains("variant: member_function"));
    }
}
