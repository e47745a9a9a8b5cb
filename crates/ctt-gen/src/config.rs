//! Generator configuration
//!
//! The default configuration reproduces the canonical fixture file. A YAML
//! file may override any subset of fields; missing fields fall back to the
//! defaults and unknown keys are rejected.

use crate::catalog::ShapeVariant;
use crate::error::{Error, Result};
use crate::grammar::BaseType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Largest parameter count a generated shape may have
pub const MAX_ARITY: usize = 4;

/// An include line of the rendered artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Path as written between the delimiters
    pub name: String,
    /// `<...>` when true, `"..."` otherwise
    #[serde(default)]
    pub system: bool,
}

impl Header {
    /// A `<...>` include
    #[must_use]
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: true,
        }
    }

    /// A `"..."` include
    #[must_use]
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: false,
        }
    }
}

/// Grammar and rendering configuration for one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarConfig {
    /// Base types fed into the signature cross product
    pub base_types: Vec<BaseType>,
    /// Parameter counts to chunk the parameter types into, in order
    pub arities: Vec<usize>,
    /// Callable variants to emit, in catalog order
    pub variants: Vec<ShapeVariant>,
    /// Include lines at the top of the artifact
    pub headers: Vec<Header>,
    /// Name of the introspection class template
    pub traits_template: String,
    /// Namespace holding the `has_*_v` detection helpers
    pub helper_namespace: String,
    /// Route free-function assertions through qualified/pointer/reference
    /// forms of the function type
    pub wrap_free_function_types: bool,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            base_types: BaseType::all().to_vec(),
            arities: (0..=MAX_ARITY).collect(),
            variants: ShapeVariant::all().to_vec(),
            headers: default_headers(),
            traits_template: "callable_traits".to_string(),
            helper_namespace: "helper".to_string(),
            wrap_free_function_types: true,
        }
    }
}

impl GrammarConfig {
    /// Parse and validate a YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded grammar config");
        Self::from_yaml(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations the grammar cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.base_types.is_empty() {
            return Err(Error::InvalidConfig("no base types".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.base_types.iter().find(|b| !seen.insert(**b)) {
            return Err(Error::InvalidConfig(format!("duplicate base type: {dup}")));
        }

        if let Some(arity) = self.arities.iter().find(|&&a| a > MAX_ARITY) {
            return Err(Error::InvalidConfig(format!(
                "arity {arity} exceeds maximum of {MAX_ARITY}"
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.arities.iter().find(|a| !seen.insert(**a)) {
            return Err(Error::InvalidConfig(format!("duplicate arity: {dup}")));
        }

        if self.variants.is_empty() {
            return Err(Error::InvalidConfig("no callable variants".to_string()));
        }
        if self.traits_template.trim().is_empty() {
            return Err(Error::InvalidConfig("empty traits template name".to_string()));
        }
        if self.helper_namespace.trim().is_empty() {
            return Err(Error::InvalidConfig("empty helper namespace".to_string()));
        }

        Ok(())
    }
}

fn default_headers() -> Vec<Header> {
    vec![
        Header::system("functional"),
        Header::system("string"),
        Header::system("type_traits"),
        Header::local("../include/callable_traits.hpp"),
        Header::local("callable_traits_test_helper.hpp"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GrammarConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arities, vec![0, 1, 2, 3, 4]);
        assert_eq!(config.headers.len(), 5);
        assert!(config.wrap_free_function_types);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = GrammarConfig::from_yaml("base_types: [int, float]\n").expect("parse");
        assert_eq!(config.base_types, vec![BaseType::Int, BaseType::Float]);
        assert_eq!(config.traits_template, "callable_traits");
        assert_eq!(config.variants.len(), 3);
    }

    #[test]
    fn test_yaml_roundtrip_of_default() {
        let yaml = GrammarConfig::default().to_yaml().expect("serialize");
        let parsed = GrammarConfig::from_yaml(&yaml).expect("parse");
        assert_eq!(parsed, GrammarConfig::default());
    }

    #[test]
    fn test_reject_large_arity() {
        let err = GrammarConfig::from_yaml("arities: [0, 5]\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("arity 5"));
    }

    #[test]
    fn test_reject_duplicates() {
        assert!(GrammarConfig::from_yaml("arities: [1, 1]\n").is_err());
        assert!(GrammarConfig::from_yaml("base_types: [int, int]\n").is_err());
    }

    #[test]
    fn test_reject_empty_lists() {
        assert!(GrammarConfig::from_yaml("base_types: []\n").is_err());
        assert!(GrammarConfig::from_yaml("variants: []\n").is_err());
    }

    #[test]
    fn test_reject_blank_template() {
        let config = GrammarConfig {
            traits_template: "  ".to_string(),
            ..GrammarConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_blank_helper_namespace() {
        let config = GrammarConfig {
            helper_namespace: String::new(),
            ..GrammarConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("helper namespace"));
    }

    #[test]
    fn test_reject_misspelled_key() {
        let err = GrammarConfig::from_yaml("arity: [1]\n").unwrap_err();
        assert!(matches!(err, Error::YamlError(_)));
        assert!(err.to_string().contains("arity"));
    }

    #[test]
    fn test_reject_unknown_header_key() {
        let yaml = "headers:\n  - name: vector\n    sytem: true\n";
        assert!(matches!(
            GrammarConfig::from_yaml(yaml).unwrap_err(),
            Error::YamlError(_)
        ));
    }

    #[test]
    fn test_bad_yaml_is_yaml_error() {
        let err = GrammarConfig::from_yaml("arities: [").unwrap_err();
        assert!(matches!(err, Error::YamlError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grammar.yaml");
        std::fs::write(&path, "variants: [closure]\nwrap_free_function_types: false\n")
            .expect("write");
        let config = GrammarConfig::load(&path).expect("load");
        assert_eq!(config.variants, vec![ShapeVariant::Closure]);
        assert!(!config.wrap_free_function_types);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GrammarConfig::load(Path::new("/nonexistent/grammar.yaml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
