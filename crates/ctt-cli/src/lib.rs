//! CTT CLI Library
//!
//! Library functions for the `ctt` fixture generator front end. Everything
//! that touches the filesystem lives here so `ctt-gen` stays pure.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use ctt_gen::{
    CatalogBuilder, Generation, GrammarConfig, Renderer, ShapeVariant, artifact_digest,
};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Once;

/// Result of a CLI operation
#[derive(Debug)]
pub enum CliResult {
    /// Operation succeeded
    Success(String),
    /// Operation failed with error
    Error(String),
}

impl CliResult {
    /// Returns true if the result is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a stderr tracing subscriber when `RUST_LOG` is set.
///
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Load and validate a grammar config, or fall back to the default
pub fn load_config(path: Option<&Path>) -> Result<GrammarConfig, String> {
    let config = match path {
        Some(path) => GrammarConfig::load(path)
            .map_err(|e| format!("Error loading config {}: {e}", path.display()))?,
        None => GrammarConfig::default(),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Render the verification artifact
pub fn generate_artifact(config: &GrammarConfig) -> String {
    ctt_gen::generate(config)
}

/// Render the companion detection-helper header
pub fn render_helper(config: &GrammarConfig) -> String {
    Renderer::new(config).render_helper_header()
}

/// Serialize the manifest for `config` as `yaml` or `json`
pub fn manifest_to_string(config: &GrammarConfig, format: &str) -> Result<String, String> {
    let manifest = Generation::run(config).manifest();
    match format {
        "yaml" => manifest
            .to_yaml()
            .map_err(|e| format!("Error serializing manifest: {e}")),
        "json" => manifest
            .to_json()
            .map_err(|e| format!("Error serializing manifest: {e}")),
        _ => Err(format!("Unknown format: {format}")),
    }
}

/// Write `content` to `path`, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating {}: {e}", parent.display()))?;
            }
            std::fs::write(path, content)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "wrote output");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| format!("Error writing to stdout: {e}"))
        }
    }
}

/// First line where two texts disagree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMismatch {
    /// 1-based line number
    pub line: usize,
    /// Line in the golden file, if it has one there
    pub expected: Option<String>,
    /// Line in the regenerated artifact, if it has one there
    pub actual: Option<String>,
}

impl fmt::Display for LineMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "first difference at line {}:", self.line)?;
        writeln!(
            f,
            "  golden:    {}",
            self.expected.as_deref().unwrap_or("<end of file>")
        )?;
        write!(
            f,
            "  generated: {}",
            self.actual.as_deref().unwrap_or("<end of file>")
        )
    }
}

/// Locate the first differing line between `expected` and `actual`.
///
/// Texts that differ only in a trailing newline report the line after the
/// last one.
pub fn first_difference(expected: &str, actual: &str) -> Option<LineMismatch> {
    if expected == actual {
        return None;
    }
    let mut left = expected.split('\n');
    let mut right = actual.split('\n');
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (None, None) => return None,
            (a, b) => {
                return Some(LineMismatch {
                    line,
                    expected: a.map(str::to_string),
                    actual: b.map(str::to_string),
                });
            }
        }
    }
}

/// Regenerate the artifact and compare it byte for byte with `golden`
pub fn check_golden(config: &GrammarConfig, golden: &Path) -> Result<CliResult, String> {
    let expected = std::fs::read_to_string(golden)
        .map_err(|e| format!("Error reading golden file {}: {e}", golden.display()))?;
    let actual = generate_artifact(config);

    if expected == actual {
        return Ok(CliResult::Success(format!(
            "{} matches ({} bytes, sha256 {})",
            golden.display(),
            actual.len(),
            artifact_digest(&actual)
        )));
    }

    let detail = first_difference(&expected, &actual)
        .map_or_else(|| "contents differ".to_string(), |m| m.to_string());
    Ok(CliResult::Error(format!(
        "{} does not match generated output\n{detail}",
        golden.display()
    )))
}

/// Counts at each pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarSummary {
    /// Enumerated signatures
    pub candidates: usize,
    /// Signatures legal as return types
    pub returns: usize,
    /// Signatures legal as parameter types
    pub parameters: usize,
    /// Parameter lists across all arities
    pub parameter_lists: usize,
    /// Free-function shapes
    pub free_functions: usize,
    /// Member-function shapes
    pub member_functions: usize,
    /// Closure shapes
    pub closures: usize,
}

impl fmt::Display for GrammarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "candidates:       {}", self.candidates)?;
        writeln!(f, "return types:     {}", self.returns)?;
        writeln!(f, "parameter types:  {}", self.parameters)?;
        writeln!(f, "parameter lists:  {}", self.parameter_lists)?;
        writeln!(f, "free functions:   {}", self.free_functions)?;
        writeln!(f, "member functions: {}", self.member_functions)?;
        write!(f, "closures:         {}", self.closures)
    }
}

/// Summarize the grammar and catalog for `config`
pub fn grammar_summary(config: &GrammarConfig) -> GrammarSummary {
    let builder = CatalogBuilder::new(config);
    let catalog = builder.build();
    let sets = builder.signatures();
    GrammarSummary {
        candidates: sets.candidates,
        returns: sets.returns.len(),
        parameters: sets.parameters.len(),
        parameter_lists: builder.parameter_lists().len(),
        free_functions: catalog.count(ShapeVariant::FreeFunction),
        member_functions: catalog.count(ShapeVariant::MemberFunction),
        closures: catalog.count(ShapeVariant::Closure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctt_gen::BaseType;
    use tempfile::TempDir;

    fn small_config() -> GrammarConfig {
        GrammarConfig {
            base_types: vec![BaseType::Int],
            arities: vec![0, 1],
            ..GrammarConfig::default()
        }
    }

    #[test]
    fn test_cli_result_success() {
        let result = CliResult::Success("ok".to_string());
        assert!(result.is_success());
        assert_eq!(result.message(), "ok");
    }

    #[test]
    fn test_cli_result_error() {
        let result = CliResult::Error("bad".to_string());
        assert!(!result.is_success());
        assert_eq!(result.message(), "bad");
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn test_load_config_default() {
        let config = load_config(None).expect("default config");
        assert_eq!(config, GrammarConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("grammar.yaml");
        std::fs::write(&path, "base_types: [int, float]\narities: [0, 2]\n").expect("write");

        let config = load_config(Some(&path)).expect("config");
        assert_eq!(config.base_types, vec![BaseType::Int, BaseType::Float]);
        assert_eq!(config.arities, vec![0, 2]);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("grammar.yaml");
        std::fs::write(&path, "arities: [5]\n").expect("write");

        let err = load_config(Some(&path)).expect_err("arity 5 is rejected");
        assert!(err.contains("Invalid config"));
    }

    #[test]
    fn test_load_config_rejects_misspelled_key() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("grammar.yaml");
        std::fs::write(&path, "arity: [1]\n").expect("write");

        let err = load_config(Some(&path)).expect_err("unknown key is rejected");
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/grammar.yaml")))
            .expect_err("missing file");
        assert!(err.contains("Error loading config"));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("out.cpp");
        write_output("int main() { return 0; }\n", Some(&path)).expect("write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "int main() { return 0; }\n"
        );
    }

    #[test]
    fn test_render_helper_uses_namespace() {
        let config = GrammarConfig {
            helper_namespace: "probe".to_string(),
            ..GrammarConfig::default()
        };
        let header = render_helper(&config);
        assert!(header.contains("namespace probe {"));
        assert!(header.contains("has_class_type_v"));
    }

    #[test]
    fn test_manifest_formats() {
        let config = small_config();
        let json = manifest_to_string(&config, "json").expect("json");
        assert!(json.trim_start().starts_with('{'));
        let yaml = manifest_to_string(&config, "yaml").expect("yaml");
        assert!(yaml.contains("artifact_sha256"));
        assert!(manifest_to_string(&config, "toml").is_err());
    }

    #[test]
    fn test_first_difference_identical() {
        assert_eq!(first_difference("a\nb\n", "a\nb\n"), None);
    }

    #[test]
    fn test_first_difference_changed_line() {
        let mismatch = first_difference("a\nb\nc\n", "a\nx\nc\n").expect("differs");
        assert_eq!(mismatch.line, 2);
        assert_eq!(mismatch.expected.as_deref(), Some("b"));
        assert_eq!(mismatch.actual.as_deref(), Some("x"));
    }

    #[test]
    fn test_first_difference_truncated() {
        let mismatch = first_difference("a\nb", "a").expect("differs");
        assert_eq!(mismatch.line, 2);
        assert_eq!(mismatch.expected.as_deref(), Some("b"));
        assert_eq!(mismatch.actual, None);
        assert!(mismatch.to_string().contains("<end of file>"));
    }

    #[test]
    fn test_check_golden_match_and_mismatch() {
        let config = small_config();
        let dir = TempDir::new().expect("tempdir");
        let golden = dir.path().join("golden.cpp");

        std::fs::write(&golden, generate_artifact(&config)).expect("write");
        let result = check_golden(&config, &golden).expect("check");
        assert!(result.is_success());

        std::fs::write(&golden, "/* stale */\n").expect("write");
        let result = check_golden(&config, &golden).expect("check");
        assert!(!result.is_success());
        assert!(result.message().contains("line 1"));
    }

    #[test]
    fn test_check_golden_missing_file() {
        let err = check_golden(&small_config(), Path::new("/nonexistent/golden.cpp"))
            .expect_err("missing golden");
        assert!(err.contains("Error reading golden file"));
    }

    #[test]
    fn test_grammar_summary_default() {
        let summary = grammar_summary(&GrammarConfig::default());
        assert_eq!(summary.candidates, 300);
        assert_eq!(summary.returns, 217);
        assert_eq!(summary.parameters, 216);
        assert_eq!(summary.parameter_lists, 451);
        assert_eq!(summary.free_functions, 451);
        assert_eq!(summary.member_functions, 451);
        assert_eq!(summary.closures, 451);
        assert!(summary.to_string().contains("parameter lists:  451"));
    }
}
