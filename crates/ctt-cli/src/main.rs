//! CTT CLI
//!
//! Command-line interface for generating callable-traits verification
//! fixtures.

#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]

use clap::{Parser, Subcommand};
use ctt_cli::{
    check_golden, generate_artifact, grammar_summary, init_tracing, load_config,
    manifest_to_string, render_helper, write_output,
};
use ctt_gen::GrammarConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ctt")]
#[command(about = "Callable-traits fixture generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the static_assert verification file
    Generate {
        /// Grammar config YAML (defaults reproduce the canonical file)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit the companion detection-helper header
    Helper {
        /// Grammar config YAML (for the helper namespace)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export every shape with its expected traits
    Manifest {
        /// Grammar config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Regenerate and compare against a golden file
    Check {
        /// Golden verification file
        #[arg(value_name = "GOLDEN")]
        golden: PathBuf,

        /// Grammar config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show counts at each pipeline stage
    Grammar {
        /// Grammar config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, output } => {
            let config = config_or_exit(config);
            emit(&generate_artifact(&config), output);
        }
        Commands::Helper { config, output } => {
            let config = config_or_exit(config);
            emit(&render_helper(&config), output);
        }
        Commands::Manifest {
            config,
            format,
            output,
        } => {
            let config = config_or_exit(config);
            match manifest_to_string(&config, &format) {
                Ok(text) => emit(&text, output),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { golden, config } => {
            let config = config_or_exit(config);
            run_check(&config, golden);
        }
        Commands::Grammar { config } => {
            let config = config_or_exit(config);
            println!("{}", grammar_summary(&config));
        }
    }
}

fn config_or_exit(path: Option<PathBuf>) -> GrammarConfig {
    match load_config(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn emit(content: &str, output: Option<PathBuf>) {
    if let Err(e) = write_output(content, output.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    if let Some(path) = output {
        eprintln!("Wrote {} bytes to {}", content.len(), path.display());
    }
}

fn run_check(config: &GrammarConfig, golden: PathBuf) {
    match check_golden(config, &golden) {
        Ok(result) if result.is_success() => println!("{}", result.message()),
        Ok(result) => {
            eprintln!("{}", result.message());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
