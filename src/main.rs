/// solts command line entry point
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use solts_codegen::{new_file, OverloadPolicy, Printer, TypeScriptPrinter};
use solts_compiler::compile_contracts;

mod config;

use config::SoltsConfig;

#[derive(Parser)]
#[command(name = "solts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a typed TypeScript client from a Solidity source file
    Generate {
        /// Solidity source file
        source: PathBuf,

        /// Output file; standard output when omitted
        destination: Option<PathBuf>,

        /// Compiler binary
        #[arg(long)]
        solc: Option<String>,

        /// How overloaded functions are exposed (mangle or combine)
        #[arg(long)]
        policy: Option<OverloadPolicy>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = SoltsConfig::load(cli.config.as_deref())?;

    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Generate { source, destination, solc, policy } => {
            if let Some(solc) = solc {
                config.solc = solc;
            }
            if let Some(policy) = policy {
                config.codegen.overload_policy = policy;
            }
            generate(&config, &source, destination.as_deref()).await
        }
    }
}

/// Logs go to stderr so generated code on stdout stays clean
fn init_tracing(config: &SoltsConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn generate(config: &SoltsConfig, source: &Path, destination: Option<&Path>) -> Result<()> {
    let file = source.to_string_lossy().to_string();
    let content = tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read source file: {}", source.display()))?;

    info!(source = %file, solc = %config.solc, "compiling");
    let compiler = config.compiler();
    let contracts = compile_contracts(&compiler, &file, &content)
        .await
        .with_context(|| format!("Failed to compile {}", file))?;

    let module = new_file(&contracts, &config.codegen)
        .with_context(|| format!("Failed to generate client for {}", file))?;
    let text = TypeScriptPrinter::new().print(&module);

    match destination {
        Some(path) => {
            tokio::fs::write(path, &text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                destination = %path.display(),
                contracts = contracts.len(),
                policy = %config.codegen.overload_policy,
                "generated client"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
