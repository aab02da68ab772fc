//! hadex - GHCi debug adapter and diagnostics CLI
//!
//! Two modes:
//!
//! - `hadex serve` speaks the Debug Adapter Protocol on stdio. Logs go to
//!   stderr because stdout carries protocol frames.
//! - `hadex check <module>` loads a module once and prints its diagnostics,
//!   one per line, in `file:line:col: severity: message` form.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hadex_config::{load_config_or_default, resolve_config_path};
use hadex_ghci::parse::parse_load_output;
use hadex_ghci::{GhciCommand, GhciProcess, GhciSession};
use hadex_logging::LogConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "hadex", version, about = "GHCi debug adapter and diagnostics engine")]
struct Cli {
    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (defaults to $HADEX_CONFIG, then ./hadex.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the debug adapter over stdio
    Serve,
    /// Load a module once and print its diagnostics
    Check {
        /// Module name or source file to load
        module: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    match cli.command {
        Command::Serve => {
            hadex_logging::init(LogConfig::adapter(cli.debug));
            info!("Starting debug adapter on stdio");

            let ghci = Arc::new(
                GhciProcess::spawn(config.ghci)
                    .await
                    .context("starting interpreter session")?,
            );

            hadex_dap::serve(
                tokio::io::stdin(),
                tokio::io::stdout(),
                ghci,
                config.session,
            )
            .await
            .context("debug adapter failed")?;
        }

        Command::Check { module } => {
            hadex_logging::init(LogConfig::cli(cli.debug));

            let ghci = GhciProcess::spawn(config.ghci)
                .await
                .context("starting interpreter session")?;
            ghci.wait_ready().await.context("interpreter not ready")?;

            let output = ghci
                .send_command(&GhciCommand::Load(module))
                .await
                .context("loading module")?;
            let diagnostics = parse_load_output(&output).context("parsing compiler output")?;

            for entry in &diagnostics {
                let d = &entry.diagnostic;
                println!(
                    "{}:{}:{}: {}: {}",
                    entry.file,
                    d.span.start_line + 1,
                    d.span.start_column + 1,
                    d.severity.as_str(),
                    d.message.replace('\n', " ")
                );
            }

            ghci.shutdown().await.ok();

            if diagnostics
                .iter()
                .any(|e| e.diagnostic.severity == hadex_core::Severity::Error)
            {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
