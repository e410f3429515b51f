//! Top-level CLI definition and dispatch.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde_json::json;

use crate::core::config::Config;
use crate::core::errors::{ArtifactError, Result};
use crate::naming::ArtifactRequest;
use crate::platform::pal::LocalFs;
use crate::resolver::SafeLengthBudget;
use crate::writer::ArtifactWriter;

/// artpath: reserve unique, filesystem-safe paths for test artifacts.
#[derive(Parser)]
#[command(name = "artpath", version, about)]
pub struct Cli {
    /// TOML config file. Defaults plus ARTPATH_* environment otherwise.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Show the directory segments and file name a request maps to (no I/O).
    Name {
        /// JSON artifact request file.
        request: PathBuf,
    },
    /// Reserve a path for a file without extension.
    Resolve {
        /// Target path without extension.
        without_ext: PathBuf,
        /// Extension without the leading dot.
        #[arg(long)]
        ext: Option<String>,
        /// Reuse the canonical name instead of adding a " (N)" suffix.
        #[arg(long)]
        overwrite: bool,
        /// Include every probed candidate in the output.
        #[arg(long)]
        trace: bool,
    },
    /// Reserve a path for a request and write content into it.
    Save {
        /// JSON artifact request file.
        request: PathBuf,
        /// File whose bytes become the artifact.
        content: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Name { request } => {
            let request = read_request(request)?;
            // Planning does no I/O, so the event log is left closed.
            let writer = ArtifactWriter::new(
                Arc::new(LocalFs),
                SafeLengthBudget::from_config(&config.naming),
                config.paths.output_root.clone(),
                config.naming.default_extension.clone(),
            );
            let plan = writer.plan(&request);
            if cli.json {
                print_json(&json!({ "command": "name", "plan": plan }))?;
            } else {
                for segment in &plan.name.dir_segments {
                    println!("{} {segment}", "dir ".dimmed());
                }
                println!("{} {}", "name".bold(), plan.name.base_name);
                println!(
                    "{} {}.{}",
                    "path".bold(),
                    plan.without_ext.display(),
                    plan.extension
                );
            }
        }
        Command::Resolve {
            without_ext,
            ext,
            overwrite,
            trace,
        } => {
            let writer = ArtifactWriter::from_config(&config, Arc::new(LocalFs))?;
            let extension = ext
                .clone()
                .unwrap_or_else(|| config.naming.default_extension.clone());
            let resolution = writer
                .resolver()
                .resolve_traced(without_ext, &extension, *overwrite)?;
            if cli.json {
                let mut payload = json!({
                    "command": "resolve",
                    "path": resolution.path.display().to_string(),
                    "budget_bytes": writer.resolver().budget().current(),
                });
                if *trace {
                    payload["attempts"] = serde_json::to_value(&resolution.attempts)?;
                }
                print_json(&payload)?;
            } else {
                if *trace {
                    for attempt in &resolution.attempts {
                        println!(
                            "{} #{} budget={} {}",
                            format!("{:?}", attempt.outcome).to_lowercase().dimmed(),
                            attempt.duplicate_index,
                            attempt.budget_bytes,
                            attempt.candidate.display()
                        );
                    }
                }
                println!("{} {}", "reserved".green().bold(), resolution.path.display());
            }
        }
        Command::Save { request, content } => {
            let request = read_request(request)?;
            let bytes = std::fs::read(content).map_err(|e| ArtifactError::io(content, e))?;
            let writer = ArtifactWriter::from_config(&config, Arc::new(LocalFs))?;
            let saved = writer.save(&request, &bytes)?;
            if cli.json {
                print_json(&json!({ "command": "save", "artifact": saved }))?;
            } else {
                println!(
                    "{} {} ({} bytes)",
                    "saved".green().bold(),
                    saved.path.display(),
                    saved.size_bytes
                );
            }
        }
        Command::Config => {
            if cli.json {
                print_json(&json!({ "command": "config", "config": config }))?;
            } else {
                print!("{}", config.to_toml()?);
            }
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "artpath", &mut io::stdout());
        }
    }
    Ok(())
}

fn read_request(path: &Path) -> Result<ArtifactRequest> {
    let raw = std::fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
