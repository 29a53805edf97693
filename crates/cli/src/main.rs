//! lattice-cfg — check, inspect, and preprocess lattice configuration
//! files.

mod render;

use std::fs;
use std::io::{IsTerminal, Read};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lattice_cfg_core::{ConfigResult, ParseContext, expand_variables, parse_str, to_pretty_json};
use lattice_cfg_diagnostics::Diagnostic;
use tracing_subscriber::EnvFilter;

use crate::render::{print_summary, render_pretty};

#[derive(Parser, Debug)]
#[command(
    name = "lattice-cfg",
    version,
    about = "lattice configuration toolchain — check, inspect, and preprocess config files"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check a config file: expand variables, parse, and report
    /// diagnostics. Exits 1 when the file has errors.
    #[command(visible_alias = "lint")]
    Check {
        /// Config file to check, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Parse a config file and print the full result (config, diagnostics,
    /// error replies) as JSON.
    Parse {
        /// Config file to parse, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Print the config file with `set $name value` variables expanded.
    Expand {
        /// Config file to expand, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

/// True when output should be machine-readable JSON: requested
/// explicitly, or stdout is not a terminal.
fn json_output(flag: Option<&str>) -> bool {
    match flag {
        Some("json") => true,
        Some(_) => false,
        None => !std::io::stdout().is_terminal(),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let json = json_output(cli.output.as_deref());
    match cli.cmd {
        Cmd::Check { file } => {
            let (expanded, result, context, diagnostics) = load_and_parse(&file)?;
            if json {
                let envelope = serde_json::json!({
                    "success": !context.has_errors,
                    "has_warnings": context.has_warnings,
                    "diagnostics": diagnostics,
                    "replies": result.replies,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&envelope).context("serializing check result")?
                );
            } else {
                render_pretty(&expanded, &context.filename, &diagnostics);
                print_summary(&diagnostics);
            }
            Ok(if context.has_errors { 1 } else { 0 })
        }

        Cmd::Parse { file } => {
            let (expanded, result, context, diagnostics) = load_and_parse(&file)?;
            let merged = ConfigResult {
                config: result.config,
                diagnostics,
                replies: result.replies,
            };
            println!("{}", to_pretty_json(&merged));
            if !json {
                render_pretty(&expanded, &context.filename, &merged.diagnostics);
            }
            Ok(0)
        }

        Cmd::Expand { file } => {
            let source = read_input(&file)?;
            let mut context = ParseContext::new(display_name(&file));
            let mut diagnostics = Vec::new();
            let expanded = expand_variables(&source, &mut context, &mut diagnostics);
            print!("{expanded}");
            if !json {
                render_pretty(&source, &context.filename, &diagnostics);
            }
            Ok(0)
        }
    }
}

/// Read, preprocess, and parse a config file. Returns the expanded source
/// (diagnostic spans refer to it), the parse result, the context, and the
/// merged diagnostic stream (preprocessor first, then parse order).
fn load_and_parse(file: &str) -> Result<(String, ConfigResult, ParseContext, Vec<Diagnostic>)> {
    let source = read_input(file)?;
    let mut context = ParseContext::new(display_name(file));
    let mut diagnostics = Vec::new();
    let expanded = expand_variables(&source, &mut context, &mut diagnostics);
    let result = parse_str(&expanded, &mut context);
    diagnostics.extend(result.diagnostics.iter().cloned());
    Ok((expanded, result, context, diagnostics))
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(file).with_context(|| format!("reading {file}"))
    }
}

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}
