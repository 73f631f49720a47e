// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sona transpiler command-line interface.
//!
//! This is the main entry point for the `sona` command.

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod diagnostic;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SONA_LOG";

/// Sona: a small scripting language that transpiles to Python
#[derive(Debug, Parser)]
#[command(name = "sona")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transpile Sona source files to Python
    Build {
        /// Source file or directory to transpile
        #[arg(default_value = ".")]
        path: String,

        /// Directory for generated Python (default: `build/` in the project root)
        #[arg(short, long)]
        out_dir: Option<String>,

        #[command(flatten)]
        overrides: OptionFlags,

        /// Print a JSON report per file instead of rendered diagnostics
        #[arg(long)]
        json: bool,
    },

    /// Check source files for errors without writing output
    Check {
        /// Source file or directory to check
        #[arg(default_value = ".")]
        path: String,

        #[command(flatten)]
        overrides: OptionFlags,

        /// Print a JSON report per file instead of rendered diagnostics
        #[arg(long)]
        json: bool,
    },
}

/// Flags that override `sona.toml`.
#[derive(Debug, Default, Clone, Args)]
pub struct OptionFlags {
    /// Python module imported with `from <module> import *`
    #[arg(long, value_name = "MODULE")]
    pub runtime: Option<String>,

    /// Omit the generated-file header
    #[arg(long)]
    pub no_header: bool,

    /// Write a `.py.map` source map next to each output file
    #[arg(long, conflicts_with = "no_source_map")]
    pub source_map: bool,

    /// Do not write source maps
    #[arg(long)]
    pub no_source_map: bool,

    /// Target line width for generated Python
    #[arg(long, value_name = "COLUMNS")]
    pub line_width: Option<usize>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Build {
            path,
            out_dir,
            overrides,
            json,
        } => commands::build::build(&path, out_dir.as_deref(), &overrides, json),
        Command::Check {
            path,
            overrides,
            json,
        } => commands::build::check(&path, &overrides, json),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr; stdout is reserved for `--json` reports.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are module paths: the binary is `sona`, the library `sona_core`.
    match v {
        0 => "warn",
        1 => "sona=info,sona_core=info",
        2 => "sona=debug,sona_core=debug",
        _ => "sona=trace,sona_core=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "warn");
        assert_eq!(directive_for_verbosity(1), "sona=info,sona_core=info");
        assert_eq!(directive_for_verbosity(5), "sona=trace,sona_core=trace");
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::parse_from([
            "sona",
            "-vv",
            "build",
            "src",
            "-o",
            "out",
            "--runtime",
            "rt",
            "--no-header",
            "--line-width",
            "100",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Build {
            path,
            out_dir,
            overrides,
            json,
        } = cli.command
        else {
            panic!("expected build");
        };
        assert_eq!(path, "src");
        assert_eq!(out_dir.as_deref(), Some("out"));
        assert_eq!(overrides.runtime.as_deref(), Some("rt"));
        assert!(overrides.no_header);
        assert_eq!(overrides.line_width, Some(100));
        assert!(!json);
    }

    #[test]
    fn check_defaults_to_current_directory() {
        let cli = Cli::parse_from(["sona", "check", "--json"]);
        let Command::Check { path, json, .. } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(path, ".");
        assert!(json);
    }
}
