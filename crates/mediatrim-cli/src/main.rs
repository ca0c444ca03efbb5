// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! `mediatrim` command line entry point

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use mediatrim_cli::commands::*;
use mediatrim_cli::{output, AppContext};
use mediatrim_config::Config;
use mediatrim_observability::{init_tracing_with_config, LogConfig, LogFormat};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediatrim")]
#[command(version, about = "Plan partial transfers of source media from edited timelines")]
#[command(
    long_about = "MediaTrim reads edited timelines and works out the minimal set of source
media ranges to move, merging nearby ranges and padding them with handles."
)]
#[command(propagate_version = true)]
#[command(author = "MediaTrim Contributors")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output
    #[arg(long, global = true, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Configuration file (TOML, YAML or JSON); defaults to ./mediatrim.toml when present
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Always,
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate timeline manifests into a transfer plan
    Plan(PlanCmd),

    /// Show transfer plan statistics
    Stats(StatsCmd),

    /// Estimate transfer savings of a plan
    Savings(SavingsCmd),

    /// Build a consolidated timeline from a plan
    Conform(ConformCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Never => console::set_colors_enabled(false),
        ColorChoice::Always => console::set_colors_enabled(true),
        ColorChoice::Auto => {}
    }

    let result = run(cli).await;

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // commands that need no configuration
    match cli.command {
        Commands::Version => {
            print_version();
            return Ok(());
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            return Ok(());
        }
        _ => {}
    }

    let ctx = AppContext::load(cli.config.as_deref(), cli.quiet).await?;
    init_logging(&ctx.config, cli.verbose, cli.quiet, cli.color)?;

    match cli.command {
        Commands::Plan(cmd) => cmd.execute(&ctx).await,
        Commands::Stats(cmd) => cmd.execute(&ctx).await,
        Commands::Savings(cmd) => cmd.execute(&ctx).await,
        Commands::Conform(cmd) => cmd.execute(&ctx).await,
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}

/// Flags beat `RUST_LOG`, which beats the configured level
fn init_logging(config: &Config, verbose: u8, quiet: bool, color: ColorChoice) -> Result<()> {
    let format: LogFormat = config
        .observability
        .log_format
        .parse()
        .context("Invalid observability.log_format")?;

    let mut log_config = LogConfig::for_verbosity(verbose, quiet)
        .with_format(format)
        .with_targets(verbose > 1)
        .with_color(match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::colors_enabled_stderr(),
        });
    if std::env::var_os("RUST_LOG").is_none() {
        log_config = log_config.with_default_level(config.observability.log_level.to_lowercase());
    }

    init_tracing_with_config(&log_config)?;
    Ok(())
}

fn print_version() {
    println!("mediatrim {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "mediatrim", &mut io::stdout());
}
