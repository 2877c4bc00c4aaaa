// Unistore - Unified Object Storage
// Copyright (C) 2025 Unistore Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use commands::*;
use std::io;
use std::path::PathBuf;
use unistore_config::Config;
use unistore_observability::{init_tracing_with_config, LogConfig, LogFormat};
use unistore_storage::StorageError;

#[derive(Parser)]
#[command(name = "unistore")]
#[command(version, about = "Unified object storage for MinIO, S3 and Aliyun OSS")]
#[command(
    long_about = "Unistore talks to MinIO, Amazon S3 and Aliyun OSS through one set of commands.
Provider errors are reported with the same codes whichever backend is configured."
)]
#[command(propagate_version = true)]
#[command(author = "Unistore Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON); UNISTORE_* variables are used when absent
    #[arg(short, long, global = true, value_name = "FILE", env = "UNISTORE_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log format (pretty|compact|json); overrides the configuration file
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Colored output
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorChoice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Always,
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// List objects under a prefix
    Ls(LsCmd),

    /// Write an object to stdout
    Cat(CatCmd),

    /// Download an object to a local file
    Get(GetCmd),

    /// Upload a local file
    Put(PutCmd),

    /// Delete an object
    Rm(RmCmd),

    /// Copy an object
    Cp(CpCmd),

    /// Move an object
    Mv(MvCmd),

    /// Check whether an object exists
    Exists(ExistsCmd),

    /// Create a bucket
    Mb(MbCmd),

    /// Create a bucket unless it exists
    #[command(name = "ensure-bucket")]
    EnsureBucket(EnsureBucketCmd),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Never => console::set_colors_enabled(false),
        ColorChoice::Always => console::set_colors_enabled(true),
        ColorChoice::Auto => {}
    }

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return;
    }

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref()).await?;
    init_logging(&cli, &config)?;

    let ctx = Context::connect(config).await?;

    match &cli.command {
        Commands::Ls(cmd) => cmd.execute(&ctx).await,
        Commands::Cat(cmd) => cmd.execute(&ctx).await,
        Commands::Get(cmd) => cmd.execute(&ctx).await,
        Commands::Put(cmd) => cmd.execute(&ctx).await,
        Commands::Rm(cmd) => cmd.execute(&ctx).await,
        Commands::Cp(cmd) => cmd.execute(&ctx).await,
        Commands::Mv(cmd) => cmd.execute(&ctx).await,
        Commands::Exists(cmd) => cmd.execute(&ctx).await.map(|_| ()),
        Commands::Mb(cmd) => cmd.execute(&ctx).await,
        Commands::EnsureBucket(cmd) => cmd.execute(&ctx).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn log_config(cli: &Cli, config: &Config) -> Result<LogConfig> {
    let settings = &config.observability;
    let mut log = LogConfig::from_settings(&settings.log_level, &settings.log_format)?
        .with_verbosity(cli.verbose)
        .with_color(console::colors_enabled_stderr());

    if let Some(format) = cli.log_format {
        log = log.with_format(format);
    }
    if cli.quiet {
        log = log.with_level("error");
    }
    Ok(log)
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let log = log_config(cli, config)?;
    // A subscriber installed by an embedding process wins.
    init_tracing_with_config(&log).ok();
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<StorageError>() {
        Some(storage) => output::error(&output::storage_error(storage)),
        None => output::error(&format!("Error: {:#}", err)),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "unistore", &mut io::stdout());
}
