// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use hidl_compound::{ErrorMode, MarshalPlan};
use hidl_gen::{analyze, Backend, Generator, GeneratorConfig, Schema};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hidl-gen")]
#[command(about = "Compound-type layout and marshalling generator (YAML schema -> C++/Java/VTS)")]
#[command(version)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every struct and union in a schema
    Validate {
        /// Input schema YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print computed layouts and marshalling strategies
    Layout {
        /// Input schema YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit the plans as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate sources for every enabled backend
    Generate {
        /// Input schema YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Generator config YAML (CLI flags take precedence)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Backend to run (repeatable; all when omitted)
        #[arg(long, value_enum)]
        backend: Vec<Backend>,

        /// How native code exits on a bad status
        #[arg(long, value_enum)]
        error_mode: Option<ErrorModeArg>,

        /// Stop at the first rejected type
        #[arg(long)]
        fail_fast: bool,

        /// Override the schema package (a.b.c@1.0)
        #[arg(long)]
        package: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ErrorModeArg {
    Goto,
    Return,
}

impl From<ErrorModeArg> for ErrorMode {
    fn from(arg: ErrorModeArg) -> Self {
        match arg {
            ErrorModeArg::Goto => ErrorMode::Goto,
            ErrorModeArg::Return => ErrorMode::Return,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Layout { input, json } => cmd_layout(&input, json),
        Commands::Generate {
            input,
            output,
            config,
            backend,
            error_mode,
            fail_fast,
            package,
        } => {
            let mut cfg = match config {
                Some(path) => GeneratorConfig::load(&path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(dir) = output {
                cfg.output_dir = dir;
            }
            if !backend.is_empty() {
                cfg.backends = backend;
            }
            if let Some(mode) = error_mode {
                cfg.error_mode = mode.into();
            }
            if package.is_some() {
                cfg.package = package;
            }
            cfg.fail_fast |= fail_fast;
            cmd_generate(&input, cfg)
        }
    }
}

fn source_name(input: &Path) -> String {
    input
        .file_name()
        .map_or_else(|| input.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn cmd_validate(input: &Path) -> Result<()> {
    let model = Schema::load(input)?.build(None)?;
    let analysis = analyze(&model, false)?;

    for id in &analysis.accepted {
        println!("[OK] {}", model.arena.display_name(*id));
    }
    for rejection in &analysis.rejected {
        println!("[ERROR] {}", rejection.reason);
    }
    if !analysis.rejected.is_empty() {
        bail!("{} of {} types rejected", analysis.rejected.len(), model.compounds.len());
    }
    Ok(())
}

fn cmd_layout(input: &Path, json: bool) -> Result<()> {
    let model = Schema::load(input)?.build(None)?;
    let analysis = analyze(&model, false)?;
    let plans: Vec<MarshalPlan> = analysis
        .accepted
        .iter()
        .map(|id| MarshalPlan::build(&model.arena, *id))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    for plan in &plans {
        let strategy = if plan.is_flat() { "flat" } else { "live" };
        println!(
            "{} {} (align {}, size {}, {strategy})",
            plan.layout.style, plan.name, plan.layout.layout.align, plan.layout.layout.size
        );
        for slot in &plan.layout.fields {
            println!(
                "  +{:<4} {:<24} {} bytes, align {}",
                slot.offset, slot.name, slot.layout.size, slot.layout.align
            );
        }
    }
    for rejection in &analysis.rejected {
        println!("[ERROR] {}", rejection.reason);
    }
    Ok(())
}

fn cmd_generate(input: &Path, config: GeneratorConfig) -> Result<()> {
    let schema = Schema::load(input)?;
    let model = schema.build(config.package.as_deref())?;
    let generator = Generator::new(config)?;
    let report = generator.generate(&model, &source_name(input))?;
    report.summary();
    Ok(())
}
