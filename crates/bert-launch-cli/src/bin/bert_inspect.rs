//! Inspect a run directory and its dataset before launching.
//!
//! Prints which artifacts the run directory already holds, which dataset
//! shards exist, and what the training program would trip over for the
//! given mode. Exits non-zero when any finding is reported.
//!
//! ```bash
//! bert-inspect workplace/data-bin/dialogre          # train readiness
//! bert-inspect workplace/data-bin/dialogre test     # eval readiness
//! ```

use anyhow::Result;
use bert_launch::{LaunchConfig, Launcher, Mode, RunInventory};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bert-inspect", about = "Inspect a bert-launch run directory", version)]
struct Cli {
    /// Prepared dataset directory.
    databin: String,

    /// Mode to check readiness for.
    #[arg(default_value = "train")]
    mode: String,

    /// Extra training program arguments (only `--resume` changes the report).
    #[arg(last = true)]
    extra: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode: Mode = cli.mode.parse()?;

    let launcher = Launcher::new(LaunchConfig::from_env()?).with_extra_args(cli.extra);
    let invocation = launcher.plan_mode(&cli.databin, mode);
    let inventory = RunInventory::collect(&invocation);

    println!("Run directory : {}", inventory.output_dir.display());
    println!(
        "  exists      : {}",
        if inventory.output_dir_exists { "yes" } else { "no" }
    );
    for (name, present) in &inventory.artifacts {
        if *present {
            println!("  {name:<14}present");
        }
    }

    println!("Dataset       : {}", inventory.databin.display());
    for summary in &inventory.shards {
        println!(
            "  {:<12}{} shard(s) {:?}",
            summary.split.as_str(),
            summary.indices.len(),
            summary.indices
        );
    }

    println!("Model         : {}", inventory.model_dir.display());
    match inventory.model_family {
        Some(family) => println!("  family      : {family:?}"),
        None => println!("  family      : unsupported"),
    }

    let findings = inventory.findings(&invocation);
    println!();
    if findings.is_empty() {
        println!("Ready for {mode}.");
        return Ok(());
    }

    println!("{} problem(s) for {mode}:", findings.len());
    for finding in &findings {
        println!("  - {finding}");
    }
    std::process::exit(1);
}
