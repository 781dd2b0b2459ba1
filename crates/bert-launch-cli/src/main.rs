//! `bert-launch`: train or evaluate the entity-max BERT baseline.
//!
//! ```text
//! USAGE:
//!   bert-launch <DATABIN> train          Train + evaluate, log to run.log
//!   bert-launch <DATABIN> test           Evaluate only, log to eval.log
//!   bert-launch <DATABIN> <MODE> --dry-run
//!   bert-launch <DATABIN> train -- --resume --f1eval
//! ```
//!
//! Machine-specific paths come from `BERT_LAUNCH_BASE_DIR`,
//! `BERT_LAUNCH_DEVICE`, `BERT_LAUNCH_PYTHON` and `BERT_LAUNCH_SCRIPT`.

use anyhow::{Context, Result};
use bert_launch::{LaunchConfig, LaunchError, Launcher};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bert-launch",
    about = "Train or evaluate the entity-max BERT relation classifier",
    version
)]
struct Cli {
    /// Prepared dataset directory, passed through as --save_data.
    databin: String,

    /// Run mode: `train` or `test`.
    mode: String,

    /// Print the command line and log destination without running anything.
    #[arg(long)]
    dry_run: bool,

    /// Append to the log file instead of overwriting it.
    #[arg(long)]
    append_log: bool,

    /// Extra arguments for the training program, after `--`.
    #[arg(last = true)]
    extra: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let launch_err = err.downcast_ref::<LaunchError>();
            // The mode rejection goes to stdout verbatim, like the shell wrapper's echo.
            if let Some(e @ LaunchError::InvalidMode { .. }) = launch_err {
                println!("{e}");
            } else {
                eprintln!("Error: {err:#}");
            }
            std::process::exit(launch_err.map_or(1, LaunchError::exit_code));
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = LaunchConfig::from_env().context("reading BERT_LAUNCH_* overrides")?;
    let launcher = Launcher::new(config)
        .with_extra_args(cli.extra)
        .with_append_log(cli.append_log);

    if cli.dry_run {
        let invocation = launcher.plan(&cli.databin, &cli.mode)?;
        println!("{}", invocation.render());
        return Ok(0);
    }

    Ok(launcher.run(&cli.databin, &cli.mode)?)
}
