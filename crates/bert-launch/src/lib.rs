//! Launcher for the entity-max BERT relation classification trainer.
//!
//! The training program (`run.py`) is driven entirely through its command
//! line. This crate resolves the run directory from the seed and dataset
//! category, assembles the fixed baseline flags for a train or test run,
//! and relays the program's combined output to the console and a log file.
//!
//! # Run layout
//!
//! ```text
//! workplace/output/bert-base-512-seed-{seed}-{category}-baseline/
//!   run.log      train mode (--do_train --do_eval)
//!   eval.log     test mode (--do_eval)
//!   model.pt     written by the training program
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use bert_launch::{LaunchConfig, Launcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let launcher = Launcher::new(LaunchConfig::from_env()?);
//! let code = launcher.run("workplace/data-bin/dialogre", "train")?;
//! std::process::exit(code);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod config;
mod error;
pub mod inventory;
mod invocation;
mod launcher;
mod mode;
mod tee;

pub use config::LaunchConfig;
pub use error::{LaunchError, Result, EXIT_COMMAND_NOT_FOUND};
pub use inventory::{Finding, ModelFamily, RunInventory, Split};
pub use invocation::{Hyperparameters, Invocation, DEVICE_ENV};
pub use launcher::{exit_code, Launcher};
pub use mode::Mode;
pub use tee::Tee;

/// Commonly used types.
pub mod prelude {
    pub use crate::{Invocation, LaunchConfig, LaunchError, Launcher, Mode, Result};
}
