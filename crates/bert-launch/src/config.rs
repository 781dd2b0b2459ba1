//! Launch configuration
//!
//! One record holds every value the launcher needs. Defaults are the literal
//! values the training setup was tuned with; only machine-specific paths and
//! the device index can be overridden from the environment.

use crate::{LaunchError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Overrides the pretrained model directory
pub const ENV_BASE_DIR: &str = "BERT_LAUNCH_BASE_DIR";
/// Overrides the compute device index
pub const ENV_DEVICE: &str = "BERT_LAUNCH_DEVICE";
/// Overrides the Python interpreter
pub const ENV_PYTHON: &str = "BERT_LAUNCH_PYTHON";
/// Overrides the training script path
pub const ENV_SCRIPT: &str = "BERT_LAUNCH_SCRIPT";

/// Default pretrained model directory
pub const DEFAULT_BASE_DIR: &str = "workplace/pretrained/bert-base-uncased";
/// Default parent directory of every run directory
pub const DEFAULT_OUTPUT_ROOT: &str = "workplace/output";
/// Default random seed
pub const DEFAULT_SEED: u64 = 3;
/// Default dataset category tag
pub const DEFAULT_DATASET_CATEGORY: &str = "v2";

/// Launcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Pretrained model directory, passed as `--model_name_or_path`
    pub base_dir: PathBuf,

    /// Compute device index exposed to the child via `CUDA_VISIBLE_DEVICES`
    pub device: u32,

    /// Random seed
    pub seed: u64,

    /// Dataset category tag
    pub dataset_category: String,

    /// Parent of all run directories
    pub output_root: PathBuf,

    /// Interpreter that runs the training script
    pub python: PathBuf,

    /// Training/evaluation script
    pub script: PathBuf,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            device: 0,
            seed: DEFAULT_SEED,
            dataset_category: DEFAULT_DATASET_CATEGORY.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            python: PathBuf::from("python"),
            script: PathBuf::from("run.py"),
        }
    }
}

impl LaunchConfig {
    /// Defaults with `BERT_LAUNCH_*` overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::InvalidConfig`] if `BERT_LAUNCH_DEVICE` is not
    /// an unsigned integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides resolved through `lookup`
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::InvalidConfig`] if the device override is not
    /// an unsigned integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_BASE_DIR) {
            debug!("{ENV_BASE_DIR}={dir}");
            config.base_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_DEVICE) {
            config.device = raw
                .trim()
                .parse()
                .map_err(|_| LaunchError::invalid_config(ENV_DEVICE, raw.clone()))?;
        }
        if let Some(python) = lookup(ENV_PYTHON) {
            config.python = PathBuf::from(python);
        }
        if let Some(script) = lookup(ENV_SCRIPT) {
            config.script = PathBuf::from(script);
        }

        Ok(config)
    }

    /// Replace the output root
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Replace the pretrained model directory
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Replace the interpreter and script
    #[must_use]
    pub fn with_program(mut self, python: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self.script = script.into();
        self
    }

    /// Replace the seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the dataset category
    #[must_use]
    pub fn with_dataset_category(mut self, category: impl Into<String>) -> Self {
        self.dataset_category = category.into();
        self
    }

    /// Name of the run directory for this seed and category
    pub fn run_name(&self) -> String {
        format!(
            "bert-base-512-seed-{}-{}-baseline",
            self.seed, self.dataset_category
        )
    }

    /// Run directory shared by train and test invocations
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(self.run_name())
    }
}
