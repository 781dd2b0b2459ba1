//! Run directory inventory
//!
//! Read-only snapshot of what a run directory and its dataset look like, and
//! what the training program will make of them. The program refuses to
//! train over an existing `model.pt` unless `--resume` is passed, needs
//! `model.pt` for evaluation, and loads up to ten pickled shards per split.

use crate::{Invocation, Mode};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Highest shard index the training program tries, exclusive
pub const MAX_SHARDS: usize = 10;

/// Files the training program and the launcher leave in a run directory
pub const ARTIFACTS: [&str; 8] = [
    "model.pt",
    "model_best.pt",
    "logits_dev.txt",
    "logits_test.txt",
    "run.log",
    "eval.log",
    "runing.log",
    "dummy.json",
];

/// Dataset split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Training shards
    Train,
    /// Validation shards
    Dev,
    /// Test shards
    Test,
}

impl Split {
    /// All splits in load order
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    /// File name prefix
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Dev => "dev",
            Self::Test => "test",
        }
    }

    /// Splits a mode loads
    pub fn required_by(mode: Mode) -> &'static [Split] {
        match mode {
            Mode::Train => &Self::ALL,
            Mode::Test => &[Split::Dev, Split::Test],
        }
    }
}

/// Pretrained model family, as the training program detects it from the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// RoBERTa checkpoint
    Roberta,
    /// BERT checkpoint
    Bert,
}

impl ModelFamily {
    /// Substring match on the path; `roberta` wins since it contains `bert`
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy();
        if name.contains("roberta") {
            Some(Self::Roberta)
        } else if name.contains("bert") {
            Some(Self::Bert)
        } else {
            None
        }
    }
}

/// Shards found for one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSummary {
    /// Split
    pub split: Split,
    /// Shard indices present
    pub indices: Vec<usize>,
}

impl ShardSummary {
    fn scan(databin: &Path, split: Split) -> Self {
        let indices = (0..MAX_SHARDS)
            .filter(|idx| shard_path(databin, split, *idx).is_file())
            .collect();
        Self { split, indices }
    }
}

/// Path of one pickled shard
pub fn shard_path(databin: &Path, split: Split, idx: usize) -> PathBuf {
    databin.join(format!("{}-{idx}.pkl", split.as_str()))
}

/// Something that will make the training program fail or misbehave
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Pretrained model directory does not exist
    MissingModelDir(PathBuf),
    /// Model path names neither BERT nor RoBERTa
    UnsupportedModel(PathBuf),
    /// No shards for a split the mode loads
    MissingShards(Split),
    /// Training over a finished run without `--resume`
    WouldOverwrite(PathBuf),
    /// Evaluation without trained weights
    MissingWeights(PathBuf),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModelDir(p) => write!(f, "pretrained model not found: {}", p.display()),
            Self::UnsupportedModel(p) => write!(
                f,
                "{} is not supported, consider BERT or Roberta",
                p.display()
            ),
            Self::MissingShards(s) => write!(f, "no {}-*.pkl shards in dataset", s.as_str()),
            Self::WouldOverwrite(p) => write!(
                f,
                "{} exists; training will refuse to start without --resume",
                p.display()
            ),
            Self::MissingWeights(p) => write!(f, "{} missing; nothing to evaluate", p.display()),
        }
    }
}

/// Snapshot of a run directory and its inputs
#[derive(Debug, Clone)]
pub struct RunInventory {
    /// Run directory
    pub output_dir: PathBuf,
    /// Whether the run directory exists
    pub output_dir_exists: bool,
    /// Known artifacts and whether each is present
    pub artifacts: Vec<(&'static str, bool)>,
    /// Dataset directory
    pub databin: PathBuf,
    /// Shards per split
    pub shards: Vec<ShardSummary>,
    /// Pretrained model directory
    pub model_dir: PathBuf,
    /// Whether the pretrained model directory exists
    pub model_dir_exists: bool,
    /// Detected model family
    pub model_family: Option<ModelFamily>,
}

impl RunInventory {
    /// Inspect the filesystem for what `invocation` will use
    ///
    /// The dataset and model paths are read back from the invocation's
    /// `--save_data` and `--model_name_or_path` values.
    pub fn collect(invocation: &Invocation) -> Self {
        let path_of = |flag: &str| {
            invocation
                .flag_value(flag)
                .map(PathBuf::from)
                .unwrap_or_default()
        };
        let databin = path_of("--save_data");
        let model_dir = path_of("--model_name_or_path");
        let output_dir = invocation.output_dir.clone();
        debug!("Inspecting {}", output_dir.display());

        let artifacts = ARTIFACTS
            .iter()
            .map(|name| (*name, output_dir.join(name).is_file()))
            .collect();
        let shards = Split::ALL
            .iter()
            .map(|split| ShardSummary::scan(&databin, *split))
            .collect();

        Self {
            output_dir_exists: output_dir.is_dir(),
            output_dir,
            artifacts,
            databin,
            shards,
            model_dir_exists: model_dir.is_dir(),
            model_family: ModelFamily::detect(&model_dir),
            model_dir,
        }
    }

    /// Whether artifact `name` is present
    pub fn has_artifact(&self, name: &str) -> bool {
        self.artifacts.iter().any(|(n, present)| *n == name && *present)
    }

    /// Shard summary for `split`
    pub fn shards_for(&self, split: Split) -> Option<&ShardSummary> {
        self.shards.iter().find(|s| s.split == split)
    }

    /// Problems the training program will hit for `invocation`
    pub fn findings(&self, invocation: &Invocation) -> Vec<Finding> {
        let mut findings = Vec::new();

        if !self.model_dir_exists {
            findings.push(Finding::MissingModelDir(self.model_dir.clone()));
        }
        if self.model_family.is_none() {
            findings.push(Finding::UnsupportedModel(self.model_dir.clone()));
        }

        for split in Split::required_by(invocation.mode) {
            let empty = self
                .shards_for(*split)
                .map_or(true, |s| s.indices.is_empty());
            if empty {
                findings.push(Finding::MissingShards(*split));
            }
        }

        let weights = self.output_dir.join("model.pt");
        match invocation.mode {
            Mode::Train if self.has_artifact("model.pt") && !invocation.has_flag("--resume") => {
                findings.push(Finding::WouldOverwrite(weights));
            }
            Mode::Test if !self.has_artifact("model.pt") => {
                findings.push(Finding::MissingWeights(weights));
            }
            _ => {}
        }

        findings
    }
}
