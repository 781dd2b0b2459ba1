//! Run mode selection

use crate::LaunchError;
use std::fmt;
use std::str::FromStr;

/// What the training program is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Train, then evaluate on dev and test
    Train,
    /// Evaluate a previously trained model
    Test,
}

impl Mode {
    /// Both modes
    pub const ALL: [Mode; 2] = [Mode::Train, Mode::Test];

    /// Name accepted on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }

    /// Phase switches passed ahead of the hyperparameters
    pub const fn phase_flags(self) -> &'static [&'static str] {
        match self {
            Self::Train => &["--do_train", "--do_eval"],
            Self::Test => &["--do_eval"],
        }
    }

    /// Log file written inside the run directory
    pub const fn log_file_name(self) -> &'static str {
        match self {
            Self::Train => "run.log",
            Self::Test => "eval.log",
        }
    }

    /// Whether the launcher creates the run directory before spawning
    pub const fn creates_output_dir(self) -> bool {
        matches!(self, Self::Train)
    }
}

impl FromStr for Mode {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            other => Err(LaunchError::invalid_mode(other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
