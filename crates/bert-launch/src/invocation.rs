//! Command-line assembly for the training program
//!
//! The hyperparameters are fixed for this baseline. Everything that varies
//! between runs (mode, dataset, paths) comes from [`LaunchConfig`] and the
//! launch arguments.

use crate::{LaunchConfig, Mode};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::Command;

/// Environment variable that restricts the child to one device
pub const DEVICE_ENV: &str = "CUDA_VISIBLE_DEVICES";

/// Fixed training hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    /// Model architecture tag
    pub architecture: &'static str,
    /// Maximum tokenized sequence length
    pub max_seq_length: u32,
    /// Number of relation labels
    pub num_labels: u32,
    /// Training batch size before gradient accumulation
    pub train_batch_size: u32,
    /// Evaluation batch size
    pub eval_batch_size: u32,
    /// Peak learning rate
    pub learning_rate: f64,
    /// Number of training epochs
    pub num_train_epochs: u32,
    /// Classification head variant
    pub model_type: &'static str,
    /// Entity dropout probability
    pub entity_drop: f64,
    /// Gradient accumulation steps
    pub gradient_accumulation_steps: u32,
}

impl Hyperparameters {
    /// The BERT-base 512-token entity-max baseline
    pub const BASELINE: Self = Self {
        architecture: "STD",
        max_seq_length: 512,
        num_labels: 36,
        train_batch_size: 24,
        eval_batch_size: 1,
        learning_rate: 3e-5,
        num_train_epochs: 30,
        model_type: "entity-max",
        entity_drop: 0.1,
        gradient_accumulation_steps: 2,
    };
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// A fully resolved child process launch
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Mode this invocation runs
    pub mode: Mode,
    /// Interpreter
    pub program: PathBuf,
    /// Script followed by all flags
    pub args: Vec<OsString>,
    /// Environment set on the child only
    pub envs: Vec<(String, String)>,
    /// Run directory
    pub output_dir: PathBuf,
    /// Log file the combined output is copied to
    pub log_path: PathBuf,
}

impl Invocation {
    /// Assemble the launch for `mode` against dataset `databin`
    pub fn new(
        config: &LaunchConfig,
        hparams: &Hyperparameters,
        mode: Mode,
        databin: &str,
        extra_args: &[String],
    ) -> Self {
        let output_dir = config.output_dir();
        let log_path = output_dir.join(mode.log_file_name());

        let mut args: Vec<OsString> = vec![config.script.clone().into()];
        args.extend(mode.phase_flags().iter().map(OsString::from));

        let mut flag = |name: &str, value: OsString| {
            args.push(name.into());
            args.push(value);
        };
        flag("--architecture", hparams.architecture.into());
        flag("--seed", config.seed.to_string().into());
        flag("--model_name_or_path", config.base_dir.clone().into());
        flag("--max_seq_length", hparams.max_seq_length.to_string().into());
        flag("--num_labels", hparams.num_labels.to_string().into());
        flag("--train_batch_size", hparams.train_batch_size.to_string().into());
        flag("--eval_batch_size", hparams.eval_batch_size.to_string().into());
        flag("--learning_rate", format!("{:e}", hparams.learning_rate).into());
        flag("--num_train_epochs", hparams.num_train_epochs.to_string().into());
        flag("--output_dir", output_dir.clone().into());
        flag("--model_type", hparams.model_type.into());
        flag("--entity_drop", hparams.entity_drop.to_string().into());
        flag("--save_data", databin.into());
        flag(
            "--gradient_accumulation_steps",
            hparams.gradient_accumulation_steps.to_string().into(),
        );

        args.extend(extra_args.iter().map(OsString::from));

        Self {
            mode,
            program: config.python.clone(),
            args,
            envs: vec![(DEVICE_ENV.to_string(), config.device.to_string())],
            output_dir,
            log_path,
        }
    }

    /// Value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
    }

    /// Whether a bare switch such as `--do_train` is present
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Build the `Command`; stdio is left to the caller
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Shell-equivalent rendering, used for dry runs and logging
    pub fn render(&self) -> String {
        let mut line = String::new();
        for (key, value) in &self.envs {
            let _ = write!(line, "{key}={} ", shell_quote(value));
        }
        line.push_str(&shell_quote(&self.program.to_string_lossy()));
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(&arg.to_string_lossy()));
        }
        let _ = write!(
            line,
            " 2>&1 | tee {}",
            shell_quote(&self.log_path.to_string_lossy())
        );
        line
    }
}

/// Single-quote `word` if it contains anything a POSIX shell would interpret
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(mode: Mode) -> Invocation {
        Invocation::new(
            &LaunchConfig::default(),
            &Hyperparameters::BASELINE,
            mode,
            "workplace/data-bin/dialogre",
            &[],
        )
    }

    #[test]
    fn test_fixed_flags_in_every_mode() {
        for mode in Mode::ALL {
            let inv = baseline(mode);
            let expect = [
                ("--architecture", "STD"),
                ("--seed", "3"),
                ("--max_seq_length", "512"),
                ("--num_labels", "36"),
                ("--train_batch_size", "24"),
                ("--eval_batch_size", "1"),
                ("--learning_rate", "3e-5"),
                ("--num_train_epochs", "30"),
                ("--model_type", "entity-max"),
                ("--entity_drop", "0.1"),
                ("--gradient_accumulation_steps", "2"),
                ("--save_data", "workplace/data-bin/dialogre"),
                ("--model_name_or_path", crate::config::DEFAULT_BASE_DIR),
            ];
            for (flag, value) in expect {
                assert_eq!(
                    inv.flag_value(flag).map(|v| v.to_string_lossy().into_owned()),
                    Some(value.to_string()),
                    "{mode}: {flag}"
                );
            }
        }
    }

    #[test]
    fn test_phase_flags() {
        let train = baseline(Mode::Train);
        assert!(train.has_flag("--do_train"));
        assert!(train.has_flag("--do_eval"));

        let test = baseline(Mode::Test);
        assert!(!test.has_flag("--do_train"));
        assert!(test.has_flag("--do_eval"));
    }

    #[test]
    fn test_script_leads_args() {
        let inv = baseline(Mode::Train);
        assert_eq!(inv.program, PathBuf::from("python"));
        assert_eq!(inv.args[0], OsString::from("run.py"));
        assert_eq!(inv.args[1], OsString::from("--do_train"));
    }

    #[test]
    fn test_output_dir_and_log() {
        let train = baseline(Mode::Train);
        let test = baseline(Mode::Test);
        assert_eq!(train.output_dir, test.output_dir);
        assert_eq!(
            train.flag_value("--output_dir"),
            Some(&OsString::from("workplace/output/bert-base-512-seed-3-v2-baseline"))
        );
        assert!(train.log_path.ends_with("run.log"));
        assert!(test.log_path.ends_with("eval.log"));
    }

    #[test]
    fn test_device_env() {
        let config = LaunchConfig {
            device: 5,
            ..LaunchConfig::default()
        };
        let inv = Invocation::new(&config, &Hyperparameters::BASELINE, Mode::Test, "d", &[]);
        assert_eq!(inv.envs, vec![(DEVICE_ENV.to_string(), "5".to_string())]);
    }

    #[test]
    fn test_extra_args_follow_fixed_set() {
        let extra = vec!["--resume".to_string(), "--f1eval".to_string()];
        let inv = Invocation::new(
            &LaunchConfig::default(),
            &Hyperparameters::BASELINE,
            Mode::Train,
            "d",
            &extra,
        );
        let n = inv.args.len();
        assert_eq!(inv.args[n - 2], OsString::from("--resume"));
        assert_eq!(inv.args[n - 1], OsString::from("--f1eval"));
        assert_eq!(
            inv.args[n - 4],
            OsString::from("--gradient_accumulation_steps")
        );
    }

    #[test]
    fn test_render() {
        let line = baseline(Mode::Test).render();
        assert!(line.starts_with("CUDA_VISIBLE_DEVICES=0 python run.py --do_eval --architecture STD"));
        assert!(line.ends_with(
            "2>&1 | tee workplace/output/bert-base-512-seed-3-v2-baseline/eval.log"
        ));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("3e-5"), "3e-5");
        assert_eq!(shell_quote("my data"), "'my data'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
