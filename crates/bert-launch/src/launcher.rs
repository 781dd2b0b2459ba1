//! Train/test launcher
//!
//! Replaces the shell wrapper around the training script with compiled code:
//! resolve the run directory, assemble the fixed command line, then run the
//! script with stdout and stderr joined into one stream that is copied to
//! the console and to the mode's log file.

use crate::{
    Hyperparameters, Invocation, LaunchConfig, LaunchError, Mode, Result, Tee,
};
use std::fs;
use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};
use tracing::{debug, info, warn};

/// Launches the training program in train or test mode
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LaunchConfig,
    hparams: Hyperparameters,
    extra_args: Vec<String>,
    append_log: bool,
}

impl Launcher {
    /// Launcher with the baseline hyperparameters
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            hparams: Hyperparameters::BASELINE,
            extra_args: Vec::new(),
            append_log: false,
        }
    }

    /// Append `args` after the fixed flags
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Append to an existing log instead of truncating it
    #[must_use]
    pub fn with_append_log(mut self, append: bool) -> Self {
        self.append_log = append;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Resolve the invocation for `mode` without touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::InvalidMode`] for anything but `train`/`test`.
    pub fn plan(&self, databin: &str, mode: &str) -> Result<Invocation> {
        let mode: Mode = mode.parse()?;
        Ok(self.plan_mode(databin, mode))
    }

    /// Resolve the invocation for an already parsed mode
    pub fn plan_mode(&self, databin: &str, mode: Mode) -> Invocation {
        Invocation::new(&self.config, &self.hparams, mode, databin, &self.extra_args)
    }

    /// Run with output duplicated to stdout
    ///
    /// Returns the child's exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode is invalid, the run directory cannot be
    /// created, or the interpreter cannot be started.
    pub fn run(&self, databin: &str, mode: &str) -> Result<i32> {
        self.run_with_console(databin, mode, io::stdout().lock())
    }

    /// Run with output duplicated to `console`
    ///
    /// # Errors
    ///
    /// See [`Launcher::run`].
    pub fn run_with_console<W: Write>(&self, databin: &str, mode: &str, console: W) -> Result<i32> {
        let invocation = self.plan(databin, mode)?;
        info!("Launching {} run on {databin}", invocation.mode);

        if invocation.mode.creates_output_dir() {
            ensure_dir(&invocation)?;
        }

        let tee = Tee::open(console, &invocation.log_path, self.append_log);
        execute(&invocation, tee)
    }
}

/// Create the run directory and its parents
fn ensure_dir(invocation: &Invocation) -> Result<()> {
    let dir = &invocation.output_dir;
    if dir.is_dir() {
        debug!("Output directory exists: {}", dir.display());
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| LaunchError::CreateOutputDir {
        path: dir.clone(),
        source,
    })?;
    info!("Created output directory {}", dir.display());
    Ok(())
}

/// Spawn the child with stdout and stderr on one pipe and drain it into `tee`
fn execute<C: Write>(invocation: &Invocation, mut tee: Tee<C>) -> Result<i32> {
    debug!("{}", invocation.render());

    let (mut reader, writer) = io::pipe()?;
    let mut child = {
        let mut cmd = invocation.command();
        cmd.stdin(Stdio::inherit())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        // `cmd` holds the write ends; it must go out of scope before the
        // read loop or EOF never arrives.
        cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: invocation.program.clone(),
            source,
        })?
    };
    debug!("Spawned pid {}", child.id());

    let relayed = io::copy(&mut reader, &mut tee)
        .and_then(|bytes| tee.finish().map(|()| bytes));
    let bytes = match relayed {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Output relay failed, stopping child: {err}");
            let _ = child.kill();
            let _ = child.wait();
            return Err(err.into());
        }
    };

    let status = child.wait()?;
    let code = exit_code(status);
    if status.success() {
        info!("{} run finished, {bytes} bytes relayed", invocation.mode);
    } else {
        warn!("{} run exited with status {code}", invocation.mode);
    }
    Ok(code)
}

/// Shell-style exit code: the child's own code, or 128 + signal on unix
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
