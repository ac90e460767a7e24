//! Step execution seam
//!
//! A step is one Effector or Validator invocation. Runners never fail: spawn
//! errors, crashes and timeouts come back as a [`Captured`] that did not
//! succeed, so the orchestrator routes them through revert and quarantine.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use terrain_sync::{ApplyMode, EffectRequest, Effector, Strategy, Validator};
use tokio::process::Command;
use tokio::time::timeout;

/// Which component a step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Effector with a strategy, writing the Map when `apply` is set
    Effect {
        /// Rendering strategy
        strategy: Strategy,
        /// Write the Map
        apply: bool,
    },
    /// Validator, emitting a JSON findings array when `structured` is set
    Validate {
        /// JSON output instead of terse status lines
        structured: bool,
    },
}

/// One step request
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Component and mode
    pub kind: StepKind,
    /// Terrain root
    pub src: PathBuf,
    /// Map file
    pub doc: PathBuf,
    /// Diff header label for Effector steps
    pub label: Option<String>,
    /// Seed given on the command line, forwarded to external Effectors
    pub seed: Option<u64>,
}

impl Invocation {
    /// Effector step
    #[must_use]
    pub fn effect(src: impl Into<PathBuf>, doc: impl Into<PathBuf>, strategy: Strategy, apply: bool) -> Self {
        Self {
            kind: StepKind::Effect { strategy, apply },
            src: src.into(),
            doc: doc.into(),
            label: None,
            seed: None,
        }
    }

    /// Validator step
    #[must_use]
    pub fn validate(src: impl Into<PathBuf>, doc: impl Into<PathBuf>, structured: bool) -> Self {
        Self {
            kind: StepKind::Validate { structured },
            src: src.into(),
            doc: doc.into(),
            label: None,
            seed: None,
        }
    }

    /// Set diff label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set seed
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Captured output of a step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// Standard output
    pub stdout: String,
    /// Diagnostic output
    pub stderr: String,
    /// Exit code; `None` if the step never produced one
    pub exit_code: Option<i32>,
    /// Killed after exceeding the step timeout
    pub timed_out: bool,
}

impl Captured {
    /// Step that failed before producing output
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            ..Self::default()
        }
    }

    /// Exit code 0 within the time bound
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Executes steps
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Run one step to completion
    async fn run(&self, invocation: &Invocation) -> Captured;

    /// Name recorded for the Effector driven with `strategy`
    fn effector_name(&self, strategy: &Strategy) -> String {
        strategy.to_string()
    }
}

/// Program used for Effector steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectorCommand {
    /// `<program> sync ...` of this workspace's binary
    Builtin,
    /// Arbitrary program called as `--src S --doc D [--apply] [--seed N]`
    External(PathBuf),
}

/// Runs each step as a subprocess bounded by a timeout
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    effector: EffectorCommand,
    step_timeout: Duration,
}

impl ProcessRunner {
    /// Runner invoking `program` for both steps
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, step_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            effector: EffectorCommand::Builtin,
            step_timeout,
        }
    }

    /// Runner invoking the currently running executable
    ///
    /// # Errors
    /// When the executable path cannot be determined.
    pub fn current_exe(step_timeout: Duration) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, step_timeout))
    }

    /// Set Effector program
    #[must_use]
    pub fn with_effector(mut self, effector: EffectorCommand) -> Self {
        self.effector = effector;
        self
    }

    /// Program and arguments for `invocation`
    #[must_use]
    pub fn command_line(&self, invocation: &Invocation) -> (PathBuf, Vec<String>) {
        let src = invocation.src.display().to_string();
        let doc = invocation.doc.display().to_string();

        match (&invocation.kind, &self.effector) {
            (StepKind::Effect { strategy, apply }, EffectorCommand::Builtin) => {
                let mut args = vec!["sync".to_string(), "--src".to_string(), src, "--doc".to_string(), doc];
                args.extend(strategy.to_args());
                if let Some(label) = &invocation.label {
                    args.push("--label".to_string());
                    args.push(label.clone());
                }
                if *apply {
                    args.push("--apply".to_string());
                }
                (self.program.clone(), args)
            }
            (StepKind::Effect { strategy, apply }, EffectorCommand::External(program)) => {
                let mut args = vec!["--src".to_string(), src, "--doc".to_string(), doc];
                if *apply {
                    args.push("--apply".to_string());
                }
                let seed = invocation.seed.or(match strategy {
                    Strategy::Stochastic(seed) => Some(*seed),
                    _ => None,
                });
                if let Some(seed) = seed {
                    args.push("--seed".to_string());
                    args.push(seed.to_string());
                }
                (program.clone(), args)
            }
            (StepKind::Validate { structured }, _) => {
                let mut args = vec!["validate".to_string(), "--src".to_string(), src, "--doc".to_string(), doc];
                if *structured {
                    args.push("--json".to_string());
                }
                (self.program.clone(), args)
            }
        }
    }

    async fn execute(&self, program: &Path, args: &[String]) -> Captured {
        tracing::debug!("spawning {} {}", program.display(), args.join(" "));

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return Captured::failure(format!("failed to spawn {}: {e}", program.display()));
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        match timeout(self.step_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Captured {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
                timed_out: false,
            },
            Ok(Err(e)) => Captured::failure(format!("failed waiting for {}: {e}", program.display())),
            Err(_) => {
                tracing::warn!(
                    "{} timed out after {}s",
                    program.display(),
                    self.step_timeout.as_secs()
                );
                Captured {
                    stderr: format!("timed out after {}s\n", self.step_timeout.as_secs()),
                    timed_out: true,
                    ..Captured::default()
                }
            }
        }
    }
}

#[async_trait]
impl StepRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Captured {
        let (program, args) = self.command_line(invocation);
        self.execute(&program, &args).await
    }

    fn effector_name(&self, strategy: &Strategy) -> String {
        match &self.effector {
            EffectorCommand::Builtin => strategy.to_string(),
            EffectorCommand::External(program) => program.display().to_string(),
        }
    }
}

/// Runs each step inside the current process on a blocking thread
#[derive(Debug, Clone, Default)]
pub struct InProcessRunner {
    effector: Effector,
    validator: Validator,
}

impl InProcessRunner {
    /// Runner with the default Effector and Validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn run_blocking(&self, invocation: &Invocation) -> Captured {
        match invocation.kind {
            StepKind::Effect { strategy, apply } => {
                let mut request = EffectRequest::new(&invocation.src, &invocation.doc)
                    .with_strategy(strategy)
                    .with_mode(ApplyMode::from_flag(apply));
                if let Some(label) = &invocation.label {
                    request = request.with_label(label.clone());
                }

                match self.effector.run(&request) {
                    Ok(outcome) => Captured {
                        stderr: lines(&outcome.status_lines(&invocation.doc)),
                        stdout: outcome.proposal.diff,
                        exit_code: Some(0),
                        timed_out: false,
                    },
                    Err(e) => Captured {
                        stderr: format!("[effector] {e}\n"),
                        exit_code: Some(1),
                        ..Captured::default()
                    },
                }
            }
            StepKind::Validate { structured } => {
                let report = match self.validator.validate(&invocation.src, &invocation.doc) {
                    Ok(report) => report,
                    Err(e) => {
                        return Captured {
                            stderr: format!("[validator] {e}\n"),
                            exit_code: Some(1),
                            ..Captured::default()
                        }
                    }
                };

                let (stdout, stderr) = if structured {
                    match report.render_json() {
                        Ok(json) => (format!("{json}\n"), String::new()),
                        Err(e) => (String::new(), format!("[validator] {e}\n")),
                    }
                } else {
                    report.render_plain()
                };

                Captured {
                    stdout,
                    stderr,
                    exit_code: Some(report.exit_code()),
                    timed_out: false,
                }
            }
        }
    }
}

#[async_trait]
impl StepRunner for InProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Captured {
        let runner = self.clone();
        let invocation = invocation.clone();
        tokio::task::spawn_blocking(move || runner.run_blocking(&invocation))
            .await
            .unwrap_or_else(|e| Captured::failure(format!("step panicked: {e}")))
    }
}

fn lines(items: &[String]) -> String {
    items.iter().map(|l| format!("{l}\n")).collect()
}
