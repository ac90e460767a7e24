//! `run-all`: apply, validate, commit or revert and quarantine

use anyhow::Context;
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use terrain_salvage::{
    EffectorCommand, InProcessRunner, Orchestrator, ProcessRunner, QuarantineStore, SalvageOutcome,
    SalvageRequest, StepRunner,
};

use super::{strategy, with_paths};
use crate::config::TerrainConfig;

pub(crate) async fn run(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let mut config = with_paths(args, config);
    if let Some(dir) = args.get_one::<PathBuf>("quarantine-dir") {
        config = config.with_quarantine_dir(dir.clone());
    }
    if let Some(secs) = args.get_one::<u64>("timeout-secs") {
        config = config.with_step_timeout_secs(*secs);
    }

    let runner: Arc<dyn StepRunner> = if args.get_flag("in-process") {
        Arc::new(InProcessRunner::new())
    } else {
        let effector = args
            .get_one::<PathBuf>("effector")
            .map_or(EffectorCommand::Builtin, |p| EffectorCommand::External(p.clone()));
        Arc::new(
            ProcessRunner::current_exe(Duration::from_secs(config.step_timeout_secs))
                .context("cannot locate the terrain executable")?
                .with_effector(effector),
        )
    };

    let orchestrator = Orchestrator::new(runner, QuarantineStore::new(&config.quarantine_dir));
    let request = SalvageRequest::new(&config.src, &config.doc, strategy(args)?)
        .with_seed(args.get_one::<u64>("seed").copied());

    match orchestrator.run(&request).await? {
        SalvageOutcome::Committed {
            effect, validation, ..
        } => {
            print!("{}", effect.stdout);
            eprint!("{}", validation.stdout);
            eprintln!("[salvage] committed {}", config.doc.display());
            Ok(ExitCode::SUCCESS)
        }
        SalvageOutcome::Quarantined { dir, findings, .. } => {
            eprintln!("[salvage] reverted {}", config.doc.display());
            eprintln!("[salvage] quarantined {}", dir.display());
            for finding in &findings {
                eprintln!("  {}", finding.summary());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
