//! `measure-drift`

use anyhow::Context;
use clap::ArgMatches;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use terrain_drift::{measure, DriftConfig};
use terrain_salvage::{InProcessRunner, ProcessRunner, StepRunner};

use super::with_paths;
use crate::config::TerrainConfig;

pub(crate) async fn run(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let config = with_paths(args, config);

    let drift = DriftConfig::default()
        .with_runs(args.get_one::<u32>("runs").copied().unwrap_or(config.drift.runs))
        .with_base_seed(args.get_one::<u64>("seed").copied().unwrap_or(config.drift.seed))
        .with_mock(args.get_flag("mock"))
        .with_validate(args.get_flag("validate"));

    let runner: Arc<dyn StepRunner> = if args.get_flag("in-process") {
        Arc::new(InProcessRunner::new())
    } else {
        Arc::new(
            ProcessRunner::current_exe(Duration::from_secs(config.step_timeout_secs))
                .context("cannot locate the terrain executable")?,
        )
    };

    let report = measure(runner.as_ref(), &config.src, &config.doc, &drift)
        .await
        .context("drift measurement failed")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(ExitCode::SUCCESS)
}
