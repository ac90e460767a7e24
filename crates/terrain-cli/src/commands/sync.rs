//! `sync` and `apply-sync`

use anyhow::Context;
use clap::ArgMatches;
use std::io::Write;
use std::process::ExitCode;
use terrain_sync::{ApplyMode, EffectRequest, Effector};

use super::{strategy, with_paths};
use crate::config::TerrainConfig;

/// Print the proposed diff on stdout, writing the Map when `apply` is set
pub(crate) fn run(args: &ArgMatches, config: TerrainConfig, apply: bool) -> anyhow::Result<ExitCode> {
    let config = with_paths(args, config);

    let mut request = EffectRequest::new(&config.src, &config.doc)
        .with_strategy(strategy(args)?)
        .with_mode(ApplyMode::from_flag(apply));
    if let Some(label) = args.get_one::<String>("label") {
        request = request.with_label(label.clone());
    }

    let outcome = Effector::new()
        .run(&request)
        .with_context(|| format!("effector failed on {}", config.doc.display()))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(outcome.proposal.diff.as_bytes())?;
    stdout.flush()?;

    for line in outcome.status_lines(&config.doc) {
        eprintln!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}
