//! `ratchet-check` and `ratchet-baseline`

use anyhow::{bail, Context};
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain_model::Finding;
use terrain_ratchet::{update_baselines, Confirmed, RatchetConfig, RatchetGuard};

use super::exit;
use crate::config::TerrainConfig;

/// Ratchet config from `--config-file`, metric paths resolved from the cwd
fn load(args: &ArgMatches, mut config: TerrainConfig) -> anyhow::Result<RatchetConfig> {
    if let Some(path) = args.get_one::<PathBuf>("config-file") {
        config = config.with_ratchet_config(path.clone());
    }
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    RatchetConfig::load(&config.ratchet_config, &cwd)
        .with_context(|| format!("cannot load {}", config.ratchet_config.display()))
}

pub(crate) fn check(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let ratchets = load(args, config)?;
    let report = RatchetGuard::new().check(&ratchets)?;

    if args.get_flag("json") {
        println!("{}", Finding::to_json_array(&report.findings)?);
    } else {
        for line in report.render_plain() {
            println!("{line}");
        }
    }

    Ok(exit(report.passed()))
}

pub(crate) fn baseline(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let Some(confirmed) = Confirmed::from_flag(args.get_flag("yes")) else {
        bail!("refusing to update baselines without --yes");
    };

    let ratchets = load(args, config)?;
    for update in update_baselines(&ratchets, confirmed)? {
        println!("{}", update.render_plain());
    }

    Ok(ExitCode::SUCCESS)
}
